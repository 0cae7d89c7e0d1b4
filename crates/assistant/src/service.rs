//! Support service facade.
//!
//! Wires settings into the pipeline and exposes the operations callers use:
//! knowledge base (re)loading, answering, and answering with history.

use std::sync::Arc;

use helpdesk_core::{
    AnswerResult, HelpdeskError, KnowledgeBase, QueryLog, QueryLogId, Result, RetrievalResult,
    SelectionMethod, Settings,
};
use helpdesk_knowledge::{KnowledgeBaseStore, KnowledgeSource, PromptAssembler, Retriever};
use helpdesk_llm::{model_base_name, OllamaClient, OllamaConfig, ReqwestTransport, Transport};
use helpdesk_storage::QueryLogStore;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::answerer::Answerer;
use crate::request::{validate_question, AnswerRequest};

/// An answer plus the id it was recorded under, if recording succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    /// The answer
    pub result: AnswerResult,
    /// Query history id, `None` when history is disabled or the write failed
    pub record_id: Option<QueryLogId>,
}

/// Customer support answering service.
pub struct SupportService<T: Transport = ReqwestTransport> {
    settings: Settings,
    answerer: Answerer<T>,
    history: Option<Arc<dyn QueryLogStore>>,
}

impl SupportService<ReqwestTransport> {
    /// Build the service over HTTP from settings. The knowledge base is not
    /// loaded yet.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let client = OllamaClient::new(OllamaConfig::from(&settings))?;
        let store = Arc::new(KnowledgeBaseStore::new(KnowledgeSource::File(
            settings.knowledge_base_path.clone(),
        )));
        Ok(Self::new(settings, store, client))
    }
}

impl<T: Transport> SupportService<T> {
    /// Assemble a service from its parts.
    pub fn new(settings: Settings, store: Arc<KnowledgeBaseStore>, client: OllamaClient<T>) -> Self {
        let answerer = Answerer::new(
            store,
            Retriever::new(settings.top_k),
            PromptAssembler::new(settings.company_name.clone()),
            client,
            settings.retry_budget,
        );
        Self {
            settings,
            answerer,
            history: None,
        }
    }

    /// Record every [`ask`](Self::ask) into `history`.
    pub fn with_history(mut self, history: Arc<dyn QueryLogStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Knowledge base store.
    pub fn knowledge(&self) -> &Arc<KnowledgeBaseStore> {
        self.answerer.store()
    }

    /// Query history, when enabled.
    pub fn history(&self) -> Option<&Arc<dyn QueryLogStore>> {
        self.history.as_ref()
    }

    /// Probe the backend. Fails when it is unreachable; a missing model is
    /// only reported.
    pub async fn connect(&self) -> Result<()> {
        let client = self.answerer.client();
        if !client.check_availability().await {
            return Err(HelpdeskError::Connection {
                reason: format!(
                    "cannot connect to Ollama at {}; make sure it is running (ollama serve)",
                    client.config().base_url
                ),
                attempts: 1,
            });
        }

        let model = client.model();
        if client.check_model_present(model).await {
            info!("Connected to Ollama, model '{}' is available", model);
        } else {
            warn!(
                "Model '{}' not found. Run: ollama pull {}",
                model,
                model_base_name(model)
            );
        }
        Ok(())
    }

    /// Load the knowledge base, replacing whatever was loaded before.
    pub async fn load_knowledge_base(&self) -> Result<Arc<KnowledgeBase>> {
        self.knowledge().load().await
    }

    /// Reload the knowledge base; on failure the previous one stays in use.
    pub async fn reload_knowledge_base(&self) -> Result<Arc<KnowledgeBase>> {
        self.knowledge().reload().await
    }

    /// Preview the context a query would be answered with.
    pub async fn context(
        &self,
        query: &str,
        method: SelectionMethod,
        max_entries: Option<usize>,
    ) -> Result<RetrievalResult> {
        let query = validate_question(query)?;
        Ok(self.answerer.resolve_context(query, method, max_entries).await)
    }

    /// Answer a request.
    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResult> {
        info!(
            "Processing question ({} chars) with {} context",
            request.query.chars().count(),
            request.method
        );
        self.answerer.answer(request).await
    }

    /// Answer a request and record it in the query history. Recording
    /// failures are logged and do not affect the answer.
    pub async fn ask(&self, request: &AnswerRequest) -> Result<AskOutcome> {
        let result = self.answer(request).await?;
        let record_id = match &self.history {
            Some(history) => {
                let log = QueryLog::new(
                    request.query.clone(),
                    result.answer_text.clone(),
                    Some(result.elapsed_time_ms),
                    result.model_identifier.clone(),
                    Some(result.context_descriptor()),
                );
                match history.create(&log).await {
                    Ok(()) => Some(log.id),
                    Err(e) => {
                        error!("Failed to record query: {}", e);
                        None
                    }
                }
            }
            None => None,
        };
        Ok(AskOutcome { result, record_id })
    }
}
