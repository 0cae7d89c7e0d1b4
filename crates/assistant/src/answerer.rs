//! Request orchestration.
//!
//! One answer is a fixed sequence: resolve context, render the prompt,
//! generate, time the whole thing. Failures from any step are returned as-is.

use std::sync::Arc;
use std::time::Instant;

use helpdesk_core::{
    AnswerResult, ContextSource, GenerationRequest, RetrievalResult, Result, SelectionMethod,
};
use helpdesk_knowledge::{
    KnowledgeBaseStore, KnowledgeState, PromptAssembler, PromptStyle, Retriever,
    MAX_SIMILAR_QUESTIONS,
};
use helpdesk_llm::{OllamaClient, ReqwestTransport, Transport};
use tracing::{debug, info, warn};

use crate::request::AnswerRequest;

/// Context used when no knowledge base is loaded.
pub const NO_KNOWLEDGE_BASE_CONTEXT: &str =
    "No knowledge base loaded. Please provide general assistance.";

/// Composes retrieval, prompt assembly and generation.
pub struct Answerer<T: Transport = ReqwestTransport> {
    store: Arc<KnowledgeBaseStore>,
    retriever: Retriever,
    assembler: PromptAssembler,
    client: OllamaClient<T>,
    retry_budget: u32,
}

impl<T: Transport> Answerer<T> {
    /// Create an answerer over shared knowledge and a generation client.
    pub fn new(
        store: Arc<KnowledgeBaseStore>,
        retriever: Retriever,
        assembler: PromptAssembler,
        client: OllamaClient<T>,
        retry_budget: u32,
    ) -> Self {
        Self {
            store,
            retriever,
            assembler,
            client,
            retry_budget,
        }
    }

    /// Knowledge base store.
    pub fn store(&self) -> &Arc<KnowledgeBaseStore> {
        &self.store
    }

    /// Generation client.
    pub fn client(&self) -> &OllamaClient<T> {
        &self.client
    }

    /// Select context for `query`. With no knowledge base loaded the method is
    /// ignored and the placeholder context is returned.
    pub async fn resolve_context(
        &self,
        query: &str,
        method: SelectionMethod,
        max_entries: Option<usize>,
    ) -> RetrievalResult {
        match self.store.snapshot().await {
            KnowledgeState::Loaded(kb) => self.retriever.retrieve(query, &kb, method, max_entries),
            KnowledgeState::Absent => {
                warn!("No knowledge base loaded, answering without context");
                RetrievalResult {
                    entries: Vec::new(),
                    context: NO_KNOWLEDGE_BASE_CONTEXT.to_string(),
                    source: ContextSource::Placeholder,
                }
            }
        }
    }

    /// Best keyword matches for `query`, empty when no knowledge base is loaded.
    pub async fn similar_questions(&self, query: &str) -> Vec<String> {
        match self.store.snapshot().await {
            KnowledgeState::Loaded(kb) => self
                .retriever
                .search(query, &kb)
                .into_iter()
                .take(MAX_SIMILAR_QUESTIONS)
                .map(|s| s.entry.question)
                .collect(),
            KnowledgeState::Absent => Vec::new(),
        }
    }

    /// Render the prompt for a request without calling the backend.
    pub async fn build_prompt(&self, request: &AnswerRequest) -> (RetrievalResult, String) {
        let context = self
            .resolve_context(&request.query, request.method, request.max_context_entries)
            .await;
        let prompt = match request.style {
            PromptStyle::Answer => self.assembler.render(&request.query, &context.context),
            PromptStyle::Clarification => {
                let similar = self.similar_questions(&request.query).await;
                self.assembler
                    .render_clarification(&request.query, &context.context, &similar)
            }
        };
        (context, prompt)
    }

    /// Answer a request.
    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResult> {
        let start = Instant::now();

        let (context, prompt) = self.build_prompt(request).await;
        debug!(
            "Using {} context ({} entries, {} chars)",
            request.method,
            context.len(),
            context.context.chars().count()
        );

        let generation = GenerationRequest::new(
            self.client.model(),
            prompt,
            request.temperature,
            request.max_tokens,
        )?;
        let response = self.client.generate(&generation, self.retry_budget).await?;

        let elapsed_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Answered in {}ms after {} attempt(s)",
            elapsed_time_ms, response.attempts
        );

        Ok(AnswerResult {
            answer_text: response.generated_text,
            elapsed_time_ms,
            model_identifier: generation.model_identifier,
            context_selection_method: request.method,
            context_source: context.source,
            context_length_chars: context.context.chars().count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, ok, FakeBackend, FAQ};
    use helpdesk_core::{HelpdeskError, Settings};
    use helpdesk_knowledge::{KnowledgeSource, PromptProfile};
    use helpdesk_llm::{RawResponse, TransportError};

    async fn answerer(backend: FakeBackend, loaded: bool) -> Answerer<FakeBackend> {
        let settings = Settings::default();
        let store = Arc::new(KnowledgeBaseStore::new(KnowledgeSource::Text {
            name: "faq".to_string(),
            content: FAQ.to_string(),
        }));
        if loaded {
            store.load().await.unwrap();
        }
        Answerer::new(
            store,
            Retriever::new(settings.top_k),
            PromptAssembler::new("Acme"),
            client(backend, &settings),
            1,
        )
    }

    fn request(query: &str, method: &str, max: Option<usize>) -> AnswerRequest {
        AnswerRequest::new(query, method, 0.3, 300, max).unwrap()
    }

    #[tokio::test]
    async fn test_answer_with_keyword_context() {
        let answerer = answerer(FakeBackend::answering("  You can return items within 30 days. "), true).await;
        let result = answerer.answer(&request("I want a refund", "keyword", None)).await.unwrap();

        assert_eq!(result.answer_text, "You can return items within 30 days.");
        assert_eq!(result.model_identifier, "mistral");
        assert_eq!(result.context_selection_method, SelectionMethod::Keyword);
        assert_eq!(result.context_source, ContextSource::Keyword);

        let expected = "Q: What is the refund policy?\nA: Returns within 30 days.";
        assert_eq!(result.context_length_chars, expected.chars().count());
        let prompt = answerer.client().transport().last_prompt();
        assert!(prompt.contains(expected));
        assert!(!prompt.contains("contact support"));
        assert!(prompt.ends_with("Customer Question: I want a refund\n\nAnswer:"));
    }

    #[tokio::test]
    async fn test_answer_all_with_cap() {
        let answerer = answerer(FakeBackend::answering("ok"), true).await;
        let result = answerer.answer(&request("anything goes", "all", Some(1))).await.unwrap();
        assert_eq!(result.context_source, ContextSource::All);

        let prompt = answerer.client().transport().last_prompt();
        assert!(prompt.contains("Q: What is the refund policy?"));
        assert!(!prompt.contains("Q: How do I contact support?"));
    }

    #[tokio::test]
    async fn test_answer_without_knowledge_base_uses_placeholder() {
        let answerer = answerer(FakeBackend::answering("General help."), false).await;
        for method in ["keyword", "all"] {
            let result = answerer.answer(&request("I want a refund", method, Some(1))).await.unwrap();
            assert_eq!(result.answer_text, "General help.");
            assert_eq!(result.context_source, ContextSource::Placeholder);
            assert_eq!(result.context_length_chars, NO_KNOWLEDGE_BASE_CONTEXT.len());
            assert!(answerer
                .client()
                .transport()
                .last_prompt()
                .contains(NO_KNOWLEDGE_BASE_CONTEXT));
        }
    }

    #[tokio::test]
    async fn test_answer_propagates_generation_error() {
        let backend = FakeBackend::failing(Ok(RawResponse {
            status: 500,
            body: "boom".to_string(),
        }));
        let answerer = answerer(backend, true).await;
        let err = answerer.answer(&request("I want a refund", "keyword", None)).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::Generation { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_answer_retries_timeout_within_budget() {
        let backend = FakeBackend::failing(Err(TransportError::Timeout))
            .then(Err(TransportError::Timeout))
            .then(ok(r#"{"response":"Recovered"}"#));
        let answerer = answerer(backend, true).await;
        let result = answerer.answer(&request("I want a refund", "keyword", None)).await.unwrap();
        assert_eq!(result.answer_text, "Recovered");
        assert_eq!(answerer.client().transport().generate_calls(), 2);
    }

    #[tokio::test]
    async fn test_answer_connection_error_after_budget() {
        let answerer = answerer(FakeBackend::failing(Err(TransportError::Timeout)), true).await;
        let err = answerer.answer(&request("I want a refund", "keyword", None)).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::Connection { attempts: 2, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_clarification_profile_lists_similar_questions() {
        let answerer = answerer(FakeBackend::answering("Do you mean refunds?"), true).await;
        let req = request("refund support", "all", None).with_profile(PromptProfile::CLARIFICATION);
        let result = answerer.answer(&req).await.unwrap();
        assert_eq!(result.answer_text, "Do you mean refunds?");

        let prompt = answerer.client().transport().last_prompt();
        assert!(prompt.contains(
            "Similar questions in our knowledge base:\n- What is the refund policy?\n- How do I contact support?\n\n"
        ));
        assert!(prompt.contains("Available Information:\nQ: What is the refund policy?"));
        assert!(!prompt.contains("Instructions:"));
    }

    #[tokio::test]
    async fn test_clarification_without_knowledge_base() {
        let answerer = answerer(FakeBackend::answering("ok"), false).await;
        assert!(answerer.similar_questions("refund").await.is_empty());

        let req = request("refund please", "keyword", None).with_profile(PromptProfile::CLARIFICATION);
        let (context, prompt) = answerer.build_prompt(&req).await;
        assert_eq!(context.source, ContextSource::Placeholder);
        assert!(prompt.contains("- (no similar questions found)"));
        assert!(prompt.contains(NO_KNOWLEDGE_BASE_CONTEXT));
    }

    #[tokio::test]
    async fn test_resolve_context_falls_back_on_no_match() {
        let answerer = answerer(FakeBackend::answering("ok"), true).await;
        let context = answerer
            .resolve_context("zebra", SelectionMethod::Keyword, Some(1))
            .await;
        assert_eq!(context.source, ContextSource::KeywordFallback);
        assert_eq!(context.len(), 2);
    }
}
