//! Knowledge base store.
//!
//! Owns the process-wide [`KnowledgeBase`]. Readers take a cheap snapshot
//! (`Arc` clone); loads and reloads are serialized by a writer lock and only
//! publish a fully parsed knowledge base.

use helpdesk_core::{HelpdeskError, KnowledgeBase, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::parser::parse_knowledge_base;

/// Where knowledge source text comes from.
#[derive(Debug, Clone)]
pub enum KnowledgeSource {
    /// A UTF-8 file on disk
    File(PathBuf),

    /// In-memory text (tests, embedded defaults)
    Text {
        /// Name used in logs and errors
        name: String,
        /// Raw source text
        content: String,
    },
}

impl KnowledgeSource {
    /// Human readable source name.
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Text { name, .. } => name.clone(),
        }
    }

    async fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => match fs::read_to_string(path).await {
                Ok(content) => Ok(content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(HelpdeskError::SourceMissing { path: path.clone() })
                }
                Err(e) => Err(e.into()),
            },
            Self::Text { content, .. } => Ok(content.clone()),
        }
    }
}

/// Whether a knowledge base is currently available.
#[derive(Debug, Clone)]
pub enum KnowledgeState {
    /// A parsed, non-empty knowledge base
    Loaded(Arc<KnowledgeBase>),
    /// Nothing loaded; callers run in degraded mode
    Absent,
}

impl KnowledgeState {
    /// Whether a knowledge base is loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Holds the knowledge base parsed from a single source.
pub struct KnowledgeBaseStore {
    source: KnowledgeSource,
    state: RwLock<KnowledgeState>,
    writer: Mutex<()>,
}

impl KnowledgeBaseStore {
    /// Create an empty store for the given source. Call [`load`](Self::load)
    /// before use.
    pub fn new(source: KnowledgeSource) -> Self {
        Self {
            source,
            state: RwLock::new(KnowledgeState::Absent),
            writer: Mutex::new(()),
        }
    }

    /// The source this store reads from.
    pub fn source(&self) -> &KnowledgeSource {
        &self.source
    }

    /// Load the knowledge base, discarding any prior state first. On failure
    /// the store is left `Absent`.
    pub async fn load(&self) -> Result<Arc<KnowledgeBase>> {
        let _guard = self.writer.lock().await;
        *self.state.write().await = KnowledgeState::Absent;

        info!("Loading knowledge base from {}", self.source.name());
        let kb = Arc::new(self.read_and_parse().await?);
        *self.state.write().await = KnowledgeState::Loaded(kb.clone());
        info!("Loaded {} Q&A pairs from {}", kb.len(), self.source.name());
        Ok(kb)
    }

    /// Re-read the source and replace the knowledge base only if parsing
    /// succeeds. On failure the previous knowledge base stays servable.
    pub async fn reload(&self) -> Result<Arc<KnowledgeBase>> {
        let _guard = self.writer.lock().await;

        info!("Reloading knowledge base from {}", self.source.name());
        let kb = match self.read_and_parse().await {
            Ok(kb) => Arc::new(kb),
            Err(e) => {
                warn!("Reload failed, keeping previous knowledge base: {}", e);
                return Err(e);
            }
        };

        let previous = std::mem::replace(
            &mut *self.state.write().await,
            KnowledgeState::Loaded(kb.clone()),
        );
        if let KnowledgeState::Loaded(old) = previous {
            info!("Replaced {} Q&A pairs with {}", old.len(), kb.len());
        }
        Ok(kb)
    }

    /// Current state. The returned value never changes underneath the caller.
    pub async fn snapshot(&self) -> KnowledgeState {
        self.state.read().await.clone()
    }

    /// Whether a knowledge base is loaded.
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.is_loaded()
    }

    /// Number of loaded entries, 0 when absent.
    pub async fn entry_count(&self) -> usize {
        match &*self.state.read().await {
            KnowledgeState::Loaded(kb) => kb.len(),
            KnowledgeState::Absent => 0,
        }
    }

    async fn read_and_parse(&self) -> Result<KnowledgeBase> {
        let content = self.source.read().await?;
        parse_knowledge_base(&content, &self.source.name())
    }
}
