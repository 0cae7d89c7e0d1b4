//! Storage trait abstraction.

use async_trait::async_trait;
use helpdesk_core::{QueryLog, QueryLogId, Time};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistence for answered questions.
///
/// Every listing is ordered newest first.
#[async_trait]
pub trait QueryLogStore: Send + Sync {
    /// Persist a new record. Fails if a record with the same id exists.
    async fn create(&self, log: &QueryLog) -> Result<()>;

    /// Load a record by id.
    async fn get(&self, id: QueryLogId) -> Result<Option<QueryLog>>;

    /// The most recent `limit` records.
    async fn latest(&self, limit: usize) -> Result<Vec<QueryLog>>;

    /// A page of records, skipping the `skip` most recent.
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<QueryLog>>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;

    /// Records whose question contains `term`, ignoring case.
    async fn search_by_question(&self, term: &str, limit: usize) -> Result<Vec<QueryLog>>;

    /// Records stamped within `[start, end]`.
    async fn between(&self, start: Time, end: Time, limit: usize) -> Result<Vec<QueryLog>>;

    /// Mean processing time over records that have one.
    async fn average_processing_time(&self) -> Result<Option<f64>>;
}
