//! JSON file storage implementation.
//!
//! Stores each query record as `queries/<id>.json` under the storage root.
//! Listings read the whole directory, which is adequate for the history sizes
//! a single support desk accumulates.

use std::path::{Path, PathBuf};

use helpdesk_core::{QueryLog, QueryLogId, Time};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{QueryLogStore, Result, StorageError};

/// File-based JSON query history.
pub struct JsonQueryLogStore {
    root: PathBuf,
}

impl JsonQueryLogStore {
    /// Create storage, creating the `queries/` directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("queries")).await?;
        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn query_path(&self, id: QueryLogId) -> PathBuf {
        self.root.join("queries").join(format!("{}.json", id))
    }

    /// All records, newest first.
    async fn load_all(&self) -> Result<Vec<QueryLog>> {
        let mut logs: Vec<QueryLog> = list_dir(&self.root.join("queries")).await?;
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(logs)
    }
}

#[async_trait::async_trait]
impl QueryLogStore for JsonQueryLogStore {
    async fn create(&self, log: &QueryLog) -> Result<()> {
        let path = self.query_path(log.id);
        let json = serde_json::to_string_pretty(log)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::Other(format!("query {} already recorded", log.id))
                } else {
                    e.into()
                }
            })?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        debug!("Recorded query {}", log.id);
        Ok(())
    }

    async fn get(&self, id: QueryLogId) -> Result<Option<QueryLog>> {
        read_json(&self.query_path(id)).await
    }

    async fn latest(&self, limit: usize) -> Result<Vec<QueryLog>> {
        self.list(0, limit).await
    }

    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<QueryLog>> {
        Ok(self.load_all().await?.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self) -> Result<usize> {
        // Same records the listings return; unreadable files are not counted
        Ok(self.load_all().await?.len())
    }

    async fn search_by_question(&self, term: &str, limit: usize) -> Result<Vec<QueryLog>> {
        let needle = term.to_lowercase();
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|log| log.question.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }

    async fn between(&self, start: Time, end: Time, limit: usize) -> Result<Vec<QueryLog>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|log| log.timestamp >= start && log.timestamp <= end)
            .take(limit)
            .collect())
    }

    async fn average_processing_time(&self) -> Result<Option<f64>> {
        let times: Vec<u64> = self
            .load_all()
            .await?
            .iter()
            .filter_map(|log| log.processing_time_ms)
            .collect();
        if times.is_empty() {
            return Ok(None);
        }
        let total: u64 = times.iter().sum();
        Ok(Some(total as f64 / times.len() as f64))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if !is_json(&path) {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn log_at(question: &str, minutes: i64, time_ms: Option<u64>) -> QueryLog {
        let mut log = QueryLog::new(question, "An answer.", time_ms, "mistral", None);
        log.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        log
    }

    async fn seeded() -> (TempDir, JsonQueryLogStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonQueryLogStore::new(dir.path()).await.unwrap();
        store.create(&log_at("What is the refund policy?", 0, Some(100))).await.unwrap();
        store.create(&log_at("How do I contact support?", 10, Some(300))).await.unwrap();
        store.create(&log_at("Refund for a damaged item", 20, None)).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let dir = TempDir::new().unwrap();
        let store = JsonQueryLogStore::new(dir.path()).await.unwrap();
        let log = QueryLog::new("Where is my order?", "On its way.", Some(42), "mistral", Some("Method: keyword, Length: 10".into()));

        store.create(&log).await.unwrap();
        let loaded = store.get(log.id).await.unwrap().unwrap();
        assert_eq!(loaded, log);
        assert!(store.get(QueryLogId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let store = JsonQueryLogStore::new(dir.path()).await.unwrap();
        let log = log_at("Duplicate?", 0, None);
        store.create(&log).await.unwrap();
        assert!(matches!(store.create(&log).await, Err(StorageError::Other(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let (_dir, store) = seeded().await;
        let questions: Vec<_> = store.latest(10).await.unwrap().into_iter().map(|l| l.question).collect();
        assert_eq!(
            questions,
            vec!["Refund for a damaged item", "How do I contact support?", "What is the refund policy?"]
        );

        let page = store.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].question, "How do I contact support?");
        assert!(store.list(5, 10).await.unwrap().is_empty());
        assert_eq!(store.latest(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_count_ignores_other_files() {
        let (dir, store) = seeded().await;
        std::fs::write(dir.path().join("queries").join("notes.txt"), "x").unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (_dir, store) = seeded().await;
        let hits = store.search_by_question("REFUND", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].question, "Refund for a damaged item");
        assert_eq!(store.search_by_question("refund", 1).await.unwrap().len(), 1);
        assert!(store.search_by_question("shipping", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_between_is_inclusive() {
        let (_dir, store) = seeded().await;
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let hits = store.between(start, start + Duration::minutes(10), 10).await.unwrap();
        let questions: Vec<_> = hits.into_iter().map(|l| l.question).collect();
        assert_eq!(questions, vec!["How do I contact support?", "What is the refund policy?"]);
    }

    #[tokio::test]
    async fn test_average_processing_time() {
        let dir = TempDir::new().unwrap();
        let store = JsonQueryLogStore::new(dir.path()).await.unwrap();
        assert_eq!(store.average_processing_time().await.unwrap(), None);

        let (_dir, store) = seeded().await;
        assert_eq!(store.average_processing_time().await.unwrap(), Some(200.0));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_skipped() {
        let (dir, store) = seeded().await;
        std::fs::write(dir.path().join("queries").join("broken.json"), "{not json").unwrap();
        assert_eq!(store.latest(10).await.unwrap().len(), 3);
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
