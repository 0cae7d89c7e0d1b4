//! Unique identifiers for helpdesk records.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a recorded query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryLogId(Ulid);

impl QueryLogId {
    /// Generate a new QueryLogId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for QueryLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QueryLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for QueryLogId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_log_id_display_parses_back() {
        let id = QueryLogId::new();
        let parsed: QueryLogId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_query_log_id_rejects_garbage() {
        assert!("not-a-ulid".parse::<QueryLogId>().is_err());
    }
}
