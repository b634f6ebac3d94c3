use serde::{Deserialize, Serialize};

/// Maximum number of remembered search queries.
pub const SEARCH_HISTORY_LIMIT: usize = 6;

/// Recent search queries, most recent first, without duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SearchHistory(Vec<String>);

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a history from stored queries, re-applying trimming, dedup
    /// and the size cap.
    pub fn from_queries<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<S> = queries.into_iter().collect();
        let mut history = Self::new();
        // Oldest first so the first query ends up in front.
        for query in queries.iter().rev() {
            history.record(query.as_ref());
        }
        history
    }

    /// Moves `query` to the front. Blank queries are ignored.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.0.retain(|item| item != query);
        self.0.insert(0, query.to_string());
        self.0.truncate(SEARCH_HISTORY_LIMIT);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_caps_at_limit() {
        let mut history = SearchHistory::new();
        for q in ["q1", "q2", "q3", "q4", "q5", "q6", "q7"] {
            history.record(q);
        }
        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(history.as_slice(), &["q7", "q6", "q5", "q4", "q3", "q2"]);
    }

    #[test]
    fn test_reinsert_moves_to_front() {
        let mut history = SearchHistory::new();
        for q in ["q1", "q2", "q3", "q4", "q5", "q6", "q7"] {
            history.record(q);
        }
        history.record("q4");
        assert_eq!(history.as_slice(), &["q4", "q7", "q6", "q5", "q3", "q2"]);
    }

    #[test]
    fn test_record_trims_and_ignores_blank() {
        let mut history = SearchHistory::new();
        history.record("  rice  ");
        history.record("rice");
        history.record("   ");
        assert_eq!(history.as_slice(), &["rice"]);
    }

    #[test]
    fn test_from_queries_keeps_order() {
        let history = SearchHistory::from_queries(["b", "a", "b", " ", "c"]);
        assert_eq!(history.as_slice(), &["b", "a", "c"]);
    }

    #[test]
    fn test_json_is_plain_list() {
        let history = SearchHistory::from_queries(["milk", "rice"]);
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"["milk","rice"]"#);
        let parsed: SearchHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, history);
    }
}
