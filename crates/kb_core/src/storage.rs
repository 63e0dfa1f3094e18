use crate::types::SearchRecord;
use crate::Result;

/// Append-only log of served queries.
///
/// Implementations are shared between request tasks, so every method takes
/// `&self` and must be safe to call concurrently.
pub trait SearchStore: Send + Sync {
    /// Record one query/answer pair, returning the stored copy
    fn save(&self, query: &str, answer: &str, relevant_ids: &[String]) -> Result<SearchRecord>;

    /// Snapshot of every record in save order
    fn list(&self) -> Result<Vec<SearchRecord>>;

    /// Drop all records
    fn clear(&self) -> Result<()>;
}
