pub mod observe;
pub mod sqlite;

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::ArticleRecord;

pub use observe::{observe_all, observe_by_url};
pub use sqlite::SqliteStore;

pub trait Store {
    // Writes
    fn insert_or_replace(&self, records: &[ArticleRecord]) -> Result<usize>;
    /// Clear the store and insert `records` as one atomic step.
    fn replace_all(&self, records: &[ArticleRecord]) -> Result<usize>;
    fn delete_all(&self) -> Result<usize>;
    fn delete_older_than(&self, timestamp_ms: i64) -> Result<usize>;

    // Reads
    /// All records, newest retrieval first, then newest publication first.
    fn get_all(&self) -> Result<Vec<ArticleRecord>>;
    fn get_by_url(&self, url: &str) -> Result<Option<ArticleRecord>>;
    fn count(&self) -> Result<usize>;

    /// Version counter bumped after every committed change.
    fn changes(&self) -> watch::Receiver<u64>;
}
