mod rate_limiter;
mod search;
mod search_cache;

pub use rate_limiter::*;
pub use search::*;
pub use search_cache::*;

use notekeeper_core::{Database, Error, Result};

/// Runs a store call on the blocking pool so SQLite I/O never parks an
/// async worker thread.
pub async fn with_store<T, F>(db: &Database, f: F) -> Result<T>
where
    F: FnOnce(&Database) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| Error::Interrupted(e.to_string()))?
}
