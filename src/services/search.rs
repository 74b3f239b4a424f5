use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use notekeeper_core::search::{normalize_query, rank, SearchWeights};
use notekeeper_core::{Database, Error, Result};

use super::search_cache::{SearchCache, SearchResults};
use super::with_store;

/// Ranked note search in front of the search cache.
pub struct NoteSearch {
    db: Database,
    cache: Arc<SearchCache>,
    weights: SearchWeights,
    scans: AtomicU64,
}

impl NoteSearch {
    pub fn new(db: Database, cache: Arc<SearchCache>, weights: SearchWeights) -> Self {
        Self {
            db,
            cache,
            weights,
            scans: AtomicU64::new(0),
        }
    }

    pub async fn search(&self, raw_query: &str) -> Result<SearchResults> {
        let query = normalize_query(raw_query);
        if query.is_empty() {
            return Err(Error::validation("empty search query"));
        }

        if let Some(results) = self.cache.lookup(&query).await {
            return Ok(results);
        }

        let generation = self.cache.generation().await;
        self.scans.fetch_add(1, Ordering::Relaxed);
        let weights = self.weights;
        let scan_query = query.clone();
        let results: SearchResults = with_store(&self.db, move |db| {
            Ok(rank(db.active_notes()?, &scan_query, &weights))
        })
        .await?
        .into();

        tracing::debug!(query = %query, hits = results.len(), "Ranked active notes");
        self.cache.store(query, results.clone(), generation).await;
        Ok(results)
    }

    /// Number of times the store has been scanned, i.e. cache misses served.
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &Arc<SearchCache> {
        &self.cache
    }
}
