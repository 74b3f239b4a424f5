//! In-process search result cache.
//!
//! Entries are keyed by the normalized query and expire after a fixed TTL.
//! Every note mutation calls [`SearchCache::invalidate_all`], which also bumps
//! a generation counter; a result computed under an older generation is
//! refused by [`SearchCache::store`] so it cannot resurrect stale hits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use notekeeper_core::models::SearchHit;
use notekeeper_core::Clock;
use tokio::sync::RwLock;
use tracing::debug;

/// Ranked results shared between the cache and responses.
pub type SearchResults = Arc<[SearchHit]>;

struct CacheEntry {
    results: SearchResults,
    stored_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    generation: u64,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct SearchCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached results for `key` if they are younger than the TTL.
    pub async fn lookup(&self, key: &str) -> Option<SearchResults> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let fresh = state
            .entries
            .get(key)
            .map(|entry| (now - entry.stored_at < self.ttl, entry.results.clone()));

        match fresh {
            Some((true, results)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache HIT: {}", key);
                Some(results)
            }
            Some((false, _)) => {
                state.entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache EXPIRED: {}", key);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache MISS: {}", key);
                None
            }
        }
    }

    /// Generation to pass back to [`SearchCache::store`] for a result computed
    /// from now on.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Stores `results` under `key`, replacing any previous entry. Returns
    /// `false` without storing if the cache was invalidated since
    /// `generation` was read.
    pub async fn store(&self, key: String, results: SearchResults, generation: u64) -> bool {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        if state.generation != generation {
            debug!("Cache SET skipped for {}: invalidated during search", key);
            return false;
        }

        let ttl = self.ttl;
        state.entries.retain(|_, e| now - e.stored_at < ttl);
        let stats = self.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            "Cache SET: {} (TTL: {}s)",
            key,
            ttl.num_seconds()
        );
        state.entries.insert(
            key,
            CacheEntry {
                results,
                stored_at: now,
            },
        );
        true
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.state.write().await.entries.remove(key).is_some();
        if removed {
            debug!("Cache INVALIDATE: {}", key);
        }
        removed
    }

    pub async fn invalidate_all(&self) {
        let mut state = self.state.write().await;
        let flushed = state.entries.len();
        state.entries.clear();
        state.generation += 1;
        debug!("Cache FLUSH: removed {} entries", flushed);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notekeeper_core::models::Note;
    use notekeeper_core::ManualClock;
    use uuid::Uuid;

    fn results(title: &str) -> SearchResults {
        let now = Utc::now();
        vec![SearchHit {
            score: 4.0,
            note: Note {
                id: Uuid::new_v4(),
                title: title.into(),
                content: None,
                active: true,
                created_at: now,
                updated_at: now,
            },
        }]
        .into()
    }

    fn cache() -> (SearchCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (SearchCache::new(Duration::seconds(60), clock.clone()), clock)
    }

    #[tokio::test]
    async fn returns_stored_results_until_ttl() {
        let (cache, clock) = cache();
        let stored = results("apple");
        let generation = cache.generation().await;
        assert!(cache.store("apple".into(), stored.clone(), generation).await);

        clock.advance(Duration::seconds(59));
        let hit = cache.lookup("apple").await.unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));

        clock.advance(Duration::seconds(1));
        assert!(cache.lookup("apple").await.is_none());
        assert!(cache.is_empty().await);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn store_overwrites_and_restamps() {
        let (cache, clock) = cache();
        cache.store("q".into(), results("old"), 0).await;
        clock.advance(Duration::seconds(50));
        cache.store("q".into(), results("new"), 0).await;
        clock.advance(Duration::seconds(50));

        let hit = cache.lookup("q").await.unwrap();
        assert_eq!(hit[0].note.title, "new");
    }

    #[tokio::test]
    async fn invalidate_all_rejects_results_from_before_the_flush() {
        let (cache, _clock) = cache();
        let generation = cache.generation().await;
        cache.store("a".into(), results("a"), generation).await;

        cache.invalidate_all().await;
        assert!(cache.lookup("a").await.is_none());
        assert!(!cache.store("b".into(), results("b"), generation).await);
        assert!(cache.is_empty().await);

        let fresh = cache.generation().await;
        assert!(cache.store("b".into(), results("b"), fresh).await);
    }

    #[tokio::test]
    async fn invalidate_removes_a_single_query() {
        let (cache, _clock) = cache();
        cache.store("a".into(), results("a"), 0).await;
        cache.store("b".into(), results("b"), 0).await;

        assert!(cache.invalidate("a").await);
        assert!(!cache.invalidate("a").await);
        assert!(cache.lookup("b").await.is_some());
        assert_eq!(cache.len().await, 1);
    }
}
