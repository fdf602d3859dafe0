//! The process-wide query cache.
//!
//! Entries are keyed by [`QueryKey`] and hold type-erased data. The cache changes only when a
//! fetch for a key completes or when a caller invalidates or removes keys by prefix; nothing
//! expires on a timer. The error of the latest failed fetch lives beside the data, so every
//! query on a key sees the same outcome.

use crate::error::QueryError;
use crate::key::QueryKey;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

type Data = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Entry {
    data: Option<Data>,
    /// Sequence number of the fetch that produced `data`.
    data_seq: u64,
    /// Fetches started at or before this sequence number produce stale data.
    invalidated_seq: u64,
    error: Option<QueryError>,
    /// Sequence number of the fetch that last set or cleared `error`.
    error_seq: u64,
    in_flight: Vec<(u64, AbortHandle)>,
    subscribers: usize,
}

impl Entry {
    fn is_stale(&self) -> bool {
        self.data.is_some() && self.data_seq <= self.invalidated_seq
    }

    fn is_unused(&self) -> bool {
        self.data.is_none()
            && self.error.is_none()
            && self.in_flight.is_empty()
            && self.subscribers == 0
    }

    fn clear_error(&mut self, seq: u64) {
        self.error = None;
        self.error_seq = seq;
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
}

/// Shared, cheaply clonable handle on one cache.
///
/// The lock is held only for map updates and is never held across an `.await`.
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<State>>,
    seq: Arc<AtomicU64>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().entries.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Cached data for `key` and whether it is stale. `None` on a miss or a type mismatch.
    pub fn get<T>(&self, key: &QueryKey) -> Option<(T, bool)>
    where
        T: Clone + Send + Sync + 'static,
    {
        let state = self.lock();
        let entry = state.entries.get(key)?;
        let data = entry.data.as_ref()?.downcast_ref::<T>()?.clone();
        Some((data, entry.is_stale()))
    }

    /// Store `value` as fresh data for `key`, as if a fetch had just completed.
    pub fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let seq = self.next_seq();
        let mut state = self.lock();
        let entry = state.entries.entry(key).or_default();
        entry.data = Some(Arc::new(value));
        entry.data_seq = seq;
        entry.clear_error(seq);
    }

    /// Error of the latest fetch for `key`, until a newer fetch succeeds.
    pub fn error(&self, key: &QueryKey) -> Option<QueryError> {
        self.lock().entries.get(key).and_then(|e| e.error.clone())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|e| e.data.is_some())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().entries.get(key).is_some_and(Entry::is_stale)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|e| !e.in_flight.is_empty())
    }

    /// Keys currently holding data, in no particular order.
    pub fn keys(&self) -> Vec<QueryKey> {
        self.lock()
            .entries
            .iter()
            .filter(|(_, e)| e.data.is_some())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Mark every entry under `prefix` stale, including results of fetches already in flight.
    /// Returns the number of entries holding data that were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let seq = self.next_seq();
        let mut state = self.lock();
        let mut marked = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated_seq = seq;
                if entry.data.is_some() {
                    marked += 1;
                }
            }
        }
        tracing::debug!(%prefix, marked, "invalidated queries");
        marked
    }

    /// Drop the data and error of every entry under `prefix`. Returns the number of entries cleared.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let seq = self.next_seq();
        let mut state = self.lock();
        let mut removed = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.starts_with(prefix) && entry.data.take().is_some() {
                removed += 1;
            }
            if key.starts_with(prefix) {
                // Late results of fetches started before the removal must not resurrect data.
                entry.data_seq = seq;
                entry.invalidated_seq = seq;
                entry.clear_error(seq);
            }
        }
        state.entries.retain(|_, e| !e.is_unused());
        tracing::debug!(%prefix, removed, "removed queries");
        removed
    }

    pub(crate) fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let seq = self.next_seq();
        self.lock().entries.entry(key.clone()).or_default();
        seq
    }

    pub(crate) fn track_fetch(&self, key: &QueryKey, seq: u64, handle: AbortHandle) {
        let mut state = self.lock();
        let entry = state.entries.entry(key.clone()).or_default();
        entry.in_flight.push((seq, handle));
    }

    /// Record a finished fetch. Returns whether the stored data is stale.
    ///
    /// A success older than the data already stored is discarded. A failure is kept only when
    /// it is newer than both the stored data and the stored error; a newer success clears it.
    pub(crate) fn complete_fetch<T>(
        &self,
        key: &QueryKey,
        seq: u64,
        outcome: Result<T, QueryError>,
    ) -> bool
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.lock();
        let entry = state.entries.entry(key.clone()).or_default();
        entry.in_flight.retain(|(s, _)| *s != seq);
        match outcome {
            Ok(value) => {
                if seq > entry.data_seq {
                    entry.data = Some(Arc::new(value));
                    entry.data_seq = seq;
                } else {
                    tracing::debug!(%key, seq, "discarded out-of-order fetch result");
                }
                if seq > entry.error_seq {
                    entry.clear_error(seq);
                }
            }
            Err(error) => {
                if seq > entry.data_seq && seq > entry.error_seq {
                    entry.error = Some(error);
                    entry.error_seq = seq;
                } else {
                    tracing::debug!(%key, seq, "discarded out-of-order fetch error");
                }
            }
        }
        let stale = seq <= entry.invalidated_seq;
        if entry.is_unused() {
            state.entries.remove(key);
        }
        stale
    }

    pub(crate) fn subscribe(&self, key: &QueryKey) {
        self.lock().entries.entry(key.clone()).or_default().subscribers += 1;
    }

    pub(crate) fn unsubscribe(&self, key: &QueryKey) {
        let mut state = self.lock();
        let Some(entry) = state.entries.get_mut(key) else {
            return;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 && !entry.in_flight.is_empty() {
            tracing::debug!(%key, fetches = entry.in_flight.len(), "aborting unobserved fetches");
            for (_, handle) in entry.in_flight.drain(..) {
                handle.abort();
            }
        }
        if entry.is_unused() {
            state.entries.remove(key);
        }
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.lock().entries.get(key).map_or(0, |e| e.subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceKind;

    fn drugs() -> QueryKey {
        QueryKey::kind(ResourceKind::Drugs)
    }

    #[test]
    fn test_set_and_get() {
        let cache = QueryCache::new();
        cache.set(drugs().text("list"), vec![1, 2, 3]);
        assert_eq!(
            cache.get::<Vec<i32>>(&drugs().text("list")),
            Some((vec![1, 2, 3], false))
        );
        assert_eq!(cache.get::<String>(&drugs().text("list")), None);
        assert_eq!(cache.get::<Vec<i32>>(&drugs().text("detail")), None);
    }

    #[test]
    fn test_invalidate_marks_only_prefix() {
        let cache = QueryCache::new();
        cache.set(drugs().text("list"), 1u8);
        cache.set(drugs().text("detail").id(2), 2u8);
        cache.set(QueryKey::kind(ResourceKind::Patients).text("list"), 3u8);

        assert_eq!(cache.invalidate(&drugs()), 2);
        assert!(cache.is_stale(&drugs().text("list")));
        assert!(cache.is_stale(&drugs().text("detail").id(2)));
        assert!(!cache.is_stale(&QueryKey::kind(ResourceKind::Patients).text("list")));
        assert_eq!(cache.get::<u8>(&drugs().text("list")), Some((1, true)));
    }

    #[test]
    fn test_remove_drops_data() {
        let cache = QueryCache::new();
        cache.set(drugs().text("detail").id(2), 2u8);
        assert_eq!(cache.remove(&drugs().text("detail")), 1);
        assert!(!cache.contains(&drugs().text("detail").id(2)));
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn test_older_fetch_result_is_discarded() {
        let cache = QueryCache::new();
        let key = drugs().text("list");
        let first = cache.begin_fetch(&key);
        let second = cache.begin_fetch(&key);
        cache.complete_fetch(&key, second, Ok("new"));
        cache.complete_fetch(&key, first, Ok("old"));
        assert_eq!(cache.get::<&str>(&key), Some(("new", false)));
    }

    #[test]
    fn test_error_is_shared_and_cleared_by_newer_success() {
        let cache = QueryCache::new();
        let key = drugs().text("list");
        let failing = cache.begin_fetch(&key);
        cache.complete_fetch::<u8>(&key, failing, Err(QueryError::Panicked));
        assert!(matches!(cache.error(&key), Some(QueryError::Panicked)));

        let ok = cache.begin_fetch(&key);
        cache.complete_fetch(&key, ok, Ok(1u8));
        assert!(cache.error(&key).is_none());
        assert_eq!(cache.get::<u8>(&key), Some((1, false)));
    }

    #[test]
    fn test_older_failure_does_not_mask_newer_success() {
        let cache = QueryCache::new();
        let key = drugs().text("list");
        let first = cache.begin_fetch(&key);
        let second = cache.begin_fetch(&key);
        cache.complete_fetch(&key, second, Ok(2u8));
        cache.complete_fetch::<u8>(&key, first, Err(QueryError::Panicked));
        assert!(cache.error(&key).is_none());
    }

    #[test]
    fn test_remove_clears_error() {
        let cache = QueryCache::new();
        let key = drugs().text("list");
        let seq = cache.begin_fetch(&key);
        cache.complete_fetch::<u8>(&key, seq, Err(QueryError::Cancelled));
        assert!(cache.error(&key).is_some());
        cache.remove(&drugs());
        assert!(cache.error(&key).is_none());
    }

    #[test]
    fn test_fetch_started_before_invalidation_is_stale() {
        let cache = QueryCache::new();
        let key = drugs().text("list");
        let seq = cache.begin_fetch(&key);
        cache.invalidate(&drugs());
        assert!(cache.complete_fetch(&key, seq, Ok(1u8)));
        assert!(cache.is_stale(&key));
    }
}
