//! Cached reads.

use crate::cache::QueryCache;
use crate::error::QueryError;
use crate::key::QueryKey;
use clinic_core::ClientResult;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<ClientResult<T>> + Send + Sync>;

/// Snapshot of a query as a UI would render it.
#[derive(Clone, Debug)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<QueryError>,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    /// State of a disabled query, or of an enabled one that has never fetched.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
            error: None,
            is_stale: false,
        }
    }

    fn success(data: T, is_stale: bool) -> Self {
        Self {
            data: Some(data),
            is_stale,
            ..Self::idle()
        }
    }

    fn failure(error: QueryError, data: Option<(T, bool)>) -> Self {
        let (data, is_stale) = match data {
            Some((data, stale)) => (Some(data), stale),
            None => (None, false),
        };
        Self {
            data,
            is_loading: false,
            is_error: true,
            error: Some(error),
            is_stale,
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.is_error
    }
}

/// A key bound to a fetcher.
///
/// A query without a key is disabled: it never calls its fetcher and always reports
/// [`QueryState::idle`].
pub struct Query<T> {
    cache: QueryCache,
    key: Option<QueryKey>,
    fetcher: Option<Fetcher<T>>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<T> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(cache: QueryCache, key: Option<QueryKey>, fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || Box::pin(fetcher()) as BoxFuture<_>);
        Self {
            cache,
            key,
            fetcher: Some(fetcher),
        }
    }

    /// A query with nothing to fetch yet, such as a detail view before an id is chosen.
    pub fn disabled(cache: QueryCache) -> Self {
        Self {
            cache,
            key: None,
            fetcher: None,
        }
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some() && self.fetcher.is_some()
    }

    /// Current state from the cache, without fetching. Stale data is returned as-is with
    /// `is_stale` set.
    pub fn state(&self) -> QueryState<T> {
        let Some(key) = &self.key else {
            return QueryState::idle();
        };
        let cached = self.cache.get::<T>(key);
        let is_loading = self.cache.is_fetching(key);
        match self.cache.error(key) {
            Some(error) if !is_loading => QueryState::failure(error, cached),
            _ => {
                let (data, is_stale) = match cached {
                    Some((data, stale)) => (Some(data), stale),
                    None => (None, false),
                };
                QueryState {
                    data,
                    is_loading,
                    is_error: false,
                    error: None,
                    is_stale,
                }
            }
        }
    }

    /// Serve fresh cached data, otherwise fetch. A key whose latest fetch failed is fetched
    /// again.
    pub async fn fetch(&self) -> QueryState<T> {
        let Some(key) = &self.key else {
            return QueryState::idle();
        };
        if self.cache.error(key).is_none() {
            if let Some((data, false)) = self.cache.get::<T>(key) {
                return QueryState::success(data, false);
            }
        }
        self.refetch().await
    }

    /// Fetch unconditionally and store the result.
    ///
    /// The fetch runs as its own task so that dropping the last [`Subscription`] for the key can
    /// abort it.
    pub async fn refetch(&self) -> QueryState<T> {
        let (Some(key), Some(fetcher)) = (&self.key, &self.fetcher) else {
            return QueryState::idle();
        };

        let seq = self.cache.begin_fetch(key);
        tracing::debug!(%key, seq, "fetching query");
        let task = tokio::spawn(fetcher());
        self.cache.track_fetch(key, seq, task.abort_handle());

        let outcome = match task.await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(err)) => Err(QueryError::from(err)),
            Err(join) if join.is_cancelled() => Err(QueryError::Cancelled),
            Err(_) => Err(QueryError::Panicked),
        };

        match outcome {
            Ok(data) => {
                let stale = self.cache.complete_fetch(key, seq, Ok(data.clone()));
                QueryState::success(data, stale)
            }
            Err(error) => {
                tracing::debug!(%key, seq, %error, "query fetch failed");
                self.cache.complete_fetch::<T>(key, seq, Err(error.clone()));
                QueryState::failure(error, self.cache.get::<T>(key))
            }
        }
    }

    /// Register interest in this query's key. Dropping the last subscription for a key aborts
    /// its in-flight fetches.
    pub fn subscribe(&self) -> Subscription {
        if let Some(key) = &self.key {
            self.cache.subscribe(key);
        }
        Subscription {
            cache: self.cache.clone(),
            key: self.key.clone(),
        }
    }
}

/// Guard returned by [`Query::subscribe`].
#[must_use = "dropping a subscription immediately unsubscribes"]
pub struct Subscription {
    cache: QueryCache,
    key: Option<QueryKey>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(key) = &self.key {
            self.cache.unsubscribe(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceKind;
    use clinic_core::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn key() -> QueryKey {
        QueryKey::kind(ResourceKind::Drugs).text("list")
    }

    fn counting_query(cache: &QueryCache, key: Option<QueryKey>) -> (Query<u32>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let query = Query::new(cache.clone(), key, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u32 + 1;
            async move { Ok(n) }
        });
        (query, calls)
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryCache::new();
        let (query, calls) = counting_query(&cache, None);
        let state = query.fetch().await;
        assert!(state.data.is_none());
        assert!(!state.is_error);
        assert!(!state.is_loading);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_without_fetcher_is_idle() {
        let query: Query<u32> = Query::disabled(QueryCache::new());
        assert!(!query.is_enabled());
        let state = query.refetch().await;
        assert!(state.data.is_none() && !state.is_error);
        drop(query.subscribe());
    }

    #[tokio::test]
    async fn test_fresh_data_is_served_from_cache() {
        let cache = QueryCache::new();
        let (query, calls) = counting_query(&cache, Some(key()));
        assert_eq!(query.fetch().await.data, Some(1));
        assert_eq!(query.fetch().await.data, Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_serves_stale_then_refetches() {
        let cache = QueryCache::new();
        let (query, calls) = counting_query(&cache, Some(key()));
        query.fetch().await;
        cache.invalidate(&QueryKey::kind(ResourceKind::Drugs));

        let state = query.state();
        assert_eq!(state.data, Some(1));
        assert!(state.is_stale);

        let state = query.fetch().await;
        assert_eq!(state.data, Some(2));
        assert!(!state.is_stale);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data() {
        let cache = QueryCache::new();
        cache.set(key(), 7u32);
        cache.invalidate(&key());
        let query: Query<u32> = Query::new(cache.clone(), Some(key()), || async {
            Err(ClientError::Api {
                status: 500,
                message: "database unavailable".into(),
            })
        });

        let state = query.fetch().await;
        assert!(state.is_error);
        assert_eq!(state.data, Some(7));
        assert_eq!(
            state.error.as_ref().and_then(QueryError::client_error).and_then(ClientError::status),
            Some(500)
        );
        assert!(query.state().is_error);
    }

    #[tokio::test]
    async fn test_queries_on_one_key_share_error_state() {
        let cache = QueryCache::new();
        let failing: Query<u32> = Query::new(cache.clone(), Some(key()), || async {
            Err(ClientError::Api {
                status: 503,
                message: "service unavailable".into(),
            })
        });
        let succeeding: Query<u32> = Query::new(cache.clone(), Some(key()), || async { Ok(7) });

        assert!(failing.fetch().await.is_error);
        assert!(succeeding.state().is_error);

        let state = succeeding.fetch().await;
        assert_eq!(state.data, Some(7));
        assert!(!state.is_error);

        let seen = failing.state();
        assert_eq!(seen.data, Some(7));
        assert!(!seen.is_error);
        let fetched = failing.fetch().await;
        assert_eq!(fetched.data, Some(7));
        assert!(!fetched.is_error);
        assert!(cache.error(&key()).is_none());
    }

    #[tokio::test]
    async fn test_last_unsubscribe_aborts_fetch() {
        let cache = QueryCache::new();
        let started = Arc::new(Notify::new());
        let signal = started.clone();
        let query: Query<u32> = Query::new(cache.clone(), Some(key()), move || {
            let signal = signal.clone();
            async move {
                signal.notify_one();
                std::future::pending::<()>().await;
                Ok(1)
            }
        });

        let first = query.subscribe();
        let second = query.subscribe();
        let running = tokio::spawn({
            let query = query.clone();
            async move { query.fetch().await }
        });
        started.notified().await;
        assert!(cache.is_fetching(&key()));

        drop(first);
        assert!(cache.is_fetching(&key()));
        drop(second);

        let state = running.await.unwrap();
        assert!(matches!(state.error, Some(QueryError::Cancelled)));
        assert!(!cache.contains(&key()));
        assert_eq!(cache.subscriber_count(&key()), 0);
    }
}
