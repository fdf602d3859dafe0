//! Writes with explicit invalidation.

use crate::cache::QueryCache;
use crate::error::{QueryError, SubmitError};
use crate::key::QueryKey;
use crate::query::BoxFuture;
use clinic_core::{ClientError, ClientResult, FormBody, RawForm};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

type Runner<V, R> = Arc<dyn Fn(V) -> BoxFuture<ClientResult<R>> + Send + Sync>;
type SuccessHook<V, R> = Arc<dyn Fn(&R, &V, &QueryCache) + Send + Sync>;
type ErrorHook<V> = Arc<dyn Fn(&ClientError, &V) + Send + Sync>;

/// Last settled phase of a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Pending,
    Success,
    Error,
}

/// Snapshot of a mutation's lifecycle.
#[derive(Clone, Debug)]
pub struct MutationStatus {
    pub phase: MutationPhase,
    pub in_flight: usize,
    pub error: Option<QueryError>,
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }
}

struct Lifecycle {
    settled: MutationPhase,
    in_flight: usize,
    error: Option<QueryError>,
}

/// Counts one in-flight invocation for as long as it lives, including when the caller drops the
/// `mutate` future early.
struct PendingGuard {
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl PendingGuard {
    fn enter(lifecycle: Arc<Mutex<Lifecycle>>) -> Self {
        lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight += 1;
        Self { lifecycle }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        lifecycle.in_flight = lifecycle.in_flight.saturating_sub(1);
    }
}

/// A write operation plus what to do after it.
///
/// Concurrent calls to [`Mutation::mutate`] all run; nothing is deduplicated or serialised.
pub struct Mutation<V, R> {
    cache: QueryCache,
    run: Runner<V, R>,
    invalidates: Vec<QueryKey>,
    on_success: Vec<SuccessHook<V, R>>,
    on_error: Vec<ErrorHook<V>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl<V, R> Clone for Mutation<V, R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            run: self.run.clone(),
            invalidates: self.invalidates.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<V, R> Mutation<V, R>
where
    V: Clone + Send + 'static,
    R: Send + 'static,
{
    pub fn new<F, Fut>(cache: QueryCache, run: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<R>> + Send + 'static,
    {
        let run: Runner<V, R> = Arc::new(move |vars| Box::pin(run(vars)) as BoxFuture<_>);
        Self {
            cache,
            run,
            invalidates: Vec::new(),
            on_success: Vec::new(),
            on_error: Vec::new(),
            lifecycle: Arc::new(Mutex::new(Lifecycle {
                settled: MutationPhase::Idle,
                in_flight: 0,
                error: None,
            })),
        }
    }

    /// Invalidate every key under `prefixes` after each success, before the success hooks run.
    pub fn invalidates(mut self, prefixes: impl IntoIterator<Item = QueryKey>) -> Self {
        self.invalidates.extend(prefixes);
        self
    }

    /// Run `hook` after each success. Hooks run in registration order.
    pub fn on_success(
        mut self,
        hook: impl Fn(&R, &V, &QueryCache) + Send + Sync + 'static,
    ) -> Self {
        self.on_success.push(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&ClientError, &V) + Send + Sync + 'static) -> Self {
        self.on_error.push(Arc::new(hook));
        self
    }

    fn lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> MutationStatus {
        let lifecycle = self.lifecycle();
        MutationStatus {
            phase: if lifecycle.in_flight > 0 {
                MutationPhase::Pending
            } else {
                lifecycle.settled
            },
            in_flight: lifecycle.in_flight,
            error: lifecycle.error.clone(),
        }
    }

    /// Run the mutation, then invalidation and hooks, then return.
    pub async fn mutate(&self, vars: V) -> Result<R, QueryError> {
        let _pending = PendingGuard::enter(self.lifecycle.clone());
        let result = (self.run)(vars.clone()).await;

        match result {
            Ok(value) => {
                for prefix in &self.invalidates {
                    self.cache.invalidate(prefix);
                }
                for hook in &self.on_success {
                    hook(&value, &vars, &self.cache);
                }
                self.settle(MutationPhase::Success, None);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "mutation failed");
                for hook in &self.on_error {
                    hook(&err, &vars);
                }
                let error = QueryError::from(err);
                self.settle(MutationPhase::Error, Some(error.clone()));
                Err(error)
            }
        }
    }

    fn settle(&self, phase: MutationPhase, error: Option<QueryError>) {
        let mut lifecycle = self.lifecycle();
        lifecycle.settled = phase;
        lifecycle.error = error;
    }

    /// Validate `form` as `F`, map it to variables and run the mutation.
    ///
    /// A form that fails validation returns [`SubmitError::Invalid`] without touching the
    /// mutation's status or sending anything.
    pub async fn submit<F: FormBody>(
        &self,
        form: &RawForm,
        to_vars: impl FnOnce(F) -> V,
    ) -> Result<R, SubmitError> {
        let body = F::from_form(form)?;
        Ok(self.mutate(to_vars(body)).await?)
    }
}
