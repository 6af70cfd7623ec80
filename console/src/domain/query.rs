//! Query and mutation orchestration.
//!
//! One [`QueryClient`] owns every cached read. A query is identified by its
//! [`QueryKey`] (resource plus ordered filter parameters); concurrent calls
//! under one key share a single in-flight fetch, the last successful result
//! is cached, and mutations invalidate keys so active queries refetch.
//!
//! Ordering guarantee: every fetch carries a generation number and only the
//! most recently issued fetch may write its outcome back. A stale response
//! arriving after a newer request is discarded, never applied.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::error::{ClientError, ClientResult};

/// Default number of automatic retries for a failed query fetch.
pub const DEFAULT_RETRY_LIMIT: u32 = 1;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;
type SharedFetch<T> = Shared<BoxFuture<'static, ClientResult<T>>>;
type EntryMap = HashMap<QueryKey, Box<dyn AnyEntry>>;

/// Identity of a cached read: resource name plus ordered filter parameters.
///
/// Parameters are kept sorted so two filters that differ only in insertion
/// order share a cache slot.
///
/// # Examples
/// ```
/// use minihome_console::domain::QueryKey;
///
/// let key = QueryKey::new("users")
///     .with_param("search", "gil")
///     .with_param("isApproved", "true");
/// assert_eq!(key.to_string(), "users?isApproved=true&search=gil");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    params: Vec<(String, String)>,
}

impl QueryKey {
    /// Key for an unparameterised query on a resource.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    /// Add one filter parameter, keeping parameters sorted.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self.params.sort();
        self
    }

    /// Add several filter parameters at once.
    #[must_use]
    pub fn with_params<N, V>(mut self, pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(pairs.into_iter().map(|(n, v)| (n.into(), v.into())));
        self.params.sort();
        self
    }

    /// Resource this key belongs to.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        for (index, (name, value)) in self.params.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{separator}{name}={value}")?;
        }
        Ok(())
    }
}

/// Observable state of one query key.
///
/// A failed refetch keeps the previous `data` and surfaces the new `error`
/// alongside it; consumers decide which to render.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<T> {
    /// Last successful result, if any fetch has succeeded.
    pub data: Option<T>,
    /// Most recent failure, cleared by the next success.
    pub error: Option<ClientError>,
    /// Whether a fetch is currently in flight.
    pub is_loading: bool,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

/// Type-erased cache slot so untyped operations (invalidate, forget) work
/// across heterogeneous result types.
trait AnyEntry: Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Issue a new-generation fetch and hand back a driver future.
    fn start_refresh(&mut self, inner: &Arc<Inner>, key: &QueryKey) -> BoxFuture<'static, ()>;
}

struct QueryEntry<T> {
    snapshot: watch::Sender<QuerySnapshot<T>>,
    fetcher: Fetcher<T>,
    inflight: Option<(u64, SharedFetch<T>)>,
    generation: u64,
}

impl<T: Clone + Send + Sync + 'static> QueryEntry<T> {
    fn new(fetcher: Fetcher<T>) -> Self {
        let (snapshot, _) = watch::channel(QuerySnapshot::default());
        Self {
            snapshot,
            fetcher,
            inflight: None,
            generation: 0,
        }
    }

    fn has_data(&self) -> bool {
        self.snapshot.borrow().data.is_some()
    }

    /// Begin a fetch under a fresh generation. The returned future is shared:
    /// every concurrent caller awaits the same underlying request, and the
    /// completion bookkeeping runs exactly once, inside the future itself.
    fn start_fetch(&mut self, inner: &Arc<Inner>, key: &QueryKey) -> SharedFetch<T> {
        self.generation += 1;
        let generation = self.generation;
        self.snapshot.send_modify(|snap| snap.is_loading = true);

        let fetcher = Arc::clone(&self.fetcher);
        let retry_limit = inner.retry_limit;
        let weak = Arc::downgrade(inner);
        let key = key.clone();
        let fut = async move {
            let result = run_with_retry(&fetcher, retry_limit).await;
            if let Some(inner) = weak.upgrade() {
                settle::<T>(&inner, &key, generation, result.clone());
            }
            result
        };
        let shared = fut.boxed().shared();
        self.inflight = Some((generation, shared.clone()));
        shared
    }
}

impl<T: Clone + Send + Sync + 'static> AnyEntry for QueryEntry<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn start_refresh(&mut self, inner: &Arc<Inner>, key: &QueryKey) -> BoxFuture<'static, ()> {
        let shared = self.start_fetch(inner, key);
        async move {
            let _outcome = shared.await;
        }
        .boxed()
    }
}

async fn run_with_retry<T>(fetcher: &Fetcher<T>, retry_limit: u32) -> ClientResult<T> {
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < retry_limit => {
                attempt += 1;
                debug!(attempt, error = %error, "query fetch failed; retrying");
            }
            Err(error) => return Err(error),
        }
    }
}

/// Write a completed fetch back into the cache, unless it went stale or the
/// key was forgotten while the fetch ran.
fn settle<T: Clone + Send + Sync + 'static>(
    inner: &Arc<Inner>,
    key: &QueryKey,
    generation: u64,
    result: ClientResult<T>,
) {
    let mut entries = inner.lock_entries();
    let Some(slot) = entries.get_mut(key) else {
        debug!(%key, "query key forgotten while fetch was in flight; result dropped");
        return;
    };
    let Some(entry) = slot.as_any_mut().downcast_mut::<QueryEntry<T>>() else {
        return;
    };
    if generation != entry.generation {
        debug!(
            %key,
            stale = generation,
            newest = entry.generation,
            "stale query response discarded"
        );
        return;
    }
    entry.inflight = None;
    entry.snapshot.send_modify(|snap| {
        snap.is_loading = false;
        match result {
            Ok(data) => {
                snap.data = Some(data);
                snap.error = None;
            }
            Err(error) => snap.error = Some(error),
        }
    });
}

struct Inner {
    entries: Mutex<EntryMap>,
    retry_limit: u32,
}

impl Inner {
    /// The entries lock is only ever held for map surgery, never across an
    /// await, so poisoning can only follow a panic elsewhere; recover the
    /// guard rather than propagating it.
    fn lock_entries(&self) -> MutexGuard<'_, EntryMap> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache and lifecycle manager for queries and mutations.
///
/// Cheap to clone; clones share one cache. See the module docs for the
/// ordering and deduplication guarantees.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_LIMIT)
    }
}

impl QueryClient {
    /// Create a client that retries failed fetches up to `retry_limit` times.
    #[must_use]
    pub fn new(retry_limit: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                retry_limit,
            }),
        }
    }

    /// Resolve a query: serve the cached result when fresh, join the
    /// in-flight fetch when one exists, otherwise run `fetcher` (with
    /// automatic retry of transient failures).
    ///
    /// The fetcher is retained so a later [`QueryClient::invalidate`] can
    /// re-execute it.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QuerySnapshot<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetcher().boxed());
        let join = {
            let mut entries = self.inner.lock_entries();
            let slot = entries
                .entry(key.clone())
                .or_insert_with(|| Box::new(QueryEntry::new(Arc::clone(&fetcher))));
            if slot.as_any().downcast_ref::<QueryEntry<T>>().is_none() {
                warn!(%key, "query key reused with a different result type; cache slot reset");
                *slot = Box::new(QueryEntry::new(Arc::clone(&fetcher)));
            }
            let Some(entry) = slot.as_any_mut().downcast_mut::<QueryEntry<T>>() else {
                return QuerySnapshot::default();
            };
            entry.fetcher = Arc::clone(&fetcher);
            if let Some((_, shared)) = &entry.inflight {
                shared.clone()
            } else if entry.has_data() {
                return entry.snapshot.borrow().clone();
            } else {
                entry.start_fetch(&self.inner, &key)
            }
        };

        let result = join.await;
        self.snapshot::<T>(&key)
            .unwrap_or_else(|| snapshot_from(result))
    }

    /// Force a new fetch for a key, reusing the retained fetcher.
    ///
    /// Returns `None` when the key has never been queried.
    pub async fn refetch<T>(&self, key: &QueryKey) -> Option<QuerySnapshot<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let join = {
            let mut entries = self.inner.lock_entries();
            let entry = entries
                .get_mut(key)?
                .as_any_mut()
                .downcast_mut::<QueryEntry<T>>()?;
            entry.start_fetch(&self.inner, key)
        };
        let result = join.await;
        Some(
            self.snapshot::<T>(key)
                .unwrap_or_else(|| snapshot_from(result)),
        )
    }

    /// Mark a key stale and re-execute its retained fetcher in the
    /// background. No-op for keys that were never queried.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime; the refetch is driven by a
    /// spawned task.
    pub fn invalidate(&self, key: &QueryKey) {
        let task = {
            let mut entries = self.inner.lock_entries();
            entries
                .get_mut(key)
                .map(|slot| slot.start_refresh(&self.inner, key))
        };
        if let Some(task) = task {
            debug!(%key, "query invalidated; refetching");
            drop(tokio::spawn(task));
        }
    }

    /// Invalidate every cached key under a resource, whatever its filters.
    /// A mutation on a record affects every filtered view of that resource.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime; refetches are driven by
    /// spawned tasks.
    pub fn invalidate_resource(&self, resource: &str) {
        let tasks: Vec<BoxFuture<'static, ()>> = {
            let mut entries = self.inner.lock_entries();
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.resource() == resource)
                .cloned()
                .collect();
            keys.iter()
                .filter_map(|key| {
                    entries
                        .get_mut(key)
                        .map(|slot| slot.start_refresh(&self.inner, key))
                })
                .collect()
        };
        debug!(resource, count = tasks.len(), "resource invalidated");
        for task in tasks {
            drop(tokio::spawn(task));
        }
    }

    /// Current state of a key without triggering a fetch.
    #[must_use]
    pub fn snapshot<T>(&self, key: &QueryKey) -> Option<QuerySnapshot<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.inner.lock_entries();
        let entry = entries.get(key)?.as_any().downcast_ref::<QueryEntry<T>>()?;
        Some(entry.snapshot.borrow().clone())
    }

    /// Watch a key's state; the receiver observes every transition.
    ///
    /// Returns `None` when the key has never been queried.
    #[must_use]
    pub fn subscribe<T>(&self, key: &QueryKey) -> Option<watch::Receiver<QuerySnapshot<T>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.inner.lock_entries();
        let entry = entries.get(key)?.as_any().downcast_ref::<QueryEntry<T>>()?;
        Some(entry.snapshot.subscribe())
    }

    /// Drop a key entirely. An in-flight fetch for the key completes but its
    /// result is discarded — a detached view observes no further updates.
    pub fn forget(&self, key: &QueryKey) {
        let mut entries = self.inner.lock_entries();
        entries.remove(key);
    }
}

fn snapshot_from<T>(result: ClientResult<T>) -> QuerySnapshot<T> {
    match result {
        Ok(data) => QuerySnapshot {
            data: Some(data),
            error: None,
            is_loading: false,
        },
        Err(error) => QuerySnapshot {
            data: None,
            error: Some(error),
            is_loading: false,
        },
    }
}

/// Which cached reads a successful mutation must invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// One exact key.
    Key(QueryKey),
    /// Every key under a resource, whatever its filters.
    Resource(String),
}

/// A mutation bound to the cache entries it invalidates.
///
/// `execute` runs the operation, reports `is_pending` while it runs, records
/// the failure for inline display, and on success triggers the registered
/// invalidations so dependent queries refetch.
#[derive(Clone)]
pub struct MutationHandle {
    client: QueryClient,
    invalidations: Vec<Invalidation>,
    pending: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<ClientError>>>,
}

impl MutationHandle {
    /// Bind a mutation to the client whose cache it affects.
    #[must_use]
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            invalidations: Vec::new(),
            pending: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Register an invalidation applied after each successful execution.
    #[must_use]
    pub fn invalidating(mut self, invalidation: Invalidation) -> Self {
        self.invalidations.push(invalidation);
        self
    }

    /// Whether an execution is currently in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Failure of the most recent execution, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<ClientError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one mutation. Failures are recorded and returned; the cache is
    /// left untouched so views keep their data.
    pub async fn execute<T>(&self, op: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        self.pending.store(true, Ordering::SeqCst);
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;

        let result = op.await;
        match &result {
            Ok(_) => {
                for invalidation in &self.invalidations {
                    match invalidation {
                        Invalidation::Key(key) => self.client.invalidate(key),
                        Invalidation::Resource(resource) => {
                            self.client.invalidate_resource(resource);
                        }
                    }
                }
            }
            Err(error) => {
                *self
                    .last_error
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(error.clone());
            }
        }
        self.pending.store(false, Ordering::SeqCst);
        result
    }
}
