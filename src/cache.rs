//! Process-wide catalog memoization
//!
//! Wraps a [`CatalogLoader`] with single-flight resolution: concurrent
//! callers requesting the catalog while a load is in flight all observe the
//! same underlying resolution, and only a complete, non-empty result is
//! kept. An empty or failed load leaves the cache empty so the next call
//! retries - a transient dependency or filesystem hiccup must never starve
//! all callers until process restart.

use crate::catalog::{CatalogLoad, ModelCatalogAggregator, ModelCatalogEntry};
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Asynchronous catalog data source consumed by [`CatalogCache`].
///
/// Implementations fail soft: a load never errors, it reports an incomplete
/// [`CatalogLoad`] instead.
#[async_trait]
pub trait CatalogLoader: Send + Sync + 'static {
    async fn load(&self) -> CatalogLoad;
}

#[async_trait]
impl CatalogLoader for ModelCatalogAggregator {
    async fn load(&self) -> CatalogLoad {
        self.aggregate().await
    }
}

/// Shared result of one in-flight load: the entry list and whether the load
/// completed without a source failure.
type SharedLoad = Shared<BoxFuture<'static, (Arc<Vec<ModelCatalogEntry>>, bool)>>;

enum Slot {
    Empty,
    InFlight(SharedLoad),
    Ready(Arc<Vec<ModelCatalogEntry>>),
}

struct CacheState {
    // Bumped whenever a new load starts and on every invalidation. A waiter
    // of an earlier load carries an older value, so it can neither commit
    // its result over a forced refresh nor roll back a newer in-flight load.
    generation: u64,
    slot: Slot,
}

/// Single-flight memoization of catalog aggregation.
///
/// Lifecycle: empty at startup; holds an in-flight load on first request;
/// resolves to a cached non-empty list or reverts to empty on failure or an
/// empty result. Explicit invalidation is supported for forced refresh.
pub struct CatalogCache {
    loader: Arc<dyn CatalogLoader>,
    timeout: Option<Duration>,
    state: Mutex<CacheState>,
}

impl CatalogCache {
    pub fn new(loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            loader,
            timeout: None,
            state: Mutex::new(CacheState {
                generation: 0,
                slot: Slot::Empty,
            }),
        }
    }

    /// Bound each underlying load. A timed-out load is a failure: callers
    /// get an empty list and nothing is cached.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the catalog, reusing a cached or in-flight result.
    pub async fn get(&self) -> Arc<Vec<ModelCatalogEntry>> {
        self.resolve(false).await
    }

    /// Discard any cached value and any in-flight load, then resolve fresh.
    pub async fn force_refresh(&self) -> Arc<Vec<ModelCatalogEntry>> {
        self.resolve(true).await
    }

    /// Drop cached state without starting a new resolution.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.slot = Slot::Empty;
        log_debug!("Catalog cache invalidated");
    }

    async fn resolve(&self, force_refresh: bool) -> Arc<Vec<ModelCatalogEntry>> {
        let (shared, generation) = {
            let mut state = self.state.lock().await;
            if force_refresh {
                state.generation += 1;
                state.slot = Slot::Empty;
            }
            match &state.slot {
                Slot::Ready(entries) => return entries.clone(),
                Slot::InFlight(shared) => (shared.clone(), state.generation),
                Slot::Empty => {
                    let shared = Self::start_load(self.loader.clone(), self.timeout);
                    // Each load gets its own generation, so waiters of this
                    // load cannot touch any slot state a later load owns.
                    state.generation += 1;
                    state.slot = Slot::InFlight(shared.clone());
                    (shared, state.generation)
                }
            }
        };

        let (entries, complete) = shared.await;

        let mut state = self.state.lock().await;
        if state.generation == generation {
            if complete && !entries.is_empty() {
                state.slot = Slot::Ready(entries.clone());
            } else if matches!(state.slot, Slot::InFlight(_)) {
                // Empty or failed load: forget it so the next call retries.
                state.slot = Slot::Empty;
            }
        }
        entries
    }

    fn start_load(loader: Arc<dyn CatalogLoader>, timeout: Option<Duration>) -> SharedLoad {
        let future: BoxFuture<'static, (Arc<Vec<ModelCatalogEntry>>, bool)> =
            Box::pin(async move {
                let load = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, loader.load()).await {
                        Ok(load) => load,
                        Err(_) => {
                            log_warn!(
                                timeout_seconds = limit.as_secs(),
                                "Catalog resolution timed out; returning empty result"
                            );
                            CatalogLoad {
                                entries: Vec::new(),
                                complete: false,
                            }
                        }
                    },
                    None => loader.load().await,
                };
                (Arc::new(load.entries), load.complete)
            });
        future.shared()
    }
}

static SHARED_CACHE: OnceCell<CatalogCache> = OnceCell::new();

/// Install the process-wide catalog cache.
///
/// Returns the cache that ended up installed; the first installation wins.
/// Whichever component composes this crate owns the wiring; everything else
/// reaches the cache through [`shared_catalog_cache`].
pub fn install_shared_cache(cache: CatalogCache) -> &'static CatalogCache {
    SHARED_CACHE.get_or_init(|| cache)
}

/// The process-wide catalog cache, if one has been installed.
pub fn shared_catalog_cache() -> Option<&'static CatalogCache> {
    SHARED_CACHE.get()
}
