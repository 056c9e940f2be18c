//! Process-wide snapshot cache.
//!
//! # Lifecycle
//! ```text
//! new()            → empty
//! load(loader)     → loader runs, result published in one atomic swap
//! get()            → None, or the last complete value (shared, not copied)
//! load() again     → replaces the value; a failed load keeps the old one
//! ```
//!
//! # Design Decisions
//! - No TTL; staleness is fixed only by an explicit reload
//! - Readers never block and never see a partially built value
//! - Loads are serialized so an older, slower load cannot overwrite a newer one

pub mod source;

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;

pub use source::{CacheError, ClusterConfigCache, ConfigSource};

/// A value loaded on demand and replaced wholesale.
pub struct SnapshotCache<T> {
    current: ArcSwapOption<T>,
    load_lock: Mutex<()>,
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
        }
    }
}

impl<T> SnapshotCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.current.load_full()
    }

    /// Run `loader` and publish its value. On error the cache is unchanged.
    pub async fn load<F, Fut, E>(&self, loader: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _guard = self.load_lock.lock().await;
        let value = Arc::new(loader().await?);
        self.current.store(Some(Arc::clone(&value)));
        Ok(value)
    }

    /// Current value, loading it first if the cache is still empty.
    ///
    /// Concurrent callers on an empty cache trigger a single load.
    pub async fn get_or_load<F, Fut, E>(&self, loader: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let _guard = self.load_lock.lock().await;
        if let Some(value) = self.get() {
            return Ok(value);
        }
        let value = Arc::new(loader().await?);
        self.current.store(Some(Arc::clone(&value)));
        Ok(value)
    }
}
