//! Explicitly owned registry of open stores.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{MemoryStore, SpatialStore, StoreError, StoreResult};

/// Scheme for stores that exist only through [`StorePool::register`].
const MEMORY_SCHEME: &str = "memory://";

/// Scheme prefix accepted in front of catalog paths.
const FILE_SCHEME: &str = "file://";

/// Stores keyed by URL, opened once and shared by every data source that
/// asks for the same URL.
///
/// Create one pool at start-up and pass it to each data source constructor.
#[derive(Default)]
pub struct StorePool {
    stores: Mutex<HashMap<String, Arc<dyn SpatialStore>>>,
}

impl StorePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store under `url`, replacing any previous one.
    pub fn register(&self, url: impl Into<String>, store: Arc<dyn SpatialStore>) {
        self.stores.lock().insert(url.into(), store);
    }

    /// Returns the store for `url`, opening it on first use.
    ///
    /// `memory://` URLs must have been registered. Anything else is taken
    /// as a path to a JSON catalog, with an optional `file://` prefix.
    pub fn open(&self, url: &str) -> StoreResult<Arc<dyn SpatialStore>> {
        let mut stores = self.stores.lock();
        if let Some(store) = stores.get(url) {
            debug!(url, "Reusing open store");
            return Ok(Arc::clone(store));
        }
        if url.starts_with(MEMORY_SCHEME) {
            return Err(StoreError::Unavailable(format!(
                "no store registered at {}",
                url
            )));
        }
        let path = url.strip_prefix(FILE_SCHEME).unwrap_or(url);
        let store: Arc<dyn SpatialStore> = Arc::new(MemoryStore::load(Path::new(path))?);
        stores.insert(url.to_string(), Arc::clone(&store));
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.stores.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.lock().is_empty()
    }
}

impl std::fmt::Debug for StorePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stores = self.stores.lock();
        let mut urls: Vec<&String> = stores.keys().collect();
        urls.sort();
        f.debug_struct("StorePool").field("urls", &urls).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_register_and_open() {
        let pool = StorePool::new();
        pool.register("memory://cities", Arc::new(MemoryStore::new("cities")));
        let store = pool.open("memory://cities").unwrap();
        assert_eq!(store.describe(), "memory:cities");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_unregistered_memory_url() {
        let pool = StorePool::new();
        assert!(matches!(
            pool.open("memory://nothing"),
            Err(StoreError::Unavailable(_))
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_file_store_is_opened_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"layers":{"city":[]}}"#).unwrap();
        let url = format!("file://{}", file.path().display());

        let pool = StorePool::new();
        let a = pool.open(&url).unwrap();
        let b = pool.open(&url).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }
}
