use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

/// Identity of an encoded file: a changed file gets a new key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl ImageKey {
    /// Key for the file's current state; `None` if it cannot be stat'ed
    pub fn for_file(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Thread-safe LRU cache for encoded image payloads
///
/// Avoids re-reading and re-encoding unchanged avatar files on every render.
pub struct ImageCache {
    cache: Mutex<LruCache<ImageKey, String>>,
}

impl ImageCache {
    /// Create a new cache holding up to `capacity` payloads (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<ImageKey, String>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &ImageKey) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: ImageKey, payload: String) {
        self.lock().put(key, payload);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
