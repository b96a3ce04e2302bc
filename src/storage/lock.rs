//! Gate serializing mutations of item asset directories.
//!
//! Writers (create, replace, delete of a directory) take the item's lock
//! exclusively. Readers take it shared, so serving an original or building a
//! thumbnail never observes a directory that is half replaced.
//!
//! In [`AssetLockMode::PerItem`] each item id gets its own lock from a
//! registry that only keeps weak references, so entries disappear once no
//! guard refers to them. [`AssetLockMode::Global`] funnels every item through
//! one lock, which caps write throughput at one directory mutation at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::config::AssetLockMode;
use crate::models::ItemId;

pub type ExclusiveGuard = OwnedRwLockWriteGuard<()>;
pub type SharedGuard = OwnedRwLockReadGuard<()>;

pub struct AssetLocks {
    mode: AssetLockMode,
    global: Arc<RwLock<()>>,
    registry: Mutex<HashMap<String, Weak<RwLock<()>>>>,
}

impl AssetLocks {
    pub fn new(mode: AssetLockMode) -> Self {
        Self {
            mode,
            global: Arc::new(RwLock::new(())),
            registry: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> AssetLockMode {
        self.mode
    }

    fn lock_for(&self, id: &ItemId) -> Arc<RwLock<()>> {
        match self.mode {
            AssetLockMode::Global => self.global.clone(),
            AssetLockMode::PerItem => {
                let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(lock) = registry.get(id.as_str()).and_then(Weak::upgrade) {
                    return lock;
                }
                registry.retain(|_, weak| weak.strong_count() > 0);
                let lock = Arc::new(RwLock::new(()));
                registry.insert(id.to_string(), Arc::downgrade(&lock));
                lock
            }
        }
    }

    /// Waits for exclusive access to the item's directory. Released on drop.
    pub async fn exclusive(&self, id: &ItemId) -> ExclusiveGuard {
        self.lock_for(id).write_owned().await
    }

    /// Waits for shared (read) access to the item's directory.
    pub async fn shared(&self, id: &ItemId) -> SharedGuard {
        self.lock_for(id).read_owned().await
    }

    /// Number of live per-item locks after pruning released ones.
    pub fn tracked(&self) -> usize {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.retain(|_, weak| weak.strong_count() > 0);
        registry.len()
    }
}
