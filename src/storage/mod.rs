// Filesystem asset store: one directory per item holding its original image
// and cached variants.

pub mod format;
pub mod lock;
pub mod variant;

pub use format::{decode_upload, ImageKind};
pub use lock::AssetLocks;
pub use variant::{VariantCache, MAX_VARIANT_DIMENSION, ORIGINAL_FILE};

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{instrument, Instrument};

use crate::config::AssetLockMode;
use crate::error::{AppError, AppResult};
use crate::models::ItemId;

/// Image bytes resolved for a read, with the format detected from content.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub data: Vec<u8>,
    pub kind: ImageKind,
}

/// Owns the asset root, the directory gate and the variant cache. Clones
/// share the gate and the cache.
#[derive(Clone)]
pub struct AssetStore {
    root: PathBuf,
    locks: Arc<AssetLocks>,
    variants: Arc<VariantCache>,
}

impl AssetStore {
    pub async fn new(root: impl AsRef<Path>, mode: AssetLockMode) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            locks: Arc::new(AssetLocks::new(mode)),
            variants: Arc::new(VariantCache::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locks(&self) -> &AssetLocks {
        &self.locks
    }

    pub fn variants(&self) -> &VariantCache {
        &self.variants
    }

    pub fn item_dir(&self, id: &ItemId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub async fn exists(&self, id: &ItemId) -> AppResult<bool> {
        Ok(fs::try_exists(self.item_dir(id)).await?)
    }

    /// Writes the original for a new item. A directory left behind under the
    /// same id is wiped first so none of its variants survive.
    #[instrument(skip(self, data), fields(item_id = %id, size = data.len()))]
    pub async fn write_original(&self, id: &ItemId, data: Vec<u8>) -> AppResult<()> {
        let dir = self.item_dir(id);
        let guard = self.locks.exclusive(id).await;
        run_detached(async move {
            let _guard = guard;
            if swap_original(&dir, &data).await? {
                tracing::warn!("Stale asset directory replaced: {}", dir.display());
            }
            Ok(())
        })
        .await
    }

    /// Replaces the original wholesale. The directory is wiped first, which
    /// drops every cached variant of the previous image.
    #[instrument(skip(self, data), fields(item_id = %id, size = data.len()))]
    pub async fn replace_original(&self, id: &ItemId, data: Vec<u8>) -> AppResult<()> {
        let dir = self.item_dir(id);
        let guard = self.locks.exclusive(id).await;
        run_detached(async move {
            let _guard = guard;
            swap_original(&dir, &data).await.map(|_| ())
        })
        .await
    }

    /// Removes the item's directory. Returns whether anything was removed.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove(&self, id: &ItemId) -> AppResult<bool> {
        let dir = self.item_dir(id);
        let guard = self.locks.exclusive(id).await;
        run_detached(async move {
            let _guard = guard;
            remove_dir_if_present(&dir).await
        })
        .await
    }

    /// Resolves and reads the requested variant under a shared guard.
    /// `0 x 0` yields the original bytes unchanged.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn read_variant(&self, id: &ItemId, height: u32, width: u32) -> AppResult<ImageAsset> {
        let _guard = self.locks.shared(id).await;

        let dir = self.item_dir(id);
        if !fs::try_exists(&dir).await? {
            return Err(AppError::NotFound(format!("asset directory for {}", id)));
        }

        let path = self.variants.get_or_create_variant(&dir, height, width).await?;
        let data = fs::read(&path).await?;
        let kind = ImageKind::sniff(&data)?;

        Ok(ImageAsset { path, data, kind })
    }
}

/// Runs `task` on its own tokio task and waits for it. Dropping the caller
/// does not stop the task, so a started mutation always runs to its end.
pub(crate) async fn run_detached<F, T>(task: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task.in_current_span())
        .await
        .map_err(|e| AppError::Internal(format!("detached task failed: {}", e)))?
}

/// Wipes `dir` and writes a fresh original into it. Returns whether a
/// previous directory was removed.
async fn swap_original(dir: &Path, data: &[u8]) -> AppResult<bool> {
    let replaced = remove_dir_if_present(dir).await?;
    fs::create_dir_all(dir).await?;
    variant::write_atomic(&dir.join(ORIGINAL_FILE), data).await?;
    Ok(replaced)
}

async fn remove_dir_if_present(dir: &Path) -> AppResult<bool> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::Storage(format!(
            "failed to remove {}: {}",
            dir.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-not-really-an-image";

    fn id(raw: &str) -> ItemId {
        ItemId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read_original() {
        let root = tempfile::tempdir().unwrap();
        let store = AssetStore::new(root.path(), AssetLockMode::PerItem).await.unwrap();
        let item = id("aB3dE6gH");

        store.write_original(&item, PNG_BYTES.to_vec()).await.unwrap();
        assert!(store.exists(&item).await.unwrap());

        let asset = store.read_variant(&item, 0, 0).await.unwrap();
        assert_eq!(asset.data, PNG_BYTES);
        assert_eq!(asset.kind, ImageKind::Png);
        assert_eq!(asset.path, root.path().join("aB3dE6gH").join(ORIGINAL_FILE));
    }

    #[tokio::test]
    async fn test_replace_original_wipes_variants() {
        let root = tempfile::tempdir().unwrap();
        let store = AssetStore::new(root.path(), AssetLockMode::PerItem).await.unwrap();
        let item = id("aB3dE6gH");

        store.write_original(&item, PNG_BYTES.to_vec()).await.unwrap();
        let stale = store.item_dir(&item).join("thumb_10x10");
        tokio::fs::write(&stale, b"stale").await.unwrap();

        store.replace_original(&item, PNG_BYTES.to_vec()).await.unwrap();
        assert!(!tokio::fs::try_exists(&stale).await.unwrap());
        assert!(tokio::fs::try_exists(store.item_dir(&item).join(ORIGINAL_FILE))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let root = tempfile::tempdir().unwrap();
        let store = AssetStore::new(root.path(), AssetLockMode::Global).await.unwrap();
        let item = id("aB3dE6gH");

        assert!(!store.remove(&item).await.unwrap());
        store.write_original(&item, PNG_BYTES.to_vec()).await.unwrap();
        assert!(store.remove(&item).await.unwrap());
        assert!(!store.exists(&item).await.unwrap());
        assert!(matches!(
            store.read_variant(&item, 0, 0).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_original_clears_leftover_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = AssetStore::new(root.path(), AssetLockMode::PerItem).await.unwrap();
        let item = id("aB3dE6gH");

        let leftover = store.item_dir(&item);
        tokio::fs::create_dir_all(&leftover).await.unwrap();
        tokio::fs::write(leftover.join("thumb_10x10"), b"old variant").await.unwrap();

        store.write_original(&item, PNG_BYTES.to_vec()).await.unwrap();
        assert!(!tokio::fs::try_exists(leftover.join("thumb_10x10")).await.unwrap());
        assert_eq!(store.read_variant(&item, 0, 0).await.unwrap().data, PNG_BYTES);
    }

    #[tokio::test]
    async fn test_dropped_replace_still_completes() {
        let root = tempfile::tempdir().unwrap();
        let store = AssetStore::new(root.path(), AssetLockMode::PerItem).await.unwrap();
        let item = id("aB3dE6gH");
        store.write_original(&item, b"\x89PNG\r\n\x1a\nfirst".to_vec()).await.unwrap();

        let replacing = {
            let store = store.clone();
            let item = item.clone();
            tokio::spawn(async move { store.replace_original(&item, PNG_BYTES.to_vec()).await })
        };
        // Cancel the caller as soon as the directory holds the exclusive guard.
        loop {
            if replacing.is_finished() {
                break;
            }
            if tokio::time::timeout(std::time::Duration::ZERO, store.locks().shared(&item))
                .await
                .is_err()
            {
                replacing.abort();
                break;
            }
            tokio::task::yield_now().await;
        }

        let asset = store.read_variant(&item, 0, 0).await.unwrap();
        assert_eq!(asset.data, PNG_BYTES);
    }
}
