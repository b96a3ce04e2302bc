//! Item lifecycle orchestration.
//!
//! Row mutations are committed before the matching filesystem step runs. When
//! the filesystem step fails afterwards the row stays committed and the error
//! is reported as a server fault. Both steps run on a detached task, so a
//! caller that goes away mid-request cannot stop between them.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::instrument;

use crate::db::ItemStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    ItemId, ItemIdGenerator, ItemRecord, ListOrder, NewItem, UpdatePayload, UpdateSelector,
};
use crate::storage::{decode_upload, run_detached, AssetStore, ImageAsset, MAX_VARIANT_DIMENSION};

/// Fresh ids tried before an id collision is reported to the caller.
pub const CREATE_ATTEMPTS: usize = 3;

pub struct ItemService {
    store: Arc<dyn ItemStore>,
    assets: AssetStore,
    ids: Arc<ItemIdGenerator>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, assets: AssetStore) -> Self {
        Self {
            store,
            assets,
            ids: Arc::new(ItemIdGenerator::new()),
        }
    }

    pub fn with_id_generator(mut self, ids: ItemIdGenerator) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Timestamps are kept at the database's microsecond resolution.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    /// Validation and decoding happen in the caller. Once the insert starts,
    /// the insert and the image write run detached to completion.
    #[instrument(skip(self, item))]
    pub async fn create(&self, item: NewItem) -> AppResult<ItemId> {
        item.validate()?;
        // Reject bad uploads before anything is written.
        let (image, kind) = decode_upload(&item.image_base64)?;
        let size = image.len();

        let store = self.store.clone();
        let assets = self.assets.clone();
        let ids = self.ids.clone();
        let record = item.into_record(String::new(), Self::now());
        let id = run_detached(insert_with_image(store, assets, ids, record, image)).await?;

        tracing::info!(
            "Item created: item_id={}, image_type={}, image_size={}",
            id,
            kind.mime_type(),
            size
        );
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, item_id: &str) -> AppResult<ItemRecord> {
        let id = ItemId::parse(item_id)?;
        self.store
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, order: ListOrder) -> AppResult<Vec<ItemRecord>> {
        self.store.list(order).await
    }

    /// Applies a single-field update chosen by `selector`. The image selector
    /// bumps the row's `updated_at` and then replaces the original image.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, item_id: &str, selector: &str, payload: &UpdatePayload) -> AppResult<()> {
        let id = ItemId::parse(item_id)?;

        match selector.parse::<UpdateSelector>()? {
            UpdateSelector::Image => self.update_image(id, payload).await,
            UpdateSelector::Field(field) => {
                let value = field.resolve(payload)?;
                let store = self.store.clone();
                let target = id.clone();
                run_detached(async move {
                    store.update_field(&target, field, &value, Self::now()).await
                })
                .await?;
                tracing::info!("Item updated: item_id={}, field={}", id, field);
                Ok(())
            }
        }
    }

    async fn update_image(&self, id: ItemId, payload: &UpdatePayload) -> AppResult<()> {
        let encoded = payload.image_base64.as_deref().ok_or_else(|| {
            AppError::InvalidInput("payload has no value for image_base64".to_string())
        })?;
        let (image, kind) = decode_upload(encoded)?;
        let size = image.len();

        let store = self.store.clone();
        let assets = self.assets.clone();
        let target = id.clone();
        run_detached(async move {
            store.touch(&target, Self::now()).await?;
            if let Err(e) = assets.replace_original(&target, image).await {
                tracing::error!(
                    "Item row touched but image replacement failed: item_id={}, error={}",
                    target,
                    e
                );
                return Err(e);
            }
            Ok(())
        })
        .await?;

        tracing::info!(
            "Item image replaced: item_id={}, image_type={}, image_size={}",
            id,
            kind.mime_type(),
            size
        );
        Ok(())
    }

    /// Deletes the row, then the asset directory. A missing row short-circuits
    /// before the filesystem is touched.
    #[instrument(skip(self))]
    pub async fn delete(&self, item_id: &str) -> AppResult<()> {
        let id = ItemId::parse(item_id)?;

        let store = self.store.clone();
        let assets = self.assets.clone();
        let target = id.clone();
        let removed = run_detached(async move {
            store.delete(&target).await?;
            assets.remove(&target).await.map_err(|e| {
                tracing::error!(
                    "Item row deleted but asset removal failed: item_id={}, error={}",
                    target,
                    e
                );
                e
            })
        })
        .await?;

        tracing::info!("Item deleted: item_id={}, assets_removed={}", id, removed);
        Ok(())
    }

    /// Returns the original (`0 x 0`) or a cached/rendered variant.
    #[instrument(skip(self))]
    pub async fn image(&self, item_id: &str, height: u32, width: u32) -> AppResult<ImageAsset> {
        let id = ItemId::parse(item_id)?;

        if height > MAX_VARIANT_DIMENSION || width > MAX_VARIANT_DIMENSION {
            return Err(AppError::InvalidInput(format!(
                "requested {}x{} exceeds {}",
                height, width, MAX_VARIANT_DIMENSION
            )));
        }

        self.assets.read_variant(&id, height, width).await
    }
}

/// Inserts `record` under a fresh id, retrying on collisions, then writes the
/// original image for it.
async fn insert_with_image(
    store: Arc<dyn ItemStore>,
    assets: AssetStore,
    ids: Arc<ItemIdGenerator>,
    mut record: ItemRecord,
    image: Vec<u8>,
) -> AppResult<ItemId> {
    let mut attempt = 1;
    let id = loop {
        let id = ids.generate();
        record.item_id = id.to_string();
        match store.insert(&record).await {
            Ok(()) => break id,
            Err(AppError::AlreadyExists(_)) if attempt < CREATE_ATTEMPTS => {
                tracing::warn!("Item id collision, retrying: item_id={}, attempt={}", id, attempt);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    if let Err(e) = assets.write_original(&id, image).await {
        tracing::error!(
            "Item row committed but original image write failed: item_id={}, error={}",
            id,
            e
        );
        return Err(e);
    }
    Ok(id)
}
