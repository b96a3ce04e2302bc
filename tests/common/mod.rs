#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

use inventory_catalog::config::AssetLockMode;
use inventory_catalog::db::ItemStore;
use inventory_catalog::error::{AppError, AppResult};
use inventory_catalog::models::{
    FieldValue, ItemField, ItemId, ItemRecord, ListOrder, NewItem, OrderColumn, SortDirection,
};
use inventory_catalog::services::ItemService;
use inventory_catalog::storage::AssetStore;

/// Row store kept in a map. Mirrors the SQL semantics the service relies on:
/// duplicate inserts fail, missing rows are not-found, `updated_at` always
/// advances.
#[derive(Default)]
pub struct MemoryItemStore {
    rows: Mutex<HashMap<String, ItemRecord>>,
    inserts: AtomicUsize,
    /// Ids handed to the next inserts are rejected as duplicates this many times.
    forced_collisions: AtomicUsize,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forced_collisions(count: usize) -> Self {
        let store = Self::default();
        store.forced_collisions.store(count, Ordering::SeqCst);
        store
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn row(&self, id: &str) -> Option<ItemRecord> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    fn advance(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(updated_at + Duration::microseconds(1))
    }
}

#[tonic::async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, item: &ItemRecord) -> AppResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let forced = self
            .forced_collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let mut rows = self.rows.lock().unwrap();
        if forced || rows.contains_key(&item.item_id) {
            return Err(AppError::AlreadyExists(format!("item {}", item.item_id)));
        }
        rows.insert(item.item_id.clone(), item.clone());
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> AppResult<Option<ItemRecord>> {
        Ok(self.row(id.as_str()))
    }

    async fn list(&self, order: ListOrder) -> AppResult<Vec<ItemRecord>> {
        let mut items: Vec<ItemRecord> = self.rows.lock().unwrap().values().cloned().collect();
        items.sort_by(|a, b| {
            let (ka, kb) = match order.order_by {
                OrderColumn::CreatedAt => (a.created_at, b.created_at),
                OrderColumn::UpdatedAt => (a.updated_at, b.updated_at),
            };
            let primary = match order.direction {
                SortDirection::Asc => ka.cmp(&kb),
                SortDirection::Desc => kb.cmp(&ka),
            };
            primary.then_with(|| a.item_id.cmp(&b.item_id))
        });
        Ok(items)
    }

    async fn update_field(
        &self,
        id: &ItemId,
        field: ItemField,
        value: &FieldValue,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("item {}", id)))?;
        match (field, value) {
            (ItemField::ItemCount, FieldValue::UnsignedInteger(v)) => row.item_count = *v,
            (ItemField::ItemPrice, FieldValue::Float(v)) => row.item_price = *v,
            (ItemField::ItemBrand, FieldValue::Text(v)) => row.item_brand = v.clone(),
            (ItemField::ItemName, FieldValue::Text(v)) => row.item_name = v.clone(),
            (ItemField::ItemDesc, FieldValue::Text(v)) => row.item_desc = v.clone(),
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "value kind does not match {}",
                    field
                )))
            }
        }
        row.updated_at = Self::advance(row.updated_at, now);
        Ok(())
    }

    async fn touch(&self, id: &ItemId, now: DateTime<Utc>) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("item {}", id)))?;
        row.updated_at = Self::advance(row.updated_at, now);
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("item {}", id)))
    }
}

/// A service over a memory store and a throwaway asset root. Keep the
/// `TempDir` alive for as long as the service is used.
pub struct Harness {
    pub service: Arc<ItemService>,
    pub store: Arc<MemoryItemStore>,
    pub root: TempDir,
}

pub async fn harness() -> Harness {
    harness_with(MemoryItemStore::new(), AssetLockMode::PerItem).await
}

pub async fn harness_with(store: MemoryItemStore, mode: AssetLockMode) -> Harness {
    let root = tempfile::tempdir().unwrap();
    let store = Arc::new(store);
    let assets = AssetStore::new(root.path(), mode).await.unwrap();
    let service = Arc::new(ItemService::new(store.clone(), assets));
    Harness {
        service,
        store,
        root,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([30, 90, 160]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .unwrap();
    buf
}

/// Smallest valid GIF: 1x1, one-colour palette.
pub const GIF_1X1: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xff, 0xff,
    0xff, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn new_item(image: &[u8]) -> NewItem {
    NewItem {
        item_count: 3,
        item_price: 9.5,
        item_brand: "Acme".to_string(),
        item_name: "Widget".to_string(),
        item_desc: "A small widget".to_string(),
        image_base64: encode(image),
    }
}

pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(data).unwrap();
    (image.width(), image.height())
}
