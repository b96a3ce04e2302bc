use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// One row of the inventory table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: String,
    #[sqlx(try_from = "i64")]
    pub item_count: u64,
    pub item_price: f64,
    pub item_brand: String,
    pub item_name: String,
    pub item_desc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload: the five data fields plus the base64 original image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub item_count: u64,
    pub item_price: f64,
    pub item_brand: String,
    pub item_name: String,
    pub item_desc: String,
    pub image_base64: String,
}

impl NewItem {
    pub fn validate(&self) -> AppResult<()> {
        validate_count(self.item_count)?;
        validate_price(self.item_price)?;
        validate_text("item_brand", &self.item_brand)?;
        validate_text("item_name", &self.item_name)?;
        validate_text("item_desc", &self.item_desc)?;
        Ok(())
    }

    /// Builds the row written on creation. Both timestamps share `now`.
    pub fn into_record(self, item_id: String, now: DateTime<Utc>) -> ItemRecord {
        ItemRecord {
            item_id,
            item_count: self.item_count,
            item_price: self.item_price,
            item_brand: self.item_brand,
            item_name: self.item_name,
            item_desc: self.item_desc,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update payload. Which member is read is decided by the selector
/// that travels next to it, never by which member happens to be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub item_count: Option<u64>,
    pub item_price: Option<f64>,
    pub item_brand: Option<String>,
    pub item_name: Option<String>,
    pub item_desc: Option<String>,
    pub image_base64: Option<String>,
}

/// Counts are stored as BIGINT.
pub fn validate_count(count: u64) -> AppResult<()> {
    if i64::try_from(count).is_err() {
        return Err(AppError::InvalidInput(format!(
            "item_count out of range: {}",
            count
        )));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidInput(format!("invalid item_price: {}", price)));
    }
    Ok(())
}

/// Text fields are non-empty printable ASCII.
pub fn validate_text(field: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    if !value.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(AppError::InvalidInput(format!(
            "{} must be printable ASCII",
            field
        )));
    }
    Ok(())
}
