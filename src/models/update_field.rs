//! Selector-driven single-field updates.
//!
//! The set of mutable columns is closed. Each selector maps to exactly one
//! column, one semantic type and one member of [`UpdatePayload`]; the column
//! name produced here is the only user-influenced text that is ever spliced
//! into an UPDATE statement.

use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::item::{validate_count, validate_price, validate_text, UpdatePayload};

/// Selector value that diverts an update to the image path.
pub const IMAGE_SELECTOR: &str = "image_base64";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    UnsignedInteger,
    Float,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    UnsignedInteger(u64),
    Float(f64),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::UnsignedInteger(_) => FieldKind::UnsignedInteger,
            FieldValue::Float(_) => FieldKind::Float,
        }
    }
}

/// The updatable columns of an item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    ItemCount,
    ItemPrice,
    ItemBrand,
    ItemName,
    ItemDesc,
}

impl ItemField {
    pub const ALL: [ItemField; 5] = [
        ItemField::ItemCount,
        ItemField::ItemPrice,
        ItemField::ItemBrand,
        ItemField::ItemName,
        ItemField::ItemDesc,
    ];

    /// Column name; doubles as the selector string.
    pub fn column(self) -> &'static str {
        match self {
            ItemField::ItemCount => "item_count",
            ItemField::ItemPrice => "item_price",
            ItemField::ItemBrand => "item_brand",
            ItemField::ItemName => "item_name",
            ItemField::ItemDesc => "item_desc",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            ItemField::ItemCount => FieldKind::UnsignedInteger,
            ItemField::ItemPrice => FieldKind::Float,
            ItemField::ItemBrand | ItemField::ItemName | ItemField::ItemDesc => FieldKind::Text,
        }
    }

    /// Pulls this field's member out of the payload, if present.
    pub fn extract(self, payload: &UpdatePayload) -> Option<FieldValue> {
        match self {
            ItemField::ItemCount => payload.item_count.map(FieldValue::UnsignedInteger),
            ItemField::ItemPrice => payload.item_price.map(FieldValue::Float),
            ItemField::ItemBrand => payload.item_brand.clone().map(FieldValue::Text),
            ItemField::ItemName => payload.item_name.clone().map(FieldValue::Text),
            ItemField::ItemDesc => payload.item_desc.clone().map(FieldValue::Text),
        }
    }

    /// Extracts and validates the value to write.
    pub fn resolve(self, payload: &UpdatePayload) -> AppResult<FieldValue> {
        let value = self.extract(payload).ok_or_else(|| {
            AppError::InvalidInput(format!("payload has no value for {}", self.column()))
        })?;

        match &value {
            FieldValue::UnsignedInteger(count) => validate_count(*count)?,
            FieldValue::Float(price) => validate_price(*price)?,
            FieldValue::Text(text) => validate_text(self.column(), text)?,
        }

        Ok(value)
    }
}

impl FromStr for ItemField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown update field: {:?}", s)))
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Parsed form of the client-supplied `update_field` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSelector {
    Field(ItemField),
    Image,
}

impl FromStr for UpdateSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == IMAGE_SELECTOR {
            return Ok(UpdateSelector::Image);
        }
        s.parse().map(UpdateSelector::Field)
    }
}

/// Resolves `selector` against `payload` into the value to write and its type.
///
/// The image selector is not a column and is rejected here; callers divert it
/// before resolution.
pub fn resolve_field(selector: &str, payload: &UpdatePayload) -> AppResult<(FieldValue, FieldKind)> {
    let field: ItemField = selector.parse()?;
    let value = field.resolve(payload)?;
    Ok((value, field.kind()))
}
