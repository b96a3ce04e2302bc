use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const ITEM_ID_LEN: usize = 8;

pub const ITEM_ID_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Item identifier. Always exactly eight ASCII alphanumerics, which makes it
/// safe to use verbatim as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.len() != ITEM_ID_LEN || !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidInput(format!("invalid item id: {:?}", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random id source, seeded from the clock when constructed.
///
/// Uniqueness is not checked here; the primary key on the item table rejects
/// collisions.
pub struct ItemIdGenerator {
    rng: Mutex<StdRng>,
}

impl ItemIdGenerator {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self) -> ItemId {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let id: String = (0..ITEM_ID_LEN)
            .map(|_| ITEM_ID_ALPHABET[rng.gen_range(0..ITEM_ID_ALPHABET.len())] as char)
            .collect();
        ItemId(id)
    }
}

impl Default for ItemIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
