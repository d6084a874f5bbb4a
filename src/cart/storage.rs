//! Cart storage
//!
//! Durable storage for the cart between sessions. Persistence is best effort:
//! the cart service logs and ignores every error raised here.

use std::{fs, io, path::PathBuf};

use rust_decimal::Decimal;
use rusty_money::MoneyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartLine,
    money::{find_currency, from_decimal, to_decimal},
    products::ProductId,
};

/// Errors raised by cart storage adapters.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// IO error reading or writing the cart file
    #[error("cart storage IO error: {0}")]
    Io(#[from] io::Error),

    /// The stored cart is not valid JSON
    #[error("cart storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored line could not be turned back into money
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The backing store refused the write, e.g. because it is full
    #[error("cart storage unavailable: {0}")]
    Unavailable(String),
}

/// Serialized form of a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCartLine {
    /// Product identifier
    pub id: ProductId,

    /// Product name snapshot
    pub name: String,

    /// Unit price in major units
    pub price: Decimal,

    /// ISO currency code of the price
    pub currency: String,

    /// Category snapshot
    pub category: String,

    /// Image snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Quantity
    pub quantity: u32,
}

impl From<&CartLine<'_>> for StoredCartLine {
    fn from(line: &CartLine<'_>) -> Self {
        Self {
            id: line.product().clone(),
            name: line.name().to_string(),
            price: to_decimal(line.price()),
            currency: line.price().currency().iso_alpha_code.to_string(),
            category: line.category().to_string(),
            image: line.image().map(str::to_string),
            quantity: line.quantity(),
        }
    }
}

impl TryFrom<StoredCartLine> for CartLine<'static> {
    type Error = CartStoreError;

    fn try_from(stored: StoredCartLine) -> Result<Self, Self::Error> {
        let currency = find_currency(&stored.currency)?;
        let price = from_decimal(stored.price, currency)?;

        Ok(CartLine::new(
            stored.id,
            stored.name,
            price,
            stored.category,
            stored.image,
            stored.quantity,
        ))
    }
}

/// Port for durable cart storage.
pub trait CartStore {
    /// Read the persisted lines. An empty store yields no lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the store cannot be read or decoded.
    fn load(&self) -> Result<Vec<StoredCartLine>, CartStoreError>;

    /// Replace the persisted lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the store cannot be written.
    fn save(&mut self, lines: &[StoredCartLine]) -> Result<(), CartStoreError>;
}

/// Cart storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    lines: Vec<StoredCartLine>,
}

impl MemoryCartStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a cart
    pub fn with_lines(lines: Vec<StoredCartLine>) -> Self {
        Self { lines }
    }

    /// The lines most recently saved
    pub fn lines(&self) -> &[StoredCartLine] {
        &self.lines
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Result<Vec<StoredCartLine>, CartStoreError> {
        Ok(self.lines.clone())
    }

    fn save(&mut self, lines: &[StoredCartLine]) -> Result<(), CartStoreError> {
        self.lines = lines.to_vec();
        Ok(())
    }
}

/// Cart storage backed by a single JSON file.
///
/// Every save overwrites the whole file; there is no locking, so the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileCartStore {
    path: PathBuf,
}

impl JsonFileCartStore {
    /// Store the cart at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStore for JsonFileCartStore {
    fn load(&self) -> Result<Vec<StoredCartLine>, CartStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&mut self, lines: &[StoredCartLine]) -> Result<(), CartStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(lines)?)?;

        Ok(())
    }
}
