//! Order storage
//!
//! Each owner has an order log, newest order first.

use std::{
    fmt::Write,
    fs, io,
    path::{Path, PathBuf},
};

use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

use crate::orders::{Order, OrderId, OrderOwner, OrderStatus};

const FILE_PREFIX: &str = "orders_";
const FILE_EXTENSION: &str = "json";
const GUEST_KEY: &str = "guest";
const USER_KEY_PREFIX: &str = "user-";

/// Errors raised by order storage adapters.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// IO error reading or writing an order log
    #[error("order storage IO error: {0}")]
    Io(#[from] io::Error),

    /// An order log is not valid JSON
    #[error("order storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Port for order persistence.
#[automock]
pub trait OrderRepository {
    /// Record a new order at the front of its owner's log.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderStoreError`] if the log cannot be read or written.
    fn save(&mut self, order: &Order) -> Result<(), OrderStoreError>;

    /// One owner's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderStoreError`] if the log cannot be read.
    fn orders_for(&self, owner: &OrderOwner) -> Result<Vec<Order>, OrderStoreError>;

    /// A single order from one owner's log.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderStoreError`] if the log cannot be read.
    fn order(&self, owner: &OrderOwner, id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Every owner's orders, newest first by creation time.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderStoreError`] if the logs cannot be listed.
    fn all_orders(&self) -> Result<Vec<Order>, OrderStoreError>;

    /// Change the status of an order in whichever log holds it.
    ///
    /// Returns whether an order was changed.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderStoreError`] if a log cannot be read or written.
    fn update_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, OrderStoreError>;
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Order storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    logs: FxHashMap<OrderOwner, Vec<Order>>,
}

impl MemoryOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of orders across all owners
    pub fn len(&self) -> usize {
        self.logs.values().map(Vec::len).sum()
    }

    /// Whether no orders have been saved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for MemoryOrderStore {
    fn save(&mut self, order: &Order) -> Result<(), OrderStoreError> {
        self.logs
            .entry(order.owner())
            .or_default()
            .insert(0, order.clone());

        Ok(())
    }

    fn orders_for(&self, owner: &OrderOwner) -> Result<Vec<Order>, OrderStoreError> {
        Ok(self.logs.get(owner).cloned().unwrap_or_default())
    }

    fn order(&self, owner: &OrderOwner, id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self
            .logs
            .get(owner)
            .and_then(|log| log.iter().find(|order| &order.id == id))
            .cloned())
    }

    fn all_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        let mut orders: Vec<Order> = self.logs.values().flatten().cloned().collect();

        newest_first(&mut orders);

        Ok(orders)
    }

    fn update_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, OrderStoreError> {
        let order = self
            .logs
            .values_mut()
            .flat_map(|log| log.iter_mut())
            .find(|order| &order.id == id);

        match order {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Order storage with one JSON file per owner inside a data directory.
///
/// Guests share `orders_guest.json`; a signed-in user gets
/// `orders_user-{escaped id}.json`.
/// Files are overwritten whole with no locking, so the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonOrderStore {
    dir: PathBuf,
}

impl JsonOrderStore {
    /// Store order logs in `dir`, created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of an owner's log.
    ///
    /// User ids are escaped so distinct users never share a file: ASCII
    /// letters, digits and `-` are kept, every other byte becomes `_XX` hex.
    pub fn path_for(&self, owner: &OrderOwner) -> PathBuf {
        let key = match owner {
            OrderOwner::Guest => GUEST_KEY.to_string(),
            OrderOwner::User(user) => {
                let mut key = String::from(USER_KEY_PREFIX);

                for byte in user.bytes() {
                    if byte.is_ascii_alphanumeric() || byte == b'-' {
                        key.push(char::from(byte));
                    } else {
                        _ = write!(key, "_{byte:02X}");
                    }
                }

                key
            }
        };

        self.dir.join(format!("{FILE_PREFIX}{key}.{FILE_EXTENSION}"))
    }

    fn read_log(path: &Path) -> Result<Vec<Order>, OrderStoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    fn write_log(&self, path: &Path, orders: &[Order]) -> Result<(), OrderStoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, serde_json::to_string_pretty(orders)?)?;

        Ok(())
    }

    /// Every order log in the directory, sorted by file name.
    fn log_paths(&self) -> Result<Vec<PathBuf>, OrderStoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut paths = Vec::new();

        for entry in entries {
            let path = entry?.path();

            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(FILE_PREFIX))
                && path.extension().is_some_and(|ext| ext == FILE_EXTENSION);

            if is_log {
                paths.push(path);
            }
        }

        paths.sort();

        Ok(paths)
    }
}

impl OrderRepository for JsonOrderStore {
    fn save(&mut self, order: &Order) -> Result<(), OrderStoreError> {
        let path = self.path_for(&order.owner());
        let mut log = Self::read_log(&path)?;

        log.insert(0, order.clone());

        self.write_log(&path, &log)
    }

    fn orders_for(&self, owner: &OrderOwner) -> Result<Vec<Order>, OrderStoreError> {
        Self::read_log(&self.path_for(owner))
    }

    fn order(&self, owner: &OrderOwner, id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self
            .orders_for(owner)?
            .into_iter()
            .find(|order| &order.id == id))
    }

    fn all_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        let mut orders = Vec::new();

        for path in self.log_paths()? {
            match Self::read_log(&path) {
                Ok(log) => orders.extend(log),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable order log"),
            }
        }

        newest_first(&mut orders);

        Ok(orders)
    }

    fn update_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, OrderStoreError> {
        for path in self.log_paths()? {
            let mut log = match Self::read_log(&path) {
                Ok(log) => log,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable order log");
                    continue;
                }
            };

            let Some(order) = log.iter_mut().find(|order| &order.id == id) else {
                continue;
            };

            order.status = status;
            self.write_log(&path, &log)?;

            return Ok(true);
        }

        Ok(false)
    }
}
