//! redb-based cart snapshot storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `carts` | `user_id` | `Cart` (JSON) | 每个用户一份购物车快照 |
//!
//! Every mutation rewrites the user's snapshot in its own write transaction.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::order::Cart;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = user_id, value = JSON-serialized Cart
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Cart snapshots backed by redb
#[derive(Clone)]
pub struct CartStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open or create the store at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            // 目录不存在时 redb 会报 IO 错误
            let _ = std::fs::create_dir_all(parent);
        }
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CARTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Read a user's snapshot
    pub fn load(&self, user_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Replace a user's snapshot
    pub fn save(&self, user_id: &str, cart: &Cart) -> StorageResult<()> {
        let bytes = serde_json::to_vec(cart)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARTS_TABLE)?;
            table.insert(user_id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn remove(&self, user_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARTS_TABLE)?;
            table.remove(user_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All snapshots; entries that no longer decode are skipped
    pub fn load_all(&self) -> StorageResult<Vec<(String, Cart)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;

        let mut carts = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let user_id = key.value().to_string();
            match serde_json::from_slice::<Cart>(value.value()) {
                Ok(cart) => carts.push((user_id, cart)),
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Discarding unreadable cart snapshot");
                }
            }
        }
        Ok(carts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::MealSource;
    use shared::order::CartItem;

    fn cart() -> Cart {
        let mut cart = Cart::default();
        cart.add(CartItem {
            meal_id: "m1".into(),
            quantity: 2,
            price: Decimal::new(899, 2),
            restaurant_id: Some("r1".into()),
            source: MealSource::Catalog,
        });
        cart
    }

    #[test]
    fn test_save_load_remove() {
        let store = CartStore::open_in_memory().unwrap();
        assert!(store.load("u1").unwrap().is_none());

        store.save("u1", &cart()).unwrap();
        assert_eq!(store.load("u1").unwrap(), Some(cart()));
        assert_eq!(store.load_all().unwrap().len(), 1);

        store.remove("u1").unwrap();
        assert!(store.load("u1").unwrap().is_none());
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carts").join("cart.redb");

        {
            let store = CartStore::open(&path).unwrap();
            store.save("u1", &cart()).unwrap();
        }

        let store = CartStore::open(&path).unwrap();
        let restored = store.load("u1").unwrap().unwrap();
        assert_eq!(restored, cart());
        assert_eq!(restored.total_price, Decimal::new(1798, 2));
    }
}
