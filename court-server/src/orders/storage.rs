//! redb-based storage layer for the order core
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `sub_orders` | `order_id` | `SubOrder` | Sub-order records |
//! | `payments` | `order_id` | `Payment` | One payment per sub-order |
//! | `vendors` | `vendor_id` | `Vendor` | Reference data (read-only for the core) |
//! | `carts` | `user_id` | `Cart` | Carts, cleared by checkout |
//! | `vendor_active` | `(vendor_id, order_id)` | `()` | Non-terminal sub-orders per vendor |
//! | `parent_orders` | `(parent_order_id, order_id)` | `()` | Sibling lookup |
//! | `user_parents` | `(user_id, parent_order_id)` | `created_at` | Customer order history |
//!
//! Values are JSON-serialized. Every mutation of the order core runs inside a
//! single write transaction; redb admits one writer at a time, so a
//! read-modify-write inside that transaction is exclusive for the rows it
//! touches. Dropping a `WriteTransaction` without committing aborts it.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadTransaction, TableDefinition, WriteTransaction,
};
use shared::models::{Cart, Vendor};
use shared::order::{Payment, SubOrder};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Sub-orders: key = order_id, value = JSON-serialized SubOrder
const SUB_ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sub_orders");

/// Payments: key = order_id, value = JSON-serialized Payment
const PAYMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("payments");

/// Vendors: key = vendor_id, value = JSON-serialized Vendor
const VENDORS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("vendors");

/// Carts: key = user_id, value = JSON-serialized Cart
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Active sub-orders per vendor: key = (vendor_id, order_id)
const VENDOR_ACTIVE_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("vendor_active");

/// Siblings: key = (parent_order_id, order_id)
const PARENT_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("parent_orders");

/// Customer history: key = (user_id, parent_order_id), value = created_at millis
const USER_PARENTS_TABLE: TableDefinition<(&str, &str), i64> =
    TableDefinition::new("user_parents");

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

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: a commit is
    /// persistent as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway instances)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SUB_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(VENDORS_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(VENDOR_ACTIVE_TABLE)?;
            let _ = write_txn.open_table(PARENT_ORDERS_TABLE)?;
            let _ = write_txn.open_table(USER_PARENTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Begin a read transaction (consistent snapshot)
    pub fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    // ========== Reference Data ==========

    /// Insert or replace a vendor
    pub fn put_vendor(&self, vendor: &Vendor) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(VENDORS_TABLE)?;
            let value = serde_json::to_vec(vendor)?;
            table.insert(vendor.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a vendor (within transaction)
    pub fn get_vendor_txn(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
    ) -> StorageResult<Option<Vendor>> {
        let table = txn.open_table(VENDORS_TABLE)?;
        load_json(&table, vendor_id)
    }

    /// Get a vendor
    pub fn get_vendor(&self, vendor_id: &str) -> StorageResult<Option<Vendor>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VENDORS_TABLE)?;
        load_json(&table, vendor_id)
    }

    /// Insert or replace a user's cart
    pub fn put_cart(&self, cart: &Cart) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CARTS_TABLE)?;
            let value = serde_json::to_vec(cart)?;
            table.insert(cart.user_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a user's cart
    pub fn get_cart(&self, user_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        load_json(&table, user_id)
    }

    /// Get a user's cart (within transaction)
    pub fn get_cart_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<Option<Cart>> {
        let table = txn.open_table(CARTS_TABLE)?;
        load_json(&table, user_id)
    }

    /// Remove a user's cart (within transaction)
    pub fn clear_cart_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        table.remove(user_id)?;
        Ok(())
    }

    // ========== Sub-orders ==========

    /// Store a newly created sub-order and its index rows
    pub fn insert_order_txn(&self, txn: &WriteTransaction, order: &SubOrder) -> StorageResult<()> {
        self.update_order_txn(txn, order)?;
        {
            let mut parents = txn.open_table(PARENT_ORDERS_TABLE)?;
            parents.insert((order.parent_order_id.as_str(), order.id.as_str()), ())?;
        }
        if let Some(user_id) = order.user_id.as_deref() {
            let mut history = txn.open_table(USER_PARENTS_TABLE)?;
            history.insert((user_id, order.parent_order_id.as_str()), order.created_at)?;
        }
        Ok(())
    }

    /// Persist a sub-order and keep the vendor active index in step with its status
    pub fn update_order_txn(&self, txn: &WriteTransaction, order: &SubOrder) -> StorageResult<()> {
        {
            let mut table = txn.open_table(SUB_ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        let mut active = txn.open_table(VENDOR_ACTIVE_TABLE)?;
        let key = (order.vendor_id.as_str(), order.id.as_str());
        if order.status.is_terminal() {
            active.remove(key)?;
        } else {
            active.insert(key, ())?;
        }
        Ok(())
    }

    /// Get a sub-order (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<SubOrder>> {
        let table = txn.open_table(SUB_ORDERS_TABLE)?;
        load_json(&table, order_id)
    }

    /// Get a sub-order
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<SubOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUB_ORDERS_TABLE)?;
        load_json(&table, order_id)
    }

    /// All non-terminal sub-orders of a vendor (within transaction)
    pub fn active_vendor_orders_txn(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
    ) -> StorageResult<Vec<SubOrder>> {
        let ids = {
            let index = txn.open_table(VENDOR_ACTIVE_TABLE)?;
            prefixed_ids(&index, vendor_id)?
        };
        let table = txn.open_table(SUB_ORDERS_TABLE)?;
        load_many(&table, &ids)
    }

    /// All non-terminal sub-orders of a vendor
    pub fn active_vendor_orders(&self, vendor_id: &str) -> StorageResult<Vec<SubOrder>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(VENDOR_ACTIVE_TABLE)?;
        let ids = prefixed_ids(&index, vendor_id)?;
        let table = read_txn.open_table(SUB_ORDERS_TABLE)?;
        load_many(&table, &ids)
    }

    /// All sub-orders sharing a parent order id
    pub fn sibling_orders(&self, parent_order_id: &str) -> StorageResult<Vec<SubOrder>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(PARENT_ORDERS_TABLE)?;
        let ids = prefixed_ids(&index, parent_order_id)?;
        let table = read_txn.open_table(SUB_ORDERS_TABLE)?;
        load_many(&table, &ids)
    }

    /// Parent order ids a customer has checked out, newest first
    pub fn user_parent_ids(&self, user_id: &str) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_PARENTS_TABLE)?;

        let mut entries = Vec::new();
        for result in table.range((user_id, "")..)? {
            let (key, value) = result?;
            let (owner, parent_id) = key.value();
            if owner != user_id {
                break;
            }
            entries.push((value.value(), parent_id.to_string()));
        }
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, id)| id).collect())
    }

    // ========== Payments ==========

    /// Insert or replace a payment (within transaction)
    pub fn put_payment_txn(&self, txn: &WriteTransaction, payment: &Payment) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let value = serde_json::to_vec(payment)?;
        table.insert(payment.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get the payment of a sub-order (within transaction)
    pub fn get_payment_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Payment>> {
        let table = txn.open_table(PAYMENTS_TABLE)?;
        load_json(&table, order_id)
    }

    /// Get the payment of a sub-order
    pub fn get_payment(&self, order_id: &str) -> StorageResult<Option<Payment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        load_json(&table, order_id)
    }
}

/// Load and decode one JSON row
fn load_json<T: serde::de::DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StorageResult<Option<T>> {
    match table.get(key)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

/// Load every id, failing on dangling index rows
fn load_many<T: serde::de::DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    ids: &[String],
) -> StorageResult<Vec<T>> {
    ids.iter()
        .map(|id| load_json(table, id)?.ok_or_else(|| StorageError::OrderNotFound(id.clone())))
        .collect()
}

/// Second key component of every index row whose first component is `owner`
fn prefixed_ids<V: redb::Value + 'static>(
    index: &impl ReadableTable<(&'static str, &'static str), V>,
    owner: &str,
) -> StorageResult<Vec<String>> {
    let mut ids = Vec::new();
    for result in index.range((owner, "")..)? {
        let (key, _value) = result?;
        let (prefix, id) = key.value();
        if prefix != owner {
            break;
        }
        ids.push(id.to_string());
    }
    Ok(ids)
}
