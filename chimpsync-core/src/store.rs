//! Candidate order selection.
//!
//! # Storage layout
//!
//! ```text
//! orders       one row per order; created_at is 'YYYY-MM-DD HH:MM:SS' (UTC)
//! order_items  one row per line, keyed by order_id
//! ```
//!
//! The store is owned by the commerce system; this crate only reads it.
//! [`SqliteOrderStore::init_schema`] exists for fixtures.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};

use crate::error::StoreError;
use crate::filter::{format_store_datetime, parse_created_since, STORE_DATETIME_FORMAT};
use crate::types::{Customer, Order, OrderId, OrderItem, PaymentState, SyncFilter};

/// Builds the candidate set for a sync run.
pub trait OrderSelector {
    /// Paid orders matching `filter`, fully materialized.
    ///
    /// Fails with [`StoreError::InvalidFilter`] before touching the store if
    /// `created_since` cannot be parsed.
    fn select(&self, filter: &SyncFilter) -> Result<Vec<Order>, StoreError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id                  INTEGER PRIMARY KEY,
    number              TEXT,
    payment_state       TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    customer_id         INTEGER,
    customer_email      TEXT,
    customer_first_name TEXT,
    customer_last_name  TEXT,
    currency_code       TEXT NOT NULL,
    total               INTEGER NOT NULL,
    tax_total           INTEGER NOT NULL DEFAULT 0,
    shipping_total      INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS order_items (
    id           INTEGER PRIMARY KEY,
    order_id     INTEGER NOT NULL REFERENCES orders(id),
    product_code TEXT NOT NULL,
    product_name TEXT NOT NULL,
    variant_code TEXT NOT NULL,
    variant_name TEXT,
    quantity     INTEGER NOT NULL,
    unit_price   INTEGER NOT NULL,
    total        INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_payment_state ON orders(payment_state, created_at);
CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
";

/// SQLite-backed [`OrderSelector`].
pub struct SqliteOrderStore {
    conn: Connection,
}

impl SqliteOrderStore {
    /// Open an existing database read-only.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(path = %path.display(), "opened order store");
        Ok(Self { conn })
    }

    /// Open (or create) a database read-write. Used by fixtures.
    pub fn open_rw(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the `orders` / `order_items` tables if absent.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert an order and its lines. Used by fixtures.
    pub fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let customer = order.customer.as_ref();
        self.conn.execute(
            "INSERT INTO orders (id, number, payment_state, created_at, customer_id,
                                 customer_email, customer_first_name, customer_last_name,
                                 currency_code, total, tax_total, shipping_total)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                order.id.0,
                order.number,
                order.payment_state.as_str(),
                format_store_datetime(&order.created_at),
                customer.and_then(|c| c.id),
                customer.map(|c| c.email.as_str()),
                customer.and_then(|c| c.first_name.as_deref()),
                customer.and_then(|c| c.last_name.as_deref()),
                order.currency_code,
                order.total,
                order.tax_total,
                order.shipping_total,
            ],
        )?;
        for item in &order.items {
            self.conn.execute(
                "INSERT INTO order_items (id, order_id, product_code, product_name,
                                          variant_code, variant_name, quantity, unit_price, total)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    item.id,
                    order.id.0,
                    item.product_code,
                    item.product_name,
                    item.variant_code,
                    item.variant_name,
                    item.quantity,
                    item.unit_price,
                    item.total,
                ],
            )?;
        }
        Ok(())
    }

    fn load_items(&self, order_ids: &[OrderId]) -> Result<HashMap<OrderId, Vec<OrderItem>>, StoreError> {
        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(by_order);
        }

        // One query per chunk keeps us under SQLITE_MAX_VARIABLE_NUMBER.
        for chunk in order_ids.chunks(500) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, order_id, product_code, product_name, variant_code, variant_name,
                        quantity, unit_price, total
                 FROM order_items WHERE order_id IN ({placeholders}) ORDER BY id"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.0)), |row| {
                Ok((
                    OrderId(row.get("order_id")?),
                    OrderItem {
                        id: row.get("id")?,
                        product_code: row.get("product_code")?,
                        product_name: row.get("product_name")?,
                        variant_code: row.get("variant_code")?,
                        variant_name: row.get("variant_name")?,
                        quantity: row.get("quantity")?,
                        unit_price: row.get("unit_price")?,
                        total: row.get("total")?,
                    },
                ))
            })?;
            for row in rows {
                let (order_id, item) = row?;
                by_order.entry(order_id).or_default().push(item);
            }
        }
        Ok(by_order)
    }
}

impl OrderSelector for SqliteOrderStore {
    fn select(&self, filter: &SyncFilter) -> Result<Vec<Order>, StoreError> {
        let since = filter
            .created_since
            .as_deref()
            .map(parse_created_since)
            .transpose()?;

        let mut sql = String::from(
            "SELECT id, number, payment_state, created_at, customer_id, customer_email,
                    customer_first_name, customer_last_name, currency_code, total,
                    tax_total, shipping_total
             FROM orders WHERE payment_state = ?1",
        );
        let mut bindings = vec![PaymentState::Paid.as_str().to_owned()];
        if let Some(since) = since.as_ref() {
            sql.push_str(" AND created_at >= ?2");
            bindings.push(format_store_datetime(since));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), raw_order)?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?.into_order()?);
        }

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut items = self.load_items(&ids)?;
        for order in &mut orders {
            order.items = items.remove(&order.id).unwrap_or_default();
        }

        tracing::debug!(count = orders.len(), since = ?since, "selected paid orders");
        Ok(orders)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Columns as read, before timestamp validation.
struct RawOrder {
    id: OrderId,
    number: Option<String>,
    payment_state: String,
    created_at: String,
    customer_id: Option<i64>,
    customer_email: Option<String>,
    customer_first_name: Option<String>,
    customer_last_name: Option<String>,
    currency_code: String,
    total: i64,
    tax_total: i64,
    shipping_total: i64,
}

fn raw_order(row: &Row<'_>) -> rusqlite::Result<RawOrder> {
    Ok(RawOrder {
        id: OrderId(row.get("id")?),
        number: row.get("number")?,
        payment_state: row.get("payment_state")?,
        created_at: row.get("created_at")?,
        customer_id: row.get("customer_id")?,
        customer_email: row.get("customer_email")?,
        customer_first_name: row.get("customer_first_name")?,
        customer_last_name: row.get("customer_last_name")?,
        currency_code: row.get("currency_code")?,
        total: row.get("total")?,
        tax_total: row.get("tax_total")?,
        shipping_total: row.get("shipping_total")?,
    })
}

impl RawOrder {
    fn into_order(self) -> Result<Order, StoreError> {
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, STORE_DATETIME_FORMAT)
            .map_err(|e| StoreError::CorruptRow {
                order_id: self.id,
                reason: format!("created_at '{}': {e}", self.created_at),
            })?;

        let customer = self.customer_email.map(|email| Customer {
            id: self.customer_id,
            email,
            first_name: self.customer_first_name,
            last_name: self.customer_last_name,
        });

        Ok(Order {
            id: self.id,
            number: self.number,
            payment_state: PaymentState::from(self.payment_state),
            created_at,
            customer,
            currency_code: self.currency_code,
            total: self.total,
            tax_total: self.tax_total,
            shipping_total: self.shipping_total,
            items: Vec::new(),
        })
    }
}
