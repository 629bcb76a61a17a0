//! chimpsync core library: order domain types, candidate selection, config.
//!
//! Public API surface:
//! - [`types`]: orders, line items, filters, registration outcomes
//! - [`filter`]: `created-since` parsing
//! - [`store`]: [`OrderSelector`] and its SQLite implementation
//! - [`config`]: YAML config load
//! - [`error`]: [`StoreError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod filter;
pub mod store;
pub mod types;

pub use config::{Config, ResolvedConfig};
pub use error::{ConfigError, StoreError};
pub use store::{OrderSelector, SqliteOrderStore};
pub use types::{
    Customer, Order, OrderId, OrderItem, PaymentState, RegistrationResult, SyncFilter,
};
