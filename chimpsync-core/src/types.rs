//! Domain types for order synchronization.
//!
//! Monetary amounts are integer hundredths of the order currency, for every
//! currency. Timestamps are naive UTC at second precision, matching how the
//! order store persists them.

use std::fmt;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed local order identifier.
///
/// Its string form is the stable key used for the remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Key of the remote order (and abandoned cart) for this order.
    pub fn remote_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Payment state of an order in the commerce domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentState {
    Cart,
    AwaitingPayment,
    PartiallyAuthorized,
    Authorized,
    PartiallyPaid,
    Paid,
    Cancelled,
    PartiallyRefunded,
    Refunded,
    /// A state string this crate does not know about.
    Other(String),
}

impl PaymentState {
    /// The state string as persisted by the store.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentState::Cart => "cart",
            PaymentState::AwaitingPayment => "awaiting_payment",
            PaymentState::PartiallyAuthorized => "partially_authorized",
            PaymentState::Authorized => "authorized",
            PaymentState::PartiallyPaid => "partially_paid",
            PaymentState::Paid => "paid",
            PaymentState::Cancelled => "cancelled",
            PaymentState::PartiallyRefunded => "partially_refunded",
            PaymentState::Refunded => "refunded",
            PaymentState::Other(s) => s,
        }
    }
}

impl From<&str> for PaymentState {
    fn from(s: &str) -> Self {
        match s {
            "cart" => PaymentState::Cart,
            "awaiting_payment" => PaymentState::AwaitingPayment,
            "partially_authorized" => PaymentState::PartiallyAuthorized,
            "authorized" => PaymentState::Authorized,
            "partially_paid" => PaymentState::PartiallyPaid,
            "paid" => PaymentState::Paid,
            "cancelled" => PaymentState::Cancelled,
            "partially_refunded" => PaymentState::PartiallyRefunded,
            "refunded" => PaymentState::Refunded,
            other => PaymentState::Other(other.to_owned()),
        }
    }
}

impl From<String> for PaymentState {
    fn from(s: String) -> Self {
        PaymentState::from(s.as_str())
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// The customer attached to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Option<i64>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A single order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: i64,
    pub product_code: String,
    pub product_name: String,
    pub variant_code: String,
    pub variant_name: Option<String>,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
}

/// An order as read from the commerce store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub number: Option<String>,
    pub payment_state: PaymentState,
    pub created_at: NaiveDateTime,
    pub customer: Option<Customer>,
    pub currency_code: String,
    pub total: i64,
    pub tax_total: i64,
    pub shipping_total: i64,
    pub items: Vec<OrderItem>,
}

/// Per-invocation selection and reconciliation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncFilter {
    /// Never update existing remote records; only create missing ones.
    pub create_only: bool,
    /// Raw `created-since` input; parsed by the selector.
    pub created_since: Option<String>,
}

impl SyncFilter {
    pub fn new(create_only: bool, created_since: Option<String>) -> Self {
        Self {
            create_only,
            created_since,
        }
    }
}

/// Outcome of registering one order with the remote system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    /// No remote record existed; one was created.
    Created { remote_id: String },
    /// An existing remote record was updated.
    Updated { remote_id: String },
    /// A remote record exists and create-only mode forbids touching it.
    Skipped,
    /// The remote call failed or returned an unusable response.
    Failed { reason: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
