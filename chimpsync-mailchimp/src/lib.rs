//! # chimpsync-mailchimp
//!
//! Mailchimp e-commerce API client and the order registration policy.
//!
//! - [`client`]: [`EcommerceApi`] and its blocking HTTP implementation
//! - [`payload`]: order / product request bodies
//! - [`registrar`]: [`MailchimpRegistrar`]: create, update or skip one order

pub mod client;
pub mod error;
pub mod payload;
pub mod registrar;

pub use client::{ClientSettings, EcommerceApi, MailchimpClient, RemoteRecord};
pub use error::ApiError;
pub use payload::{OrderPayload, ProductPayload};
pub use registrar::MailchimpRegistrar;
