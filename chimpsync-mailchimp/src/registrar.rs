//! Create / update / skip policy for one order.
//!
//! 1. Look up the remote order by the local order id.
//! 2. Present and create-only → skip without touching anything.
//! 3. Absent → make sure its products exist, create it, drop the abandoned cart.
//! 4. Present → make sure its products exist, update it.
//!
//! The order is only mapped to a payload when it is about to be written, so a
//! skip never fails on an incomplete order. Every [`ApiError`] along the way
//! becomes [`RegistrationResult::Failed`]. There are no retries.

use chimpsync_core::{Order, RegistrationResult};
use chimpsync_sync::{OrderRegistrar, RegistrarError};

use crate::client::EcommerceApi;
use crate::error::ApiError;
use crate::payload::{OrderPayload, ProductPayload};

pub struct MailchimpRegistrar<A> {
    api: A,
}

impl<A: EcommerceApi> MailchimpRegistrar<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn reconcile(&self, order: &Order, create_only: bool) -> Result<RegistrationResult, Refusal> {
        let key = order.id.remote_key();

        match self.api.find_order(&key)? {
            Some(_) if create_only => {
                tracing::debug!(order = %order.id, "remote order exists; create-only, skipping");
                Ok(RegistrationResult::Skipped)
            }
            Some(_) => {
                let payload = OrderPayload::from_order(order).map_err(Refusal::Invalid)?;
                self.ensure_products(order)?;
                let record = self.api.update_order(&key, &payload)?;
                tracing::info!(order = %order.id, remote_id = %record.id, "updated remote order");
                Ok(RegistrationResult::Updated {
                    remote_id: record.id,
                })
            }
            None => {
                let payload = OrderPayload::from_order(order).map_err(Refusal::Invalid)?;
                self.ensure_products(order)?;
                let record = self.api.create_order(&payload)?;
                tracing::info!(order = %order.id, remote_id = %record.id, "created remote order");
                self.forget_cart(&key);
                Ok(RegistrationResult::Created {
                    remote_id: record.id,
                })
            }
        }
    }

    /// Create any product the order references that the store lacks.
    fn ensure_products(&self, order: &Order) -> Result<(), ApiError> {
        for product in ProductPayload::from_items(&order.items) {
            if self.api.product_exists(&product.id)? {
                continue;
            }
            let record = self.api.create_product(&product)?;
            tracing::info!(product = %record.id, "created remote product");
        }
        Ok(())
    }

    /// The order supersedes its abandoned cart. Failure here is not fatal.
    fn forget_cart(&self, key: &str) {
        match self.api.delete_cart(key) {
            Ok(true) => tracing::debug!(cart = %key, "deleted abandoned cart"),
            Ok(false) => {}
            Err(err) => tracing::warn!(cart = %key, error = %err, "could not delete abandoned cart"),
        }
    }
}

impl<A: EcommerceApi> OrderRegistrar for MailchimpRegistrar<A> {
    fn register(
        &self,
        order: &Order,
        create_only: bool,
    ) -> Result<RegistrationResult, RegistrarError> {
        match self.reconcile(order, create_only) {
            Ok(result) => Ok(result),
            Err(Refusal::Invalid(reason)) => Err(RegistrarError::InvalidOrder {
                order_id: order.id,
                reason,
            }),
            Err(Refusal::Api(err)) => {
                if err.is_auth() {
                    tracing::warn!(order = %order.id, error = %err, "Mailchimp rejected the API key");
                } else {
                    tracing::debug!(order = %order.id, error = %err, "registration failed");
                }
                Ok(RegistrationResult::Failed {
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Why `reconcile` stopped short of a result.
enum Refusal {
    /// The order cannot be expressed as a Mailchimp order.
    Invalid(String),
    Api(ApiError),
}

impl From<ApiError> for Refusal {
    fn from(err: ApiError) -> Self {
        Refusal::Api(err)
    }
}
