//! The remote-registration seam.

use chimpsync_core::{Order, RegistrationResult};

use crate::error::RegistrarError;

/// Reconciles one local order with the remote system.
///
/// Implementations decide create / update / skip and fold remote failures into
/// [`RegistrationResult::Failed`]. An `Err` is reserved for orders the
/// registrar refuses to handle at all.
pub trait OrderRegistrar {
    fn register(
        &self,
        order: &Order,
        create_only: bool,
    ) -> Result<RegistrationResult, RegistrarError>;
}

impl<R: OrderRegistrar + ?Sized> OrderRegistrar for &R {
    fn register(
        &self,
        order: &Order,
        create_only: bool,
    ) -> Result<RegistrationResult, RegistrarError> {
        (**self).register(order, create_only)
    }
}
