//! Decision-policy tests against an in-memory e-commerce API.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use chimpsync_core::{Customer, Order, OrderId, OrderItem, PaymentState, RegistrationResult};
use chimpsync_mailchimp::{
    ApiError, EcommerceApi, MailchimpRegistrar, OrderPayload, ProductPayload, RemoteRecord,
};
use chimpsync_sync::{OrderRegistrar, RegistrarError};
use chrono::NaiveDate;

#[derive(Default)]
struct FakeApi {
    orders: RefCell<BTreeMap<String, OrderPayload>>,
    products: RefCell<BTreeSet<String>>,
    carts: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<String>>,
    /// Status returned by every call when set.
    fail_status: Cell<Option<u16>>,
    /// Create/update responses omit the `id` field.
    omit_id: Cell<bool>,
    cart_delete_fails: Cell<bool>,
}

impl FakeApi {
    fn with_order(self, id: &str, order: &Order) -> Self {
        let payload = OrderPayload::from_order(order).expect("payload");
        self.orders.borrow_mut().insert(id.to_string(), payload);
        self
    }

    fn log(&self, call: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        match self.fail_status.get() {
            Some(status) => Err(ApiError::Status {
                status,
                detail: "scripted".into(),
            }),
            None => Ok(()),
        }
    }

    fn ack(&self, id: &str) -> Result<RemoteRecord, ApiError> {
        if self.omit_id.get() {
            return Err(ApiError::MalformedResponse { field: "id" });
        }
        Ok(RemoteRecord { id: id.to_string() })
    }

    fn mutations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !c.starts_with("find") && !c.starts_with("product?"))
            .cloned()
            .collect()
    }
}

impl EcommerceApi for FakeApi {
    fn find_order(&self, order_id: &str) -> Result<Option<RemoteRecord>, ApiError> {
        self.log(format!("find:{order_id}"))?;
        Ok(self
            .orders
            .borrow()
            .get(order_id)
            .map(|o| RemoteRecord { id: o.id.clone() }))
    }

    fn create_order(&self, order: &OrderPayload) -> Result<RemoteRecord, ApiError> {
        self.log(format!("create:{}", order.id))?;
        self.orders
            .borrow_mut()
            .insert(order.id.clone(), order.clone());
        self.ack(&order.id)
    }

    fn update_order(
        &self,
        order_id: &str,
        order: &OrderPayload,
    ) -> Result<RemoteRecord, ApiError> {
        self.log(format!("update:{order_id}"))?;
        self.orders
            .borrow_mut()
            .insert(order_id.to_string(), order.clone());
        self.ack(order_id)
    }

    fn product_exists(&self, product_id: &str) -> Result<bool, ApiError> {
        self.log(format!("product?:{product_id}"))?;
        Ok(self.products.borrow().contains(product_id))
    }

    fn create_product(&self, product: &ProductPayload) -> Result<RemoteRecord, ApiError> {
        self.log(format!("product+:{}", product.id))?;
        self.products.borrow_mut().insert(product.id.clone());
        self.ack(&product.id)
    }

    fn delete_cart(&self, cart_id: &str) -> Result<bool, ApiError> {
        self.log(format!("cart-:{cart_id}"))?;
        if self.cart_delete_fails.get() {
            return Err(ApiError::Transport("connection reset".into()));
        }
        Ok(self.carts.borrow_mut().remove(cart_id))
    }
}

fn order(id: i64) -> Order {
    Order {
        id: OrderId(id),
        number: Some(format!("#{id:06}")),
        payment_state: PaymentState::Paid,
        created_at: NaiveDate::from_ymd_opt(2024, 2, 2)
            .and_then(|d| d.and_hms_opt(2, 2, 2))
            .expect("ts"),
        customer: Some(Customer {
            id: Some(9),
            email: "linus@example.com".into(),
            first_name: None,
            last_name: None,
        }),
        currency_code: "EUR".into(),
        total: 4200,
        tax_total: 0,
        shipping_total: 0,
        items: vec![OrderItem {
            id: 1,
            product_code: "BOOK".into(),
            product_name: "Book".into(),
            variant_code: "BOOK-HC".into(),
            variant_name: Some("Hardcover".into()),
            quantity: 1,
            unit_price: 4200,
            total: 4200,
        }],
    }
}

#[test]
fn missing_remote_record_is_created_in_both_modes() {
    for create_only in [false, true] {
        let registrar = MailchimpRegistrar::new(FakeApi::default());
        let result = registrar.register(&order(1), create_only).expect("register");
        assert_eq!(
            result,
            RegistrationResult::Created {
                remote_id: "1".into()
            },
            "create_only={create_only}"
        );
        assert!(registrar.api().orders.borrow().contains_key("1"));
    }
}

#[test]
fn existing_record_is_skipped_in_create_only_mode() {
    let api = FakeApi::default().with_order("1", &order(1));
    let registrar = MailchimpRegistrar::new(api);

    let result = registrar.register(&order(1), true).expect("register");

    assert_eq!(result, RegistrationResult::Skipped);
    assert_eq!(*registrar.api().calls.borrow(), vec!["find:1".to_string()]);
    assert!(registrar.api().mutations().is_empty());
}

#[test]
fn existing_record_is_updated_with_current_state() {
    let api = FakeApi::default().with_order("1", &order(1));
    let registrar = MailchimpRegistrar::new(api);
    let mut changed = order(1);
    changed.total = 5000;

    let result = registrar.register(&changed, false).expect("register");

    assert_eq!(
        result,
        RegistrationResult::Updated {
            remote_id: "1".into()
        }
    );
    assert_eq!(registrar.api().orders.borrow()["1"].order_total, 50.0);
    assert!(registrar.api().mutations().contains(&"update:1".to_string()));
}

#[test]
fn repeated_update_is_idempotent() {
    let api = FakeApi::default().with_order("1", &order(1));
    let registrar = MailchimpRegistrar::new(api);

    let first = registrar.register(&order(1), false).expect("first");
    let second = registrar.register(&order(1), false).expect("second");

    let updated = RegistrationResult::Updated {
        remote_id: "1".into(),
    };
    assert_eq!(first, updated);
    assert_eq!(second, updated);
    assert_eq!(registrar.api().orders.borrow().len(), 1);
    assert!(!registrar
        .api()
        .calls
        .borrow()
        .iter()
        .any(|c| c.starts_with("create")));
}

#[test]
fn create_then_register_again_updates() {
    let registrar = MailchimpRegistrar::new(FakeApi::default());
    assert!(matches!(
        registrar.register(&order(3), false).expect("first"),
        RegistrationResult::Created { .. }
    ));
    assert!(matches!(
        registrar.register(&order(3), false).expect("second"),
        RegistrationResult::Updated { .. }
    ));
    assert_eq!(registrar.api().orders.borrow().len(), 1);
}

#[test]
fn missing_products_are_created_once() {
    let registrar = MailchimpRegistrar::new(FakeApi::default());
    registrar.register(&order(1), false).expect("first");
    registrar.register(&order(2), false).expect("second");

    let product_creates = registrar
        .api()
        .calls
        .borrow()
        .iter()
        .filter(|c| c.as_str() == "product+:BOOK")
        .count();
    assert_eq!(product_creates, 1);
}

#[test]
fn abandoned_cart_is_removed_after_create() {
    let api = FakeApi::default();
    api.carts.borrow_mut().insert("1".into());
    let registrar = MailchimpRegistrar::new(api);

    registrar.register(&order(1), false).expect("register");

    assert!(registrar.api().carts.borrow().is_empty());
}

#[test]
fn cart_cleanup_failure_does_not_fail_the_order() {
    let api = FakeApi::default();
    api.cart_delete_fails.set(true);
    let registrar = MailchimpRegistrar::new(api);

    let result = registrar.register(&order(1), false).expect("register");
    assert!(matches!(result, RegistrationResult::Created { .. }));
}

#[test]
fn auth_failure_becomes_failed_result() {
    let api = FakeApi::default();
    api.fail_status.set(Some(401));
    let registrar = MailchimpRegistrar::new(api);

    let result = registrar.register(&order(1), false).expect("register");
    match result {
        RegistrationResult::Failed { reason } => {
            assert!(reason.contains("authentication failed"), "reason: {reason}")
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn response_without_id_is_a_reportable_failure() {
    let api = FakeApi::default();
    api.omit_id.set(true);
    let registrar = MailchimpRegistrar::new(api);

    let result = registrar.register(&order(1), false).expect("register");
    assert_eq!(
        result,
        RegistrationResult::Failed {
            reason: "malformed response: missing 'id'".into()
        }
    );
}

#[test]
fn order_without_email_is_refused_before_any_write() {
    let registrar = MailchimpRegistrar::new(FakeApi::default());
    let mut anonymous = order(4);
    anonymous.customer = None;

    let err = registrar.register(&anonymous, false).unwrap_err();

    assert!(matches!(
        err,
        RegistrarError::InvalidOrder {
            order_id: OrderId(4),
            ..
        }
    ));
    assert_eq!(*registrar.api().calls.borrow(), vec!["find:4".to_string()]);
}

#[test]
fn existing_order_without_email_is_still_skipped_in_create_only_mode() {
    let api = FakeApi::default().with_order("7", &order(7));
    let registrar = MailchimpRegistrar::new(api);
    let mut anonymous = order(7);
    anonymous.customer = None;

    let result = registrar.register(&anonymous, true).expect("register");

    assert_eq!(result, RegistrationResult::Skipped);
    assert_eq!(*registrar.api().calls.borrow(), vec!["find:7".to_string()]);
}

#[test]
fn existing_order_without_email_is_not_updated() {
    let api = FakeApi::default().with_order("7", &order(7));
    let registrar = MailchimpRegistrar::new(api);
    let mut anonymous = order(7);
    anonymous.customer = None;

    let err = registrar.register(&anonymous, false).unwrap_err();

    assert!(matches!(err, RegistrarError::InvalidOrder { .. }), "got: {err}");
    assert!(registrar.api().mutations().is_empty());
    assert_eq!(
        registrar.api().orders.borrow()["7"].customer.email_address,
        "linus@example.com"
    );
}
