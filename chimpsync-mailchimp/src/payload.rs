//! Request bodies for the e-commerce endpoints.
//!
//! Amounts go out in major units. The store keeps every amount in hundredths
//! of the order currency, zero-decimal currencies such as JPY included, so
//! the conversion is a fixed division by 100 whatever `currency_code` says.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde::Serialize;

use chimpsync_core::{Order, OrderItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerPayload {
    pub id: String,
    pub email_address: String,
    pub opt_in_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePayload {
    pub id: String,
    pub product_id: String,
    pub product_variant_id: String,
    pub quantity: i64,
    pub price: f64,
}

/// Body for `POST /orders` and `PATCH /orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    pub id: String,
    pub customer: CustomerPayload,
    pub currency_code: String,
    pub order_total: f64,
    pub tax_total: f64,
    pub shipping_total: f64,
    pub financial_status: String,
    pub processed_at_foreign: String,
    pub lines: Vec<LinePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPayload {
    pub id: String,
    pub title: String,
    pub price: f64,
}

/// Body for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub id: String,
    pub title: String,
    pub variants: Vec<VariantPayload>,
}

impl OrderPayload {
    /// Map an order; `Err` carries the reason it cannot be sent.
    pub fn from_order(order: &Order) -> Result<Self, String> {
        let customer = order
            .customer
            .as_ref()
            .filter(|c| !c.email.trim().is_empty())
            .ok_or_else(|| "order has no customer email".to_string())?;

        Ok(Self {
            id: order.id.remote_key(),
            customer: CustomerPayload {
                id: customer
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| customer.email.clone()),
                email_address: customer.email.clone(),
                opt_in_status: false,
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
            },
            currency_code: order.currency_code.clone(),
            order_total: major(order.total),
            tax_total: major(order.tax_total),
            shipping_total: major(order.shipping_total),
            financial_status: order.payment_state.to_string(),
            processed_at_foreign: Utc.from_utc_datetime(&order.created_at).to_rfc3339(),
            lines: order
                .items
                .iter()
                .map(|item| LinePayload {
                    id: item.id.to_string(),
                    product_id: item.product_code.clone(),
                    product_variant_id: item.variant_code.clone(),
                    quantity: item.quantity,
                    price: major(item.total),
                })
                .collect(),
        })
    }
}

impl ProductPayload {
    /// One payload per distinct product code, variants deduplicated, in
    /// first-seen order.
    pub fn from_items(items: &[OrderItem]) -> Vec<ProductPayload> {
        let mut order: Vec<&str> = Vec::new();
        let mut products: BTreeMap<&str, ProductPayload> = BTreeMap::new();

        for item in items {
            let product = products.entry(item.product_code.as_str()).or_insert_with(|| {
                order.push(item.product_code.as_str());
                ProductPayload {
                    id: item.product_code.clone(),
                    title: item.product_name.clone(),
                    variants: Vec::new(),
                }
            });
            if product.variants.iter().any(|v| v.id == item.variant_code) {
                continue;
            }
            product.variants.push(VariantPayload {
                id: item.variant_code.clone(),
                title: item
                    .variant_name
                    .clone()
                    .unwrap_or_else(|| item.product_name.clone()),
                price: major(item.unit_price),
            });
        }

        order
            .into_iter()
            .filter_map(|code| products.remove(code))
            .collect()
    }
}

/// Store hundredths to major units. Dividing an exact integer by 100 gives
/// the closest `f64`, which serde_json prints with at most two decimals.
fn major(hundredths: i64) -> f64 {
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use chimpsync_core::{Customer, OrderId, PaymentState};
    use chrono::NaiveDate;

    use super::*;

    fn item(id: i64, product: &str, variant: &str) -> OrderItem {
        OrderItem {
            id,
            product_code: product.into(),
            product_name: format!("{product} name"),
            variant_code: variant.into(),
            variant_name: None,
            quantity: 1,
            unit_price: 1250,
            total: 1250,
        }
    }

    fn order() -> Order {
        Order {
            id: OrderId(31),
            number: Some("000000031".into()),
            payment_state: PaymentState::Paid,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 6)
                .and_then(|d| d.and_hms_opt(7, 8, 9))
                .unwrap(),
            customer: Some(Customer {
                id: None,
                email: "grace@example.com".into(),
                first_name: Some("Grace".into()),
                last_name: Some("Hopper".into()),
            }),
            currency_code: "USD".into(),
            total: 3750,
            tax_total: 250,
            shipping_total: 1000,
            items: vec![item(1, "MUG", "MUG-S"), item(2, "MUG", "MUG-L")],
        }
    }

    #[test]
    fn order_payload_maps_totals_and_customer() {
        let payload = OrderPayload::from_order(&order()).unwrap();
        assert_eq!(payload.id, "31");
        assert_eq!(payload.customer.id, "grace@example.com");
        assert_eq!(payload.order_total, 37.5);
        assert_eq!(payload.tax_total, 2.5);
        assert_eq!(payload.financial_status, "paid");
        assert_eq!(payload.processed_at_foreign, "2024-05-06T07:08:09+00:00");
        assert_eq!(payload.lines.len(), 2);
        assert_eq!(payload.lines[1].product_variant_id, "MUG-L");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["customer"]["opt_in_status"], false);
        assert_eq!(json["customer"]["last_name"], "Hopper");
    }

    #[test]
    fn order_without_email_is_rejected() {
        let mut o = order();
        o.customer = None;
        assert!(OrderPayload::from_order(&o).is_err());
    }

    #[test]
    fn products_group_variants_in_first_seen_order() {
        let items = vec![
            item(1, "TEE", "TEE-M"),
            item(2, "MUG", "MUG-S"),
            item(3, "TEE", "TEE-L"),
            item(4, "TEE", "TEE-M"),
        ];
        let products = ProductPayload::from_items(&items);
        assert_eq!(
            products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["TEE", "MUG"]
        );
        assert_eq!(
            products[0]
                .variants
                .iter()
                .map(|v| v.id.as_str())
                .collect::<Vec<_>>(),
            vec!["TEE-M", "TEE-L"]
        );
        assert_eq!(products[0].variants[0].title, "TEE name");
        assert_eq!(products[1].variants[0].price, 12.5);
    }

    #[test]
    fn amounts_serialize_without_float_noise() {
        for (hundredths, json) in [
            (1999, "19.99"),
            (1, "0.01"),
            (10, "0.1"),
            (30, "0.3"),
            (123_456_789, "1234567.89"),
        ] {
            assert_eq!(serde_json::to_string(&major(hundredths)).unwrap(), json);
        }
    }

    #[test]
    fn zero_decimal_currency_still_uses_hundredths() {
        let mut yen = order();
        yen.currency_code = "JPY".into();
        yen.total = 150_000;

        let payload = OrderPayload::from_order(&yen).unwrap();
        assert_eq!(payload.currency_code, "JPY");
        assert_eq!(payload.order_total, 1500.0);
    }
}
