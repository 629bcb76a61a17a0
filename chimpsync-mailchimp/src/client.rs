//! Blocking Mailchimp e-commerce client.
//!
//! All paths are relative to `<base>/ecommerce/stores/<store_id>/`. A `404` on
//! a lookup means "absent", never an error.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use chimpsync_core::ResolvedConfig;

use crate::error::ApiError;
use crate::payload::{OrderPayload, ProductPayload};

/// Identifier of a record the remote system acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub id: String,
}

/// The slice of the Mailchimp e-commerce API the registrar needs.
pub trait EcommerceApi {
    fn find_order(&self, order_id: &str) -> Result<Option<RemoteRecord>, ApiError>;
    fn create_order(&self, order: &OrderPayload) -> Result<RemoteRecord, ApiError>;
    fn update_order(&self, order_id: &str, order: &OrderPayload)
        -> Result<RemoteRecord, ApiError>;
    fn product_exists(&self, product_id: &str) -> Result<bool, ApiError>;
    fn create_product(&self, product: &ProductPayload) -> Result<RemoteRecord, ApiError>;
    /// Returns `false` when there was no cart to delete.
    fn delete_cart(&self, cart_id: &str) -> Result<bool, ApiError>;
}

/// Connection settings for [`MailchimpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_key: String,
    pub store_id: String,
    /// Overrides `https://<dc>.api.mailchimp.com/3.0`.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl From<&ResolvedConfig> for ClientSettings {
    fn from(cfg: &ResolvedConfig) -> Self {
        Self {
            api_key: cfg.api_key.clone(),
            store_id: cfg.store_id.clone(),
            base_url: cfg.api_base_url.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

pub struct MailchimpClient {
    agent: ureq::Agent,
    store_url: String,
    authorization: String,
}

impl MailchimpClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = match settings.base_url {
            Some(url) => url,
            None => default_base_url(&settings.api_key)?,
        };
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(concat!("chimpsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Ok(Self {
            agent,
            store_url: format!(
                "{}/ecommerce/stores/{}",
                base.trim_end_matches('/'),
                settings.store_id
            ),
            authorization: format!("apikey {}", settings.api_key),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.store_url)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        tracing::debug!(%method, %url, "mailchimp request");
        self.agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
    }

    /// `GET` that maps 404 to `None`.
    fn lookup(&self, path: &str) -> Result<Option<Value>, ApiError> {
        match self.request("GET", path).call() {
            Ok(resp) => Ok(Some(read_json(resp)?)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(err) => Err(map_ureq_error(err)),
        }
    }

    fn send(&self, method: &str, path: &str, body: &impl Serialize) -> Result<Value, ApiError> {
        let resp = self
            .request(method, path)
            .send_json(body)
            .map_err(map_ureq_error)?;
        read_json(resp)
    }
}

impl EcommerceApi for MailchimpClient {
    fn find_order(&self, order_id: &str) -> Result<Option<RemoteRecord>, ApiError> {
        self.lookup(&format!("orders/{order_id}"))?
            .map(|body| record_from(&body))
            .transpose()
    }

    fn create_order(&self, order: &OrderPayload) -> Result<RemoteRecord, ApiError> {
        record_from(&self.send("POST", "orders", order)?)
    }

    fn update_order(
        &self,
        order_id: &str,
        order: &OrderPayload,
    ) -> Result<RemoteRecord, ApiError> {
        record_from(&self.send("PATCH", &format!("orders/{order_id}"), order)?)
    }

    fn product_exists(&self, product_id: &str) -> Result<bool, ApiError> {
        Ok(self.lookup(&format!("products/{product_id}"))?.is_some())
    }

    fn create_product(&self, product: &ProductPayload) -> Result<RemoteRecord, ApiError> {
        record_from(&self.send("POST", "products", product)?)
    }

    fn delete_cart(&self, cart_id: &str) -> Result<bool, ApiError> {
        match self.request("DELETE", &format!("carts/{cart_id}")).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(err) => Err(map_ureq_error(err)),
        }
    }
}

/// `https://<dc>.api.mailchimp.com/3.0`, `<dc>` being the key's suffix.
pub fn default_base_url(api_key: &str) -> Result<String, ApiError> {
    match api_key.rsplit_once('-') {
        Some((key, dc)) if !key.is_empty() && !dc.is_empty() => {
            Ok(format!("https://{dc}.api.mailchimp.com/3.0"))
        }
        _ => Err(ApiError::InvalidApiKey),
    }
}

fn read_json(resp: ureq::Response) -> Result<Value, ApiError> {
    resp.into_json::<Value>()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn record_from(body: &Value) -> Result<RemoteRecord, ApiError> {
    match body.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(RemoteRecord { id: id.clone() }),
        Some(Value::Number(id)) => Ok(RemoteRecord { id: id.to_string() }),
        _ => Err(ApiError::MalformedResponse { field: "id" }),
    }
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, resp) => ApiError::Status {
            status,
            detail: problem_detail(resp),
        },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// `detail` (or `title`) from an API problem document, if any.
fn problem_detail(resp: ureq::Response) -> String {
    let Ok(body) = resp.into_json::<Value>() else {
        return String::new();
    };
    ["detail", "title"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
