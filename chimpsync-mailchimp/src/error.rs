//! Error types for chimpsync-mailchimp.

use thiserror::Error;

/// All errors that can arise from a Mailchimp API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No base URL override and the key carries no `-<dc>` suffix.
    #[error("API key has no data-centre suffix (expected '<key>-<dc>')")]
    InvalidApiKey,

    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status; `detail` comes from the problem-JSON body.
    #[error("{} (HTTP {status}){}", status_label(*status), detail_suffix(detail))]
    Status { status: u16, detail: String },

    /// The response body was not the JSON we expected.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// A 2xx response lacked a field we rely on.
    #[error("malformed response: missing '{field}'")]
    MalformedResponse { field: &'static str },
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

fn status_label(status: u16) -> &'static str {
    match status {
        401 | 403 => "authentication failed",
        400..=499 => "request rejected",
        _ => "server error",
    }
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}
