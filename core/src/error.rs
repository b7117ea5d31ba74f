//! Error types for the DataSift client.
//!
//! # Design
//! Every failure mode is a variant of one `Error` enum so callers can match by
//! kind. Errors carrying server output (`Auth`, `Api`, `Http`) keep the payload
//! or the wrapped response for inspection. Nothing here is retried or logged;
//! the error is returned to the caller as soon as it is detected.

use serde_json::Value;
use thiserror::Error;

use crate::response::Response;

/// Errors returned by the request builder, the normalizer and resource clients.
#[derive(Debug, Error)]
pub enum Error {
    /// A historics call was made with an empty `sources` list. Raised before
    /// any network I/O.
    #[error("at least one historics source is required")]
    SourcesRequired,

    /// The response body was not valid JSON.
    #[error("unable to decode returned data: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body decoded, but to a scalar instead of an object or an array.
    #[error("unexpected response payload: expected a JSON object or array, got {0}")]
    UnexpectedPayload(&'static str),

    /// The server answered 401 with an `error` payload.
    #[error("authentication failed: {0}")]
    Auth(Value),

    /// The server reported an `error` in the payload for any status other
    /// than 401. The full response is attached.
    #[error("API error (HTTP {}): {}", .0.status_code(), api_message(.0))]
    Api(Box<Response>),

    /// Non-success status without an `error` payload.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, TLS, timeout or body-read failure from the HTTP library.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or missing client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Alias for `Result` with the crate's `Error`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status attached to the error, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(response) => Some(response.status_code()),
            Error::Http { status, .. } => Some(*status),
            Error::Auth(_) => Some(401),
            _ => None,
        }
    }
}

fn api_message(response: &Response) -> String {
    match response.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_displays_server_message() {
        let response = Response::new(
            404,
            Vec::new(),
            json!({"error": "Preview not found"}).as_object().cloned().unwrap_or_default(),
        );
        let err = Error::Api(Box::new(response));
        assert_eq!(err.to_string(), "API error (HTTP 404): Preview not found");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn auth_error_reports_unauthorized() {
        let err = Error::Auth(json!({"error": "bad"}));
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn validation_error_has_no_status() {
        assert_eq!(Error::SourcesRequired.status_code(), None);
    }
}
