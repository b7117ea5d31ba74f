//! Partial request builder for the DataSift REST API.
//!
//! # Design
//! `PartialRequest` is a value type holding everything a call needs except
//! the endpoint: credentials, the accumulated path prefix, stored headers and
//! transport settings. `with_prefix` returns a new instance, so a resource
//! client derives its own builder once and reuses it for every call.
//!
//! `build` is pure and produces an `HttpRequest`. The terminal verbs (`get`,
//! `post`, `json`) build, execute through the `Transport`, and hand the raw
//! response to `normalize`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::Result;
use crate::http::{set_header, HttpMethod, HttpRequest, Transport};
use crate::response::{normalize, ApiResponse, NoopMapper, OutputMapper};

pub const API_SCHEME: &str = "https";
pub const API_HOST: &str = "api.datasift.com";
pub const API_VERSION: &str = "v1.1";

/// Client identifier sent with every request.
pub const USER_AGENT: &str = concat!("DataSift/v1.1 Rust/v", env!("CARGO_PKG_VERSION"));

/// Headers added to every request after stored and per-call headers.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("User-Agent", USER_AGENT)];

/// Header set keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Scheme, host and API version requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub scheme: String,
    pub host: String,
    pub version: String,
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            scheme: API_SCHEME.to_string(),
            host: API_HOST.to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

/// A yet-to-be-completed request.
#[derive(Clone)]
pub struct PartialRequest {
    credentials: Credentials,
    endpoint: ApiEndpoint,
    prefix: Option<String>,
    headers: Headers,
    timeout: Option<Duration>,
    proxy: Option<String>,
    verify: bool,
    transport: Arc<dyn Transport>,
    mapper: Arc<dyn OutputMapper>,
}

impl std::fmt::Debug for PartialRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialRequest")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("prefix", &self.prefix)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .field("verify", &self.verify)
            .finish_non_exhaustive()
    }
}

impl PartialRequest {
    /// A root builder with no prefix, no stored headers, no timeout, no proxy
    /// and TLS verification enabled.
    pub fn new(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            endpoint: ApiEndpoint::default(),
            prefix: None,
            headers: Headers::new(),
            timeout: None,
            proxy: None,
            verify: true,
            transport,
            mapper: Arc::new(NoopMapper),
        }
    }

    pub fn with_endpoint(mut self, endpoint: ApiEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn OutputMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Derive a builder whose prefix is the current prefix followed by
    /// `segments`, joined by `/`. `self` is left untouched.
    pub fn with_prefix<I, S>(&self, segments: I) -> PartialRequest
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts: Vec<String> = self.prefix.iter().cloned().collect();
        parts.extend(segments.into_iter().map(|s| s.as_ref().to_string()));
        let prefix = join_path(parts.iter().map(String::as_str));

        PartialRequest {
            prefix: (!prefix.is_empty()).then_some(prefix),
            ..self.clone()
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full URL for `path` under this builder's prefix.
    pub fn url(&self, path: &str) -> String {
        let path = join_path([
            self.endpoint.host.as_str(),
            self.endpoint.version.as_str(),
            self.prefix.as_deref().unwrap_or(""),
            path,
        ]);
        format!("{}://{}", self.endpoint.scheme, path)
    }

    /// Merge header sets in order: stored, per-call, defaults. A later set
    /// wins on a name collision, compared ignoring ASCII case. Credentials
    /// are applied last.
    pub fn merge_headers(&self, headers: Option<&Headers>) -> Headers {
        let mut merged = Headers::new();
        let stored = self.headers.iter();
        let call = headers.into_iter().flatten();
        for (name, value) in stored.chain(call) {
            set_header(&mut merged, name, value);
        }
        for (name, value) in DEFAULT_HEADERS {
            set_header(&mut merged, name, value);
        }
        self.credentials.apply(&mut merged);
        merged
    }

    /// Build the request for `path` without sending it.
    pub fn build(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
        headers: Option<&Headers>,
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(path),
            query: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: self.merge_headers(headers),
            body,
            timeout: self.timeout,
            proxy: self.proxy.clone(),
            verify: self.verify,
        }
    }

    pub fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: Option<&Headers>,
    ) -> Result<ApiResponse> {
        let request = self.build(HttpMethod::Get, path, params, headers, None);
        self.send(&request, path)
    }

    pub fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: Option<&Headers>,
        data: Option<String>,
    ) -> Result<ApiResponse> {
        let request = self.build(HttpMethod::Post, path, params, headers, data);
        self.send(&request, path)
    }

    /// POST `data` as JSON. A value that serializes to a JSON string is taken
    /// to be an already encoded document and sent unchanged.
    pub fn json<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<ApiResponse> {
        let body = match serde_json::to_value(data)? {
            Value::String(encoded) => encoded,
            value => serde_json::to_string(&value)?,
        };
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        self.post(path, &[], Some(&headers), Some(body))
    }

    fn send(&self, request: &HttpRequest, path: &str) -> Result<ApiResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "dispatching request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, url = %request.url, "received response");
        normalize(response, self.prefix.as_deref(), path, self.mapper.as_ref())
    }
}

/// Join non-empty path segments with `/`, trimming surrounding slashes from
/// each.
fn join_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
