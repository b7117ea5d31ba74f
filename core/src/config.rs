//! Client configuration.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::request::ApiEndpoint;

pub const ENV_USERNAME: &str = "DATASIFT_USERNAME";
pub const ENV_API_KEY: &str = "DATASIFT_API_KEY";
pub const ENV_API_HOST: &str = "DATASIFT_API_HOST";
pub const ENV_API_SCHEME: &str = "DATASIFT_API_SCHEME";
pub const ENV_TIMEOUT_SECS: &str = "DATASIFT_TIMEOUT_SECS";
pub const ENV_PROXY: &str = "DATASIFT_PROXY";

/// Settings used to construct a `Client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user: String,
    pub api_key: String,
    pub endpoint: ApiEndpoint,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub verify: bool,
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            api_key: api_key.into(),
            endpoint: ApiEndpoint::default(),
            timeout: None,
            proxy: None,
            verify: true,
            headers: BTreeMap::new(),
        }
    }

    /// Read configuration from `DATASIFT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let user = lookup(ENV_USERNAME).ok_or_else(|| missing(ENV_USERNAME))?;
        let api_key = lookup(ENV_API_KEY).ok_or_else(|| missing(ENV_API_KEY))?;
        let mut config = Self::new(user, api_key);

        if let Some(host) = lookup(ENV_API_HOST) {
            config.endpoint.host = host;
        }
        if let Some(scheme) = lookup(ENV_API_SCHEME) {
            config.endpoint.scheme = scheme;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{secs}'"
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        config.proxy = lookup(ENV_PROXY);

        config.validate()?;
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: ApiEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::Config("username must not be empty".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        Ok(())
    }
}

fn missing(var: &str) -> Error {
    Error::Config(format!("{var} is not set"))
}
