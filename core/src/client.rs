//! Entry point bundling the root request builder and the resource clients.

use std::sync::Arc;

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::historics_preview::HistoricsPreview;
use crate::http::{Transport, UreqTransport};
use crate::request::PartialRequest;
use crate::response::OutputMapper;

/// Blocking client for the DataSift REST API.
///
/// Holds no mutable state; every call blocks until the transport returns.
#[derive(Debug, Clone)]
pub struct Client {
    request: PartialRequest,
    historics_preview: HistoricsPreview,
}

impl Client {
    /// Build a client that talks to the API over `ureq`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let request = PartialRequest::new(Credentials::new(config.user, config.api_key), transport)
            .with_endpoint(config.endpoint)
            .with_headers(config.headers)
            .with_timeout(config.timeout)
            .with_proxy(config.proxy)
            .with_verify(config.verify);
        Ok(Self::from_request(request))
    }

    /// Replace the output mapping applied to object responses.
    pub fn with_mapper(self, mapper: Arc<dyn OutputMapper>) -> Self {
        Self::from_request(self.request.with_mapper(mapper))
    }

    fn from_request(request: PartialRequest) -> Self {
        let historics_preview = HistoricsPreview::new(&request);
        Self {
            request,
            historics_preview,
        }
    }

    /// The root builder, for endpoints without a dedicated resource client.
    pub fn request(&self) -> &PartialRequest {
        &self.request
    }

    pub fn historics_preview(&self) -> &HistoricsPreview {
        &self.historics_preview
    }
}
