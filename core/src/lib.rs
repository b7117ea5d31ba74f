//! Blocking client for the DataSift REST API.
//!
//! # Overview
//! `PartialRequest` composes URLs, headers and credentials, a `Transport`
//! performs the HTTP round-trip, and `normalize` turns the raw response into
//! an `ApiResponse` (object or list) or an `Error`. Resource clients such as
//! `HistoricsPreview` are thin layers that marshal parameters onto a
//! prefixed builder.
//!
//! # Design
//! - Builders are values; deriving a prefix never mutates the original.
//! - Request construction is pure (`PartialRequest::build`), so the I/O
//!   boundary sits at `Transport::execute`.
//! - No retries, pooling or pagination: each call is one blocking request.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod historics_preview;
pub mod http;
pub mod request;
pub mod response;
pub mod types;

pub use auth::Credentials;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use historics_preview::HistoricsPreview;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::{ApiEndpoint, Headers, PartialRequest, USER_AGENT};
pub use response::{normalize, ApiResponse, ListResponse, NoopMapper, OutputMapper, Response};
pub use types::PreviewCreate;
