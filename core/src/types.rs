//! Request payloads for the DataSift API.

use serde::{Deserialize, Serialize};

/// Body of `POST preview/create`.
///
/// `sources` and `parameters` are comma-joined lists, as the API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewCreate {
    pub hash: String,
    pub start: i64,
    pub sources: String,
    pub parameters: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}
