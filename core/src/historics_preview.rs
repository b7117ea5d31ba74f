//! Historics preview resource.
//!
//! A preview runs a CSDL filter over a sample of historic data and produces
//! summary statistics. Preview results expire on the server 24 hours after
//! creation; this client does not track that, a stale id simply yields the
//! server's error.

use crate::error::{Error, Result};
use crate::request::PartialRequest;
use crate::response::ApiResponse;
use crate::types::PreviewCreate;

/// Client for the `preview/*` endpoints.
#[derive(Debug, Clone)]
pub struct HistoricsPreview {
    request: PartialRequest,
}

impl HistoricsPreview {
    pub fn new(request: &PartialRequest) -> Self {
        Self {
            request: request.with_prefix(["preview"]),
        }
    }

    /// Create a historics preview job.
    ///
    /// `stream` is the hash of the CSDL filter, `start` and `end` are Unix
    /// timestamps. When `end` is omitted the server picks
    /// `min(start + 24h, now - 1h)`.
    ///
    /// Fails with `Error::SourcesRequired` before any network call when
    /// `sources` is empty.
    pub fn create<P, S>(
        &self,
        stream: &str,
        start: i64,
        parameters: &[P],
        sources: &[S],
        end: Option<i64>,
    ) -> Result<ApiResponse>
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        if sources.is_empty() {
            return Err(Error::SourcesRequired);
        }

        let body = PreviewCreate {
            hash: stream.to_string(),
            start,
            sources: join(sources),
            parameters: join(parameters),
            end,
        };
        self.request.json("create", &body)
    }

    /// Retrieve a historics preview job by id.
    pub fn get(&self, preview_id: &str) -> Result<ApiResponse> {
        self.request.get("get", &[("id", preview_id)], None)
    }
}

fn join<T: AsRef<str>>(items: &[T]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::Credentials;
    use crate::http::testing::RecordingTransport;
    use crate::http::HttpMethod;
    use serde_json::{json, Value};

    const HASH: &str = "2459b03a13577579bca76471778a5c3d";

    fn preview(transport: Arc<RecordingTransport>) -> HistoricsPreview {
        let root = PartialRequest::new(Credentials::new("alice", "0123abcd"), transport);
        HistoricsPreview::new(&root)
    }

    #[test]
    fn create_posts_joined_lists() {
        let transport = Arc::new(RecordingTransport::new(
            202,
            r#"{"id": "e25d533cf287ec44fe66e8362b61961f"}"#,
        ));
        let response = preview(transport.clone())
            .create(
                HASH,
                1_400_000_000,
                &["interaction.author.link,targetVol,hour", "language.tag,freqDist,10"],
                &["twitter", "facebook"],
                None,
            )
            .unwrap();
        assert_eq!(response.status_code(), 202);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "https://api.datasift.com/v1.1/preview/create");
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "hash": HASH,
                "start": 1_400_000_000,
                "sources": "twitter,facebook",
                "parameters": "interaction.author.link,targetVol,hour,language.tag,freqDist,10",
            })
        );
    }

    #[test]
    fn create_includes_end_when_given() {
        let transport = Arc::new(RecordingTransport::new(202, "{}"));
        preview(transport.clone())
            .create(
                HASH,
                1_400_000_000,
                &["language.tag,freqDist,10"],
                &["twitter"],
                Some(1_400_003_600),
            )
            .unwrap();

        let requests = transport.requests();
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["end"], 1_400_003_600);
    }

    #[test]
    fn create_without_sources_makes_no_request() {
        let transport = Arc::new(RecordingTransport::new(202, "{}"));
        let sources: [&str; 0] = [];
        let err = preview(transport.clone())
            .create(HASH, 1_400_000_000, &["language.tag,freqDist,10"], &sources, None)
            .unwrap_err();

        assert!(matches!(err, Error::SourcesRequired));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn get_sends_id_as_query_param() {
        let transport = Arc::new(RecordingTransport::new(
            200,
            r#"{"id": "abc", "status": "running", "progress": 40}"#,
        ));
        let response = preview(transport.clone()).get("abc").unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.datasift.com/v1.1/preview/get");
        assert_eq!(request.query, vec![("id".to_string(), "abc".to_string())]);
        assert_eq!(request.header("Authorization"), Some("alice:0123abcd"));
        assert_eq!(response.as_object().and_then(|r| r.get("progress")), Some(&json!(40)));
    }

    #[test]
    fn get_unknown_id_surfaces_api_error() {
        let transport = Arc::new(RecordingTransport::new(404, r#"{"error": "Preview not found"}"#));
        let err = preview(transport).get("stale").unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(matches!(err, Error::Api(_)));
    }
}
