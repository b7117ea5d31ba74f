//! Response wrappers and the response normalizer.
//!
//! # Design
//! `normalize` is the only place that interprets an `HttpResponse`. The
//! decision order is fixed: 204 short-circuits to an empty object, then the
//! body must decode, then an `error` member wins over everything else, then
//! error statuses, and only then the payload shape picks `Object` or `List`.
//!
//! Both wrappers keep a `raw` copy of the decoded payload. For objects the
//! primary view is handed to an `OutputMapper` afterwards; `raw` is never
//! touched by it.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::http::{find_header, HttpResponse};

/// Post-processing applied to object-shaped responses, keyed by the prefix
/// of the issuing request (e.g. `preview`) and the endpoint (e.g. `get`).
pub trait OutputMapper: Send + Sync {
    fn map(&self, prefix: Option<&str>, endpoint: &str, data: &mut Map<String, Value>);
}

/// Leaves every payload as the server sent it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMapper;

impl OutputMapper for NoopMapper {
    fn map(&self, _prefix: Option<&str>, _endpoint: &str, _data: &mut Map<String, Value>) {}
}

impl<F> OutputMapper for F
where
    F: Fn(Option<&str>, &str, &mut Map<String, Value>) + Send + Sync,
{
    fn map(&self, prefix: Option<&str>, endpoint: &str, data: &mut Map<String, Value>) {
        self(prefix, endpoint, data)
    }
}

/// An object-shaped API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status_code: u16,
    headers: Vec<(String, String)>,
    data: Map<String, Value>,
    raw: Map<String, Value>,
}

impl Response {
    /// Wrap `data`, keeping a copy of it as the raw payload.
    pub fn new(status_code: u16, headers: Vec<(String, String)>, data: Map<String, Value>) -> Self {
        Self {
            status_code,
            headers,
            raw: data.clone(),
            data,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The payload after output mapping.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The payload exactly as the server sent it.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    fn apply_mapper(&mut self, mapper: &dyn OutputMapper, prefix: Option<&str>, endpoint: &str) {
        mapper.map(prefix, endpoint, &mut self.data);
    }
}

/// A list-shaped API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse {
    status_code: u16,
    headers: Vec<(String, String)>,
    items: Vec<Value>,
    raw: Vec<Value>,
}

impl ListResponse {
    pub fn new(status_code: u16, headers: Vec<(String, String)>, items: Vec<Value>) -> Self {
        Self {
            status_code,
            headers,
            raw: items.clone(),
            items,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn raw(&self) -> &[Value] {
        &self.raw
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ListResponse {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ListResponse {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A successfully normalized response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Object(Response),
    List(ListResponse),
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiResponse::Object(response) => response.status_code(),
            ApiResponse::List(response) => response.status_code(),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        match self {
            ApiResponse::Object(response) => response.headers(),
            ApiResponse::List(response) => response.headers(),
        }
    }

    pub fn as_object(&self) -> Option<&Response> {
        match self {
            ApiResponse::Object(response) => Some(response),
            ApiResponse::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListResponse> {
        match self {
            ApiResponse::List(response) => Some(response),
            ApiResponse::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<Response> {
        match self {
            ApiResponse::Object(response) => Some(response),
            ApiResponse::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<ListResponse> {
        match self {
            ApiResponse::List(response) => Some(response),
            ApiResponse::Object(_) => None,
        }
    }
}

/// Turn a raw transport response into an `ApiResponse` or an `Error`.
///
/// `prefix` and `endpoint` identify the issuing request and select the
/// output mapping for object payloads.
pub fn normalize(
    response: HttpResponse,
    prefix: Option<&str>,
    endpoint: &str,
    mapper: &dyn OutputMapper,
) -> Result<ApiResponse> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    if status == 204 {
        return Ok(ApiResponse::Object(Response::new(status, headers, Map::new())));
    }

    let payload: Value = serde_json::from_str(&body).map_err(Error::Decode)?;

    if let Value::Object(data) = &payload {
        if data.contains_key("error") {
            if status == 401 {
                return Err(Error::Auth(payload));
            }
            let data = data.clone();
            return Err(Error::Api(Box::new(Response::new(status, headers, data))));
        }
    }

    if status >= 400 {
        return Err(Error::Http { status, body });
    }

    match payload {
        Value::Object(data) => {
            let mut response = Response::new(status, headers, data);
            response.apply_mapper(mapper, prefix, endpoint);
            Ok(ApiResponse::Object(response))
        }
        Value::Array(items) => Ok(ApiResponse::List(ListResponse::new(status, headers, items))),
        Value::Null => Err(Error::UnexpectedPayload("null")),
        Value::Bool(_) => Err(Error::UnexpectedPayload("boolean")),
        Value::Number(_) => Err(Error::UnexpectedPayload("number")),
        Value::String(_) => Err(Error::UnexpectedPayload("string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("X-API-Version".to_string(), "1.1".to_string())],
            body: body.to_string(),
        }
    }

    fn run(status: u16, body: &str) -> Result<ApiResponse> {
        normalize(response(status, body), Some("preview"), "get", &NoopMapper)
    }

    #[test]
    fn no_content_yields_empty_object() {
        let result = run(204, "").unwrap();
        let object = result.as_object().unwrap();
        assert_eq!(object.status_code(), 204);
        assert!(object.is_empty());
        assert_eq!(object.raw(), object.data());
    }

    #[test]
    fn error_with_401_is_auth_error() {
        let err = run(401, r#"{"error": "bad"}"#).unwrap_err();
        match err {
            Error::Auth(payload) => assert_eq!(payload, json!({"error": "bad"})),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn error_with_200_is_api_error() {
        let err = run(200, r#"{"error": "bad"}"#).unwrap_err();
        match err {
            Error::Api(response) => {
                assert_eq!(response.status_code(), 200);
                assert_eq!(response.get("error"), Some(&json!("bad")));
                assert_eq!(response.header("x-api-version"), Some("1.1"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn error_payload_takes_precedence_over_status() {
        let err = run(404, r#"{"error": "Preview not found"}"#).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[test]
    fn error_status_without_error_member_is_http_error() {
        let err = run(503, r#"{"message": "maintenance"}"#).unwrap_err();
        assert!(matches!(err, Error::Http { status: 503, .. }));
    }

    #[test]
    fn array_yields_list_response() {
        let result = run(200, "[1,2,3]").unwrap();
        let list = result.as_list().unwrap();
        assert_eq!(list.raw(), &[json!(1), json!(2), json!(3)]);
        let seen: Vec<i64> = list.iter().filter_map(Value::as_i64).collect();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn list_containing_error_string_is_not_an_error() {
        let result = run(200, r#"["error"]"#).unwrap();
        assert_eq!(result.as_list().map(ListResponse::len), Some(1));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = run(200, "{not json").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn malformed_body_with_error_status_is_decode_error() {
        let err = run(500, "<html>Internal Server Error</html>").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn scalar_payload_is_rejected() {
        let err = run(200, "42").unwrap_err();
        assert!(matches!(err, Error::UnexpectedPayload("number")));
    }

    #[test]
    fn mapper_changes_data_but_not_raw() {
        let mapper = |prefix: Option<&str>, endpoint: &str, data: &mut Map<String, Value>| {
            if prefix == Some("preview") && endpoint == "get" {
                data.insert("mapped".to_string(), json!(true));
            }
        };
        let result =
            normalize(response(200, r#"{"id": "abc"}"#), Some("preview"), "get", &mapper).unwrap();
        let object = result.into_object().unwrap();
        assert_eq!(object.get("mapped"), Some(&json!(true)));
        assert_eq!(object.raw().get("mapped"), None);
        assert_eq!(object.raw().get("id"), Some(&json!("abc")));
    }

    #[test]
    fn mapper_does_not_run_for_no_content() {
        let mapper = |_: Option<&str>, _: &str, data: &mut Map<String, Value>| {
            data.insert("mapped".to_string(), json!(true));
        };
        let result = normalize(response(204, ""), Some("preview"), "get", &mapper).unwrap();
        assert!(result.as_object().unwrap().is_empty());
    }
}
