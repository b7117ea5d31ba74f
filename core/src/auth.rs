//! API credentials and request signing.

use std::collections::BTreeMap;
use std::fmt;

use crate::http::set_header;

/// Name of the header carrying the credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// A DataSift username and API key pair.
///
/// Every request is signed with `Authorization: <user>:<api_key>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    api_key: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            api_key: api_key.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{}:{}", self.user, self.api_key)
    }

    /// Sign a fully merged header set. Replaces any caller-supplied
    /// `Authorization` header, whatever its case.
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        set_header(headers, AUTHORIZATION, &self.authorization());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_joins_user_and_key() {
        let credentials = Credentials::new("alice", "0123abcd");
        assert_eq!(credentials.authorization(), "alice:0123abcd");
    }

    #[test]
    fn apply_overwrites_existing_header() {
        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION.to_string(), "mallory:nope".to_string());
        Credentials::new("alice", "0123abcd").apply(&mut headers);
        assert_eq!(headers[AUTHORIZATION], "alice:0123abcd");
    }

    #[test]
    fn apply_replaces_lowercase_header() {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), "mallory:nope".to_string());
        Credentials::new("alice", "0123abcd").apply(&mut headers);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[AUTHORIZATION], "alice:0123abcd");
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", Credentials::new("alice", "0123abcd"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("0123abcd"));
    }
}
