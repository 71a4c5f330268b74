//! Incoming HTTP request type.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

/// An incoming HTTP request, as handed to a handler.
///
/// The server builds one per hyper request. Tests and tools can build one
/// directly with [`Request::new`]:
///
/// ```rust
/// use trellis::Request;
///
/// let req = Request::new("GET", "/users?limit=10&offset=20")
///     .with_header("accept", "application/json");
/// assert_eq!(req.path(), "/users");
/// assert_eq!(req.query_params().get("limit"), Some("10"));
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// `target` is the request target: a path, optionally followed by `?query`.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        Self {
            method: method.into(),
            path,
            query,
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decoded query string. Parsed on every call; handlers that need it
    /// more than once should keep the result.
    pub fn query_params(&self) -> QueryParams {
        QueryParams::parse(self.query.as_deref().unwrap_or(""))
    }

    /// Deserializes the body according to the request's `Content-Type`.
    ///
    /// Only `application/json` (with or without parameters such as
    /// `charset`) is understood.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let content_type = self.header("content-type").map(str::trim).unwrap_or("");
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence {
            "" => Err(DecodeError::ContentTypeUndefined),
            e if e.eq_ignore_ascii_case("application/json") => {
                Ok(serde_json::from_slice(&self.body)?)
            }
            _ => Err(DecodeError::NotImplemented(content_type.to_owned())),
        }
    }
}

/// Failure to decode a request body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Content-Type is undefined")]
    ContentTypeUndefined,

    #[error("decoding {0} is not implemented")]
    NotImplemented(String),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

// ── QueryParams ───────────────────────────────────────────────────────────────

/// Percent-decoded query string pairs, in the order they appeared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `name`. An empty value counts as absent, so
    /// `?limit=` behaves like no `limit` at all.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let pairs = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { pairs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct CreateUser {
        name: String,
    }

    #[test]
    fn test_should_split_path_and_query() {
        let req = Request::new("GET", "/users?per_page=10&page=2");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query(), Some("per_page=10&page=2"));

        let req = Request::new("GET", "/users");
        assert_eq!(req.query(), None);
        assert!(req.query_params().is_empty());
    }

    #[test]
    fn test_should_decode_query_and_treat_empty_as_absent() {
        let q = QueryParams::parse("name=a%20b&limit=&offset=5&offset=10");
        assert_eq!(q.get("name"), Some("a b"));
        assert_eq!(q.get("limit"), None);
        assert_eq!(q.get("offset"), Some("5"));
        assert_eq!(q.get("missing"), None);
    }

    #[test]
    fn test_should_look_up_headers_case_insensitively() {
        let req = Request::new("GET", "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_should_decode_json_body() {
        let req = Request::new("POST", "/users")
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"name":"alice"}"#);
        let user: CreateUser = req.decode_json().unwrap();
        assert_eq!(user, CreateUser { name: "alice".to_owned() });
    }

    #[test]
    fn test_should_reject_body_without_content_type() {
        let req = Request::new("POST", "/users").with_body(r#"{"name":"alice"}"#);
        let err = req.decode_json::<CreateUser>().unwrap_err();
        assert!(matches!(err, DecodeError::ContentTypeUndefined));
    }

    #[test]
    fn test_should_reject_unsupported_content_type() {
        let req = Request::new("POST", "/users")
            .with_header("content-type", "application/xml")
            .with_body("<user/>");
        let err = req.decode_json::<CreateUser>().unwrap_err();
        assert!(matches!(err, DecodeError::NotImplemented(ref ct) if ct == "application/xml"));
    }

    #[test]
    fn test_should_report_malformed_json() {
        let req = Request::new("POST", "/users")
            .with_header("content-type", "application/json")
            .with_body("{");
        assert!(matches!(req.decode_json::<CreateUser>(), Err(DecodeError::Json(_))));
    }
}
