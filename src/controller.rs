//! Per-route method dispatch.
//!
//! A [`RouteController`] owns every method handler for one path. It answers
//! `HEAD` and `OPTIONS` itself, and turns any method it has no handler for
//! into a `405 Method Not Allowed` carrying the `Allow` header.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::error;

use crate::error::{Error, Result};
use crate::handler::{responder, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The method handlers for one route.
///
/// ```rust
/// use trellis::{Method, Request, Response, RouteController};
///
/// async fn list(_req: Request) -> Response { Response::json(b"[]".to_vec()) }
/// async fn create(_req: Request) -> Response { Response::json(b"{}".to_vec()) }
///
/// let users = RouteController::new("/users")
///     .on(Method::Get, list)?
///     .on(Method::Post, create)?;
/// assert_eq!(users.allowed_methods(), "GET,HEAD,OPTIONS,POST");
/// # Ok::<(), trellis::Error>(())
/// ```
pub struct RouteController {
    path: String,
    handlers: HashMap<Method, BoxedHandler>,
    // Reset on every mutation; filled on the next read.
    allowed: OnceLock<String>,
}

impl RouteController {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handlers: HashMap::new(),
            allowed: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Registers `handler` for `method`, replacing any earlier handler.
    ///
    /// `HEAD` and `OPTIONS` are rejected: the controller provides them.
    pub fn add_handler(&mut self, method: Method, handler: impl Handler) -> Result<&mut Self> {
        if method.is_reserved() {
            error!(route = %self.path, %method, "refusing to register a reserved method");
            return Err(Error::ReservedMethod(method));
        }
        self.handlers.insert(method, handler.into_boxed_handler());
        self.allowed = OnceLock::new();
        Ok(self)
    }

    /// [`add_handler`](Self::add_handler) keyed by numeric method id.
    pub fn add_handler_by_id(&mut self, id: u8, handler: impl Handler) -> Result<&mut Self> {
        let Some(method) = Method::from_id(id) else {
            error!(route = %self.path, id, "method id not recognised");
            return Err(Error::UnknownMethod(id));
        };
        self.add_handler(method, handler)
    }

    /// Owned, chainable form of [`add_handler`](Self::add_handler).
    pub fn on(mut self, method: Method, handler: impl Handler) -> Result<Self> {
        self.add_handler(method, handler)?;
        Ok(self)
    }

    /// Registered methods plus `HEAD` and `OPTIONS`, sorted and
    /// comma-joined, e.g. `"GET,HEAD,OPTIONS,POST"`.
    pub fn allowed_methods(&self) -> &str {
        self.allowed.get_or_init(|| {
            let mut names: Vec<&str> = self.handlers.keys()
                .map(|m| m.as_str())
                .chain([Method::Head.as_str(), Method::Options.as_str()])
                .collect();
            names.sort_unstable();
            names.join(",")
        })
    }

    /// Picks the handler for a request method.
    ///
    /// `None` stands for a method outside the known set; it is treated like
    /// any other method without a handler.
    pub fn resolve(&self, method: Option<Method>) -> BoxedHandler {
        let allowed = self.allowed_methods().to_owned();

        match method {
            Some(m) if m.is_reserved() => responder(move |_| {
                Response::builder()
                    .status(Status::Ok)
                    .header("allow", &allowed)
                    .header("content-length", "0")
                    .no_body()
            }),
            Some(m) if self.handlers.contains_key(&m) => Arc::clone(&self.handlers[&m]),
            _ => responder(move |_| method_not_allowed(&allowed)),
        }
    }

    /// Routes a request to the handler for its method.
    pub fn dispatch(&self, req: Request) -> BoxFuture {
        let method = req.method().parse::<Method>().ok();
        self.resolve(method).call(req)
    }
}

fn method_not_allowed(allowed: &str) -> Response {
    let mut res = Response::error(
        Status::MethodNotAllowed,
        format!("405 Method Not Allowed. Allowed: {allowed}"),
    );
    res.headers.push(("allow".to_owned(), allowed.to_owned()));
    res
}

impl fmt::Debug for RouteController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteController")
            .field("path", &self.path)
            .field("allowed", &self.allowed_methods())
            .finish()
    }
}

/// A shared controller mounted in the dispatch table.
pub(crate) struct Dispatcher(pub(crate) Arc<RouteController>);

impl ErasedHandler for Dispatcher {
    fn call(&self, req: Request) -> BoxFuture {
        self.0.dispatch(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_handler(_req: Request) -> Response {
        Response::text("dummy for GET")
    }

    async fn post_handler(_req: Request) -> Response {
        Response::builder().status(Status::Created).text("dummy for POST")
    }

    fn get_post() -> RouteController {
        RouteController::new("/dummyRoute")
            .on(Method::Get, get_handler).unwrap()
            .on(Method::Post, post_handler).unwrap()
    }

    #[test]
    fn test_should_sort_allowed_methods() {
        assert_eq!(get_post().allowed_methods(), "GET,HEAD,OPTIONS,POST");
        assert_eq!(RouteController::new("/empty").allowed_methods(), "HEAD,OPTIONS");
    }

    #[test]
    fn test_should_refresh_allowed_methods_after_registration() {
        let mut rc = get_post();
        assert_eq!(rc.allowed_methods(), "GET,HEAD,OPTIONS,POST");
        rc.add_handler(Method::Delete, get_handler).unwrap();
        assert_eq!(rc.allowed_methods(), "DELETE,GET,HEAD,OPTIONS,POST");
    }

    #[test]
    fn test_should_reject_reserved_methods() {
        let mut rc = RouteController::new("/x");
        assert!(matches!(
            rc.add_handler(Method::Head, get_handler),
            Err(Error::ReservedMethod(Method::Head))
        ));
        assert!(matches!(
            rc.add_handler(Method::Options, get_handler),
            Err(Error::ReservedMethod(Method::Options))
        ));
        assert!(matches!(
            rc.add_handler_by_id(Method::Head.id(), get_handler),
            Err(Error::ReservedMethod(Method::Head))
        ));
        assert_eq!(rc.allowed_methods(), "HEAD,OPTIONS");
    }

    #[test]
    fn test_should_reject_unknown_method_id() {
        let mut rc = RouteController::new("/x");
        assert!(matches!(rc.add_handler_by_id(42, get_handler), Err(Error::UnknownMethod(42))));
        rc.add_handler_by_id(Method::Put.id(), get_handler).unwrap();
        assert_eq!(rc.allowed_methods(), "HEAD,OPTIONS,PUT");
    }

    #[tokio::test]
    async fn test_should_answer_head_and_options_with_allow_header() {
        let rc = get_post();
        for method in ["HEAD", "OPTIONS"] {
            let res = rc.dispatch(Request::new(method, "/dummyRoute")).await;
            assert_eq!(res.status_code(), 200);
            assert_eq!(res.header("Allow"), Some("GET,HEAD,OPTIONS,POST"));
            assert_eq!(res.header("Content-Length"), Some("0"));
            assert!(res.body().is_empty());
        }
    }

    #[tokio::test]
    async fn test_should_pass_registered_method_to_handler() {
        let rc = get_post();
        let res = rc.dispatch(Request::new("POST", "/dummyRoute")).await;
        assert_eq!(res.status_code(), 201);
        assert_eq!(res.body(), b"dummy for POST");
    }

    #[tokio::test]
    async fn test_should_answer_unregistered_method_with_405() {
        let rc = get_post();
        let res = rc.dispatch(Request::new("PUT", "/dummyRoute")).await;
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.header("allow"), Some("GET,HEAD,OPTIONS,POST"));
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "405 Method Not Allowed. Allowed: GET,HEAD,OPTIONS,POST"})
        );
    }

    #[tokio::test]
    async fn test_should_answer_unknown_method_with_405_not_options() {
        let rc = get_post();
        let res = rc.dispatch(Request::new("BREW", "/dummyRoute")).await;
        assert_eq!(res.status_code(), 405);
        assert!(!res.body().is_empty());
    }

    #[tokio::test]
    async fn test_should_let_last_registration_win() {
        let mut rc = RouteController::new("/x");
        rc.add_handler(Method::Get, get_handler).unwrap();
        rc.add_handler(Method::Get, post_handler).unwrap();
        let res = rc.dispatch(Request::new("GET", "/x")).await;
        assert_eq!(res.body(), b"dummy for POST");
        assert_eq!(rc.allowed_methods(), "GET,HEAD,OPTIONS");
    }
}
