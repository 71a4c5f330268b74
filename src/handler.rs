//! Handler trait and type erasure.
//!
//! A [`RouteController`](crate::RouteController) keeps handlers of different
//! concrete types in one `HashMap<Method, BoxedHandler>`, and the dispatch
//! table keeps controllers and synthesized responders side by side in one
//! radix tree. Both rely on the same trick: every handler is hidden behind
//! the `ErasedHandler` trait object.
//!
//! ```text
//! async fn list(req: Request) -> Response { … }    ← user writes this
//!        ↓ controller.add_handler(Method::Get, list)
//! list.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(list))                        ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! The small synthesized responders (the `Allow` responder, the 405 and 404
//! handlers, the trailing-slash redirect) are wrapped in `Responder`, which
//! implements `ErasedHandler` directly and never passes through the public
//! [`Handler`] trait. The endpoint index, heartbeat, version and stats routes
//! are ordinary `GET` controllers built through [`Handler`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// A handler that needs nothing from the request and builds its response
/// synchronously. Used for the synthesized responders.
pub(crate) struct Responder<F>(pub(crate) F);

impl<F> ErasedHandler for Responder<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn call(&self, req: Request) -> BoxFuture {
        let res = (self.0)(&req);
        Box::pin(async move { res })
    }
}

/// Boxes a synchronous responder.
pub(crate) fn responder<F>(f: F) -> BoxedHandler
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    Arc::new(Responder(f))
}
