//! # trellis
//!
//! A small HTTP service scaffold. You write the handlers; trellis does the
//! parts every JSON service repeats.
//!
//! What you get for free on every route:
//!
//! - **`HEAD` / `OPTIONS`** — answered with an `Allow` header
//! - **`405 Method Not Allowed`** — JSON error plus `Allow` for unregistered methods
//! - **`404`** — JSON error for any path nobody registered
//!
//! And on every service:
//!
//! - **`/`** — a sorted index of every endpoint and its methods
//! - **`/heartbeat`, `/version`** — build metadata (override `/version` by registering it)
//! - **`/stats`** — request counters
//!
//! Path matching is [`matchit`]'s radix tree; the transport is hyper on tokio.
//! List endpoints get offset-based [`pagination`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use trellis::{Method, Request, Response, RouteController, Server, Service, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trellis::Error> {
//!     let config = ServiceConfig::from_env();
//!     trellis::logging::init(&config);
//!
//!     let users = RouteController::new("/users")
//!         .on(Method::Get, list_users)?
//!         .on(Method::Post, create_user)?;
//!
//!     let addr = config.listen_addr.clone();
//!     let table = Service::new(config).controller(users).build_dispatch_table()?;
//!     Server::bind(&addr)?.serve(table).await
//! }
//!
//! async fn list_users(_req: Request) -> Response {
//!     Response::json(b"[]".to_vec())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     Response::json(req.body().to_vec())
//! }
//! ```

mod config;
mod controller;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod service;
mod stats;
mod status;
mod version;

pub mod logging;
pub mod pagination;

pub use config::{ServiceConfig, ROOT_PATH};
pub use controller::RouteController;
pub use error::{Error, Result};
pub use handler::{BoxFuture, Handler};
#[doc(hidden)]
pub use handler::{BoxedHandler, ErasedHandler};
pub use method::Method;
pub use request::{DecodeError, QueryParams, Request};
pub use response::{ContentType, IntoResponse, Message, Response, ResponseBuilder};
pub use router::DispatchTable;
pub use server::Server;
pub use service::{EndpointDescriptor, Service};
pub use stats::{Stats, StatsSnapshot};
pub use status::Status;
pub use version::{BuildInfo, DEFAULT_BUILD_DATE, DEFAULT_BUILD_TAG};
