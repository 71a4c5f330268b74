//! Service composition: caller controllers plus synthesized defaults.
//!
//! # Precedence
//!
//! [`Service::build_dispatch_table`] mounts routes in this order, and the
//! first route to claim a path keeps it:
//!
//! 1. caller controllers, in the order they were added;
//! 2. the stats endpoint (if enabled) and the heartbeat endpoint;
//! 3. operational endpoints added with [`Service::add_operational_endpoint`];
//! 4. the default version endpoint — only when no controller owns the
//!    version path;
//! 5. the endpoint index at `/` — only when no controller owns `/`;
//! 6. the catch-all 404, consulted only when no route matches at all.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ServiceConfig, ROOT_PATH};
use crate::controller::{Dispatcher, RouteController};
use crate::error::Result;
use crate::handler::{responder, BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::DispatchTable;
use crate::stats::Stats;
use crate::status::Status;

/// One entry of the self-describing index served at `/`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub href: String,
    pub methods: String,
}

impl EndpointDescriptor {
    pub fn new(href: impl Into<String>, methods: impl Into<String>) -> Self {
        Self { href: href.into(), methods: methods.into() }
    }
}

/// An opaque handler mounted as-is, e.g. a profiling hook.
struct Operational {
    path: String,
    methods: String,
    handler: BoxedHandler,
}

/// A web service: an ordered collection of route controllers.
///
/// ```rust
/// use trellis::{Method, Request, Response, RouteController, Service, ServiceConfig};
///
/// async fn list(_req: Request) -> Response { Response::json(b"[]".to_vec()) }
///
/// let mut service = Service::new(ServiceConfig::default());
/// service.add_controller(RouteController::new("/users").on(Method::Get, list)?);
/// let table = service.build_dispatch_table()?;
/// assert!(table.endpoints().iter().any(|e| e.href == "/users"));
/// # Ok::<(), trellis::Error>(())
/// ```
pub struct Service {
    config: ServiceConfig,
    controllers: Vec<Arc<RouteController>>,
    operational: Vec<Operational>,
}

impl Service {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config, controllers: Vec::new(), operational: Vec::new() }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Appends a controller. Controllers added earlier win path collisions.
    pub fn add_controller(&mut self, controller: RouteController) -> &mut Self {
        self.controllers.push(Arc::new(controller));
        self
    }

    /// Owned, chainable form of [`add_controller`](Self::add_controller).
    pub fn controller(mut self, controller: RouteController) -> Self {
        self.add_controller(controller);
        self
    }

    /// Mounts an opaque handler that receives every method on `path`.
    ///
    /// `methods` only feeds the endpoint index; the handler itself decides
    /// what to do with each request.
    pub fn add_operational_endpoint(
        &mut self,
        path: impl Into<String>,
        methods: &[Method],
        handler: impl Handler,
    ) -> &mut Self {
        let mut names: Vec<&str> = methods.iter().map(|m| m.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        self.operational.push(Operational {
            path: path.into(),
            methods: names.join(","),
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// Whether a caller controller or operational endpoint is registered at
    /// exactly `path`.
    fn claims(&self, path: &str) -> bool {
        self.controllers.iter().any(|rc| rc.path() == path)
            || self.operational.iter().any(|op| op.path == path)
    }

    /// Builds the routing table from the current controllers.
    ///
    /// Takes `&self` and may be called any number of times; each call
    /// produces a fresh table with its own statistics. Fails only on
    /// invalid configuration or route syntax.
    pub fn build_dispatch_table(&self) -> Result<DispatchTable> {
        self.config.validate()?;

        let root_seen = self.claims(ROOT_PATH);
        let version_seen = self.claims(&self.config.version_path);

        let stats = Arc::new(Stats::new());
        let mut table = DispatchTable::new(responder(not_found), Arc::clone(&stats));
        let mut links = Vec::new();

        for rc in &self.controllers {
            let handler: BoxedHandler = Arc::new(Dispatcher(Arc::clone(rc)));
            mount(&mut table, &mut links, rc.path(), rc.allowed_methods(), handler)?;
        }

        if let Some(path) = &self.config.stats_path {
            let stats = Arc::clone(&stats);
            let rc = RouteController::new(path.as_str()).on(Method::Get, move |_req: Request| {
                let snapshot = stats.snapshot();
                async move { Response::json_value(Status::Ok, &snapshot) }
            })?;
            mount_controller(&mut table, &mut links, rc)?;
        }

        let heartbeat = version_controller(&self.config.heartbeat_path, &self.config)?;
        mount_controller(&mut table, &mut links, heartbeat)?;

        for op in &self.operational {
            mount(&mut table, &mut links, &op.path, &op.methods, Arc::clone(&op.handler))?;
        }

        if !version_seen {
            let version = version_controller(&self.config.version_path, &self.config)?;
            mount_controller(&mut table, &mut links, version)?;
        }

        links.sort();

        if !root_seen {
            let index: Arc<[EndpointDescriptor]> = links.clone().into();
            let rc = RouteController::new(ROOT_PATH).on(Method::Get, move |_req: Request| {
                let index = Arc::clone(&index);
                async move { Response::json_value(Status::Ok, &*index) }
            })?;
            if !table.insert(ROOT_PATH, Arc::new(Dispatcher(Arc::new(rc))))? {
                warn!(route = ROOT_PATH, "root already routed, endpoint index not mounted");
            }
        }

        info!(routes = links.len(), index = !root_seen, "dispatch table built");
        table.set_endpoints(links);
        Ok(table)
    }
}

impl Default for Service {
    fn default() -> Self { Self::new(ServiceConfig::default()) }
}

/// Mounts a handler and lists it in the index, unless an earlier route owns
/// the path.
fn mount(
    table: &mut DispatchTable,
    links: &mut Vec<EndpointDescriptor>,
    path: &str,
    methods: &str,
    handler: BoxedHandler,
) -> Result<()> {
    if table.insert(path, handler)? {
        links.push(EndpointDescriptor::new(path, methods));
    } else {
        warn!(route = path, "route already registered, keeping the first");
    }
    Ok(())
}

fn mount_controller(
    table: &mut DispatchTable,
    links: &mut Vec<EndpointDescriptor>,
    rc: RouteController,
) -> Result<()> {
    let rc = Arc::new(rc);
    let handler: BoxedHandler = Arc::new(Dispatcher(Arc::clone(&rc)));
    mount(table, links, rc.path(), rc.allowed_methods(), handler)
}

/// `GET` controller serving the build metadata.
fn version_controller(path: &str, config: &ServiceConfig) -> Result<RouteController> {
    let build = config.build.clone();
    RouteController::new(path).on(Method::Get, move |_req: Request| {
        let build = build.clone();
        async move { Response::json_value(Status::Ok, &build) }
    })
}

fn not_found(req: &Request) -> Response {
    Response::error(Status::NotFound, format!("{} not found", req.path()))
}
