//! The dispatch table: path → handler.
//!
//! One radix tree keyed by path; the method is resolved afterwards by the
//! owning [`RouteController`](crate::RouteController). Paths the tree does not
//! know fall through to the catch-all, which lives outside the tree so it can
//! never outrank a real route.
//!
//! A miss that would match with the trailing slash added or removed is
//! answered with `301 Moved Permanently` to the registered form instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use matchit::{InsertError, Router as MatchitRouter};
use tracing::debug;

use crate::error::{Error, Result};
use crate::config::ROOT_PATH;
use crate::handler::{responder, BoxedHandler};
use crate::request::Request;
use crate::response::Response;
use crate::service::EndpointDescriptor;
use crate::stats::Stats;
use crate::status::Status;

/// The final, immutable routing table produced by
/// [`Service::build_dispatch_table`](crate::Service::build_dispatch_table).
///
/// Share it behind an `Arc`; nothing in it changes after construction.
pub struct DispatchTable {
    routes: MatchitRouter<BoxedHandler>,
    fallback: BoxedHandler,
    endpoints: Vec<EndpointDescriptor>,
    stats: Arc<Stats>,
}

impl DispatchTable {
    pub(crate) fn new(fallback: BoxedHandler, stats: Arc<Stats>) -> Self {
        Self {
            routes: MatchitRouter::new(),
            fallback,
            endpoints: Vec::new(),
            stats,
        }
    }

    /// Mounts `handler` at `path`.
    ///
    /// Returns `Ok(false)` when an earlier route already owns an equivalent
    /// path; the earlier one keeps it.
    pub(crate) fn insert(&mut self, path: &str, handler: BoxedHandler) -> Result<bool> {
        match self.routes.insert(path, handler) {
            Ok(()) => Ok(true),
            Err(InsertError::Conflict { .. }) => Ok(false),
            Err(e) => Err(Error::InvalidRoute { path: path.to_owned(), reason: e.to_string() }),
        }
    }

    pub(crate) fn set_endpoints(&mut self, endpoints: Vec<EndpointDescriptor>) {
        self.endpoints = endpoints;
    }

    /// Finds the handler for `path`, falling back to a trailing-slash
    /// redirect and then to the catch-all. Never fails.
    pub fn lookup(&self, path: &str) -> (BoxedHandler, HashMap<String, String>) {
        if let Ok(matched) = self.routes.at(path) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return (Arc::clone(matched.value), params);
        }

        match self.slash_toggled(path) {
            Some(target) => (redirect(target), HashMap::new()),
            None => (Arc::clone(&self.fallback), HashMap::new()),
        }
    }

    /// `path` with its trailing slash added or removed, when that form is
    /// routed. The root has no alternative form.
    fn slash_toggled(&self, path: &str) -> Option<String> {
        if path == ROOT_PATH {
            return None;
        }
        let target = match path.strip_suffix('/') {
            Some(trimmed) => trimmed.to_owned(),
            None => format!("{path}/"),
        };
        self.routes.at(&target).is_ok().then_some(target)
    }

    /// Routes and runs one request, recording it in the table's statistics.
    pub async fn handle(&self, mut req: Request) -> Response {
        let started = Instant::now();
        let method = req.method().to_owned();
        let path = req.path().to_owned();

        let (handler, params) = self.lookup(&path);
        req.set_params(params);
        let res = handler.call(req).await;

        let elapsed = started.elapsed();
        self.stats.record(res.status_code(), elapsed);
        debug!(%method, %path, status = res.status_code(), elapsed_us = elapsed.as_micros() as u64, "request");
        res
    }

    /// Every mounted endpoint, sorted by `href`. The index route itself and
    /// the catch-all are not listed.
    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }
}

/// Permanent redirect to `target`, keeping the request's query string.
fn redirect(target: String) -> BoxedHandler {
    responder(move |req| {
        let location = match req.query().filter(|q| !q.is_empty()) {
            Some(q) => format!("{target}?{q}"),
            None => target.clone(),
        };
        Response::builder()
            .status(Status::MovedPermanently)
            .header("location", &location)
            .no_body()
    })
}
