//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. stops accepting new connections;
//! 2. lets every in-flight connection task run to completion;
//! 3. returns from [`Server::serve`], which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;
use crate::router::DispatchTable;
use crate::status::Status;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use trellis::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<(), trellis::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid socket address `{addr}`: {e}")))?;
        Ok(Self { addr })
    }

    /// Serves `table` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections.
    pub async fn serve(self, table: DispatchTable) -> Result<()> {
        self.serve_with_shutdown(table, shutdown_signal()).await
    }

    /// Serves `table` until `signal` resolves, then drains in-flight
    /// connections.
    pub async fn serve_with_shutdown(
        self,
        table: DispatchTable,
        signal: impl Future<Output = ()>,
    ) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_listener(listener, table, signal).await
    }

    /// Serves `table` on an already bound `listener` until `signal` resolves.
    ///
    /// Binding first lets the caller learn the real address of an
    /// ephemeral port:
    ///
    /// ```rust,no_run
    /// # async fn run(table: trellis::DispatchTable) -> Result<(), trellis::Error> {
    /// let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    /// let addr = listener.local_addr()?;
    /// trellis::Server::serve_listener(listener, table, std::future::pending()).await
    /// # }
    /// ```
    pub async fn serve_listener(
        listener: TcpListener,
        table: DispatchTable,
        signal: impl Future<Output = ()>,
    ) -> Result<()> {
        let table = Arc::new(table);

        info!(addr = %listener.local_addr()?, "trellis listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting even when
                // more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let table = Arc::clone(&table);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let table = Arc::clone(&table);
                            async move { dispatch(table, req).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("trellis stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. Never fails: every problem
/// becomes an HTTP response.
async fn dispatch(
    table: Arc<DispatchTable>,
    req: hyper::Request<hyper::body::Incoming>,
) -> std::result::Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(path = parts.uri.path(), "failed to read request body: {e}");
            return Ok(Response::error(Status::BadRequest, "failed to read request body").into_inner());
        }
    };

    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = Request::new(parts.method.as_str(), target).with_body(body.to_vec());
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    Ok(table.handle(request).await.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
