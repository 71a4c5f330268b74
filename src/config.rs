//! Service configuration.
//!
//! Everything has a default; [`ServiceConfig::from_env`] overrides fields
//! from environment variables.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::BuildInfo;

/// Path of the self-describing endpoint index.
pub const ROOT_PATH: &str = "/";

/// Configuration injected into a [`Service`](crate::Service) at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Bind address for [`Server::bind`](crate::Server::bind).
    pub listen_addr: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Heartbeat endpoint, always mounted.
    pub heartbeat_path: String,
    /// Default version endpoint, mounted unless a controller claims it.
    pub version_path: String,
    /// Request statistics endpoint; `None` disables it.
    pub stats_path: Option<String>,
    /// Served by the heartbeat and version endpoints.
    pub build: BuildInfo,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_owned(),
            log_level: "info".to_owned(),
            heartbeat_path: "/heartbeat".to_owned(),
            version_path: "/version".to_owned(),
            stats_path: Some("/stats".to_owned()),
            build: BuildInfo::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// `LISTEN_ADDR`, `LOG_LEVEL`, `HEARTBEAT_ROUTE`, `VERSION_ROUTE`,
    /// `STATS_ROUTE` (empty disables), `BUILD_TAG`, `BUILD_DATE`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("LISTEN_ADDR") {
            config.listen_addr = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("HEARTBEAT_ROUTE") {
            config.heartbeat_path = v;
        }
        if let Ok(v) = std::env::var("VERSION_ROUTE") {
            config.version_path = v;
        }
        if let Ok(v) = std::env::var("STATS_ROUTE") {
            config.stats_path = Some(v).filter(|p| !p.is_empty());
        }
        if let Ok(v) = std::env::var("BUILD_TAG") {
            config.build.build = v;
        }
        if let Ok(v) = std::env::var("BUILD_DATE") {
            config.build.build_date = v;
        }

        config
    }

    /// Every configured path must be absolute and must not shadow the index.
    pub fn validate(&self) -> Result<()> {
        let paths = [Some(&self.heartbeat_path), Some(&self.version_path), self.stats_path.as_ref()];
        for path in paths.into_iter().flatten() {
            if !path.starts_with('/') {
                return Err(Error::Config(format!("route `{path}` must start with `/`")));
            }
            if path == ROOT_PATH {
                return Err(Error::Config(format!("route `{path}` is reserved for the endpoint index")));
            }
        }
        Ok(())
    }
}
