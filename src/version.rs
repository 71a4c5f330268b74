//! Build metadata served by the version and heartbeat endpoints.
//!
//! Bake the values in at compile time and hand them to the service through
//! [`ServiceConfig`](crate::ServiceConfig):
//!
//! ```rust
//! use trellis::{BuildInfo, ServiceConfig};
//!
//! let config = ServiceConfig {
//!     build: BuildInfo::new(
//!         option_env!("BUILD_TAG").unwrap_or("dev"),
//!         option_env!("BUILD_DATE").unwrap_or("0001-01-01T00:00:00Z"),
//!     ),
//!     ..ServiceConfig::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// Build tag used when none is supplied.
pub const DEFAULT_BUILD_TAG: &str = "dev";

/// Build date used when none is supplied.
pub const DEFAULT_BUILD_DATE: &str = "0001-01-01T00:00:00Z";

/// The version payload: `{"build", "buildDate", "command"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Git hash of the build, or `"dev"`.
    pub build: String,
    /// ISO-8601 build timestamp, or the zero date.
    pub build_date: String,
    /// The name the process was invoked as.
    pub command: String,
}

impl BuildInfo {
    pub fn new(build: impl Into<String>, build_date: impl Into<String>) -> Self {
        Self {
            build: build.into(),
            build_date: build_date.into(),
            command: invocation_name(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_TAG, DEFAULT_BUILD_DATE)
    }
}

fn invocation_name() -> String {
    std::env::args().next().unwrap_or_default()
}
