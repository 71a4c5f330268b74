//! Unified error type.

use crate::method::Method;

/// The error type returned by trellis's fallible wiring operations.
///
/// Application-level errors (404, 405, bad pagination parameters) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces programmer mistakes caught while wiring the service
/// and infrastructure failures such as binding to a port.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A numeric method id outside the known set.
    #[error("method id {0} not recognised")]
    UnknownMethod(u8),

    /// `HEAD` and `OPTIONS` are answered by the controller itself.
    #[error("cannot set {0}, this is provided for you")]
    ReservedMethod(Method),

    /// The routing engine rejected a path.
    #[error("invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
