//! HTTP status codes as a typed enum.
//!
//! Only the codes a JSON API scaffold actually emits or is commonly asked to
//! emit are listed. Anything else can still be sent through
//! [`Response::builder`](crate::Response::builder) with a raw `u16`.
//!
//! ```rust
//! use trellis::{Response, Status};
//!
//! Response::status(Status::NoContent);
//! Response::error(Status::BadRequest, "limit (7) must be a multiple of 5");
//! ```

/// HTTP status codes used by trellis and its handlers.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    Accepted,             // 202
    NoContent,            // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently,     // 301
    NotModified,          // 304

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    Unauthorized,         // 401
    Forbidden,            // 403
    NotFound,             // 404
    MethodNotAllowed,     // 405
    Conflict,             // 409
    UnsupportedMediaType, // 415
    UnprocessableContent, // 422
    TooManyRequests,      // 429

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    NotImplemented,       // 501
    ServiceUnavailable,   // 503
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::Accepted             => 202,
            Self::NoContent            => 204,
            Self::MovedPermanently     => 301,
            Self::NotModified          => 304,
            Self::BadRequest           => 400,
            Self::Unauthorized         => 401,
            Self::Forbidden            => 403,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::Conflict             => 409,
            Self::UnsupportedMediaType => 415,
            Self::UnprocessableContent => 422,
            Self::TooManyRequests      => 429,
            Self::InternalServerError  => 500,
            Self::NotImplemented       => 501,
            Self::ServiceUnavailable   => 503,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}
