//! Offset-based pagination for list endpoints.
//!
//! Lists are windowed as `(limit, offset)`. Clients may also ask for a
//! `page`, which is translated into an offset. Every handler that returns a
//! list runs the query string through [`limit_and_offset`] and wraps the
//! result in [`Paginated`]:
//!
//! ```rust
//! use trellis::pagination::{self, Paginated};
//! use trellis::{IntoResponse, Request, Response};
//!
//! async fn list_users(req: Request) -> Response {
//!     let window = match pagination::limit_and_offset(&req.query_params()) {
//!         Ok(w) => w,
//!         Err(e) => return e.into_response(),
//!     };
//!     let users: Vec<String> = Vec::new(); // storage query with window.limit / window.offset
//!     Paginated::new(users, "user", 0, window.limit, window.offset).into_response()
//! }
//! ```

use serde::Serialize;

use crate::request::QueryParams;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Items per page when the client does not ask for a limit.
pub const DEFAULT_LIMIT: i64 = 25;

/// Offset when the client asks for neither `offset` nor `page`.
pub const DEFAULT_OFFSET: i64 = 0;

/// Largest limit a client may ask for.
pub const MAX_LIMIT: i64 = 250;

/// Explicit limits must be a multiple of this.
pub const LIMIT_STEP: i64 = 5;

// ── Arithmetic ────────────────────────────────────────────────────────────────

fn or_default_limit(limit: i64) -> i64 {
    if limit == 0 { DEFAULT_LIMIT } else { limit }
}

/// Number of pages needed to hold `total` items, `limit` to a page.
pub fn page_count(total: i64, limit: i64) -> i64 {
    let limit = or_default_limit(limit);
    let pages = total / limit;
    if total % limit > 0 { pages + 1 } else { pages }
}

/// Offset of the last page.
///
/// Division truncates toward zero, so `total == 0` gives `(-1 / limit) * limit == 0`.
pub fn max_offset(total: i64, limit: i64) -> i64 {
    let limit = or_default_limit(limit);
    ((total - 1) / limit) * limit
}

/// 1-based page containing `offset`; `0` when `limit` is zero.
///
/// Saturates instead of overflowing for offsets near `i64::MAX`.
pub fn current_page(offset: i64, limit: i64) -> i64 {
    if limit == 0 {
        return 0;
    }
    offset.saturating_add(limit) / limit
}

/// Offset of the first item on `page`. Page `0` is read as page `1`.
///
/// Saturates at `i64::MAX`; [`limit_and_offset`] rejects such pages
/// before they get here.
pub fn offset_from_page(page: i64, limit: i64) -> i64 {
    let page = if page == 0 { 1 } else { page };
    let limit = or_default_limit(limit);
    page.saturating_mul(limit).saturating_sub(limit)
}

// ── Query parameters ──────────────────────────────────────────────────────────

/// A validated `(limit, offset)` pair, ready for a storage query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Window {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: DEFAULT_OFFSET }
    }
}

/// A pagination parameter the client got wrong.
///
/// `param` is the query parameter name as the client sent it (`limit`,
/// `per_page`, `offset` or `page`).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("{param} ({value}) is not a number")]
    NotANumber { param: &'static str, value: String },

    #[error("{param} ({value}) cannot be zero or negative")]
    LimitNotPositive { param: &'static str, value: i64 },

    #[error("{param} ({value}) must be a multiple of {step}", step = LIMIT_STEP)]
    LimitNotMultipleOfStep { param: &'static str, value: i64 },

    #[error("{param} ({value}) cannot exceed {max}", max = MAX_LIMIT)]
    LimitTooLarge { param: &'static str, value: i64 },

    #[error("offset ({value}) cannot be negative")]
    OffsetNegative { value: i64 },

    #[error("offset ({value}) must be a multiple of limit ({limit}) or zero")]
    OffsetNotMultipleOfLimit { value: i64, limit: i64 },

    #[error("offset ({value}) is too large")]
    OffsetTooLarge { value: i64 },

    #[error("page ({value}) must be 1 or higher")]
    PageNotPositive { value: i64 },

    #[error("page ({value}) is too large")]
    PageTooLarge { value: i64 },
}

impl PaginationError {
    /// Every pagination error is the client's fault.
    pub fn status(&self) -> Status {
        Status::BadRequest
    }
}

impl IntoResponse for PaginationError {
    fn into_response(self) -> Response {
        Response::error(self.status(), self.to_string())
    }
}

fn parse(param: &'static str, value: &str) -> Result<i64, PaginationError> {
    value.parse().map_err(|_| PaginationError::NotANumber {
        param,
        value: value.to_owned(),
    })
}

/// Reads `per_page` / `limit`, `offset` and `page` from a query string.
///
/// - The limit comes from `per_page`, else `limit`, else [`DEFAULT_LIMIT`].
///   A limit other than the default must be a multiple of [`LIMIT_STEP`]
///   between 1 and [`MAX_LIMIT`].
/// - The offset comes from `offset` (non-negative, a multiple of the limit);
///   failing that from `page` (1 or higher) as `page * limit - limit`;
///   failing that it is [`DEFAULT_OFFSET`].
/// - `offset + limit` always fits in an `i64`; larger offsets or pages are
///   rejected.
pub fn limit_and_offset(query: &QueryParams) -> Result<Window, PaginationError> {
    let (param, raw) = match query.get("per_page") {
        Some(v) => ("per_page", Some(v)),
        None => ("limit", query.get("limit")),
    };

    let limit = match raw {
        Some(v) => parse(param, v)?,
        None => DEFAULT_LIMIT,
    };

    if limit != DEFAULT_LIMIT {
        if limit < 1 {
            return Err(PaginationError::LimitNotPositive { param, value: limit });
        }
        if limit % LIMIT_STEP != 0 {
            return Err(PaginationError::LimitNotMultipleOfStep { param, value: limit });
        }
        if limit > MAX_LIMIT {
            return Err(PaginationError::LimitTooLarge { param, value: limit });
        }
    }

    let offset = if let Some(v) = query.get("offset") {
        let offset = parse("offset", v)?;
        if offset < 0 {
            return Err(PaginationError::OffsetNegative { value: offset });
        }
        if offset % limit != 0 {
            return Err(PaginationError::OffsetNotMultipleOfLimit { value: offset, limit });
        }
        // The end of the window, offset + limit, must stay representable.
        if offset.checked_add(limit).is_none() {
            return Err(PaginationError::OffsetTooLarge { value: offset });
        }
        offset
    } else if let Some(v) = query.get("page") {
        let page = parse("page", v)?;
        if page < 1 {
            return Err(PaginationError::PageNotPositive { value: page });
        }
        page.checked_mul(limit)
            .and_then(|end| end.checked_sub(limit))
            .ok_or(PaginationError::PageTooLarge { value: page })?
    } else {
        DEFAULT_OFFSET
    };

    Ok(Window { limit, offset })
}

// ── Response envelope ─────────────────────────────────────────────────────────

/// Pagination fields of a list response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCore {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub max_offset: i64,
    #[serde(rename = "totalPages")]
    pub pages: i64,
    pub page: i64,
    #[serde(rename = "type")]
    pub item_type: String,
}

impl PaginationCore {
    /// Fills every field from the window and the total item count.
    pub fn populate(&mut self, total: i64, limit: i64, offset: i64, item_type: impl Into<String>) {
        self.total = total;
        self.limit = limit;
        self.offset = offset;
        self.max_offset = max_offset(total, limit);
        self.pages = page_count(total, limit);
        self.page = current_page(offset, limit);
        self.item_type = item_type.into();
    }
}

/// A page of `items` together with where it sits in the whole collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    #[serde(flatten)]
    pub core: PaginationCore,
    pub items: T,
}

impl<T> Paginated<T> {
    pub fn new(items: T, item_type: impl Into<String>, total: i64, limit: i64, offset: i64) -> Self {
        let mut core = PaginationCore::default();
        core.populate(total, limit, offset, item_type);
        Self { core, items }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Response::json_value(Status::Ok, &self)
    }
}
