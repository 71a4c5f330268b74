//! HTTP method as a typed enum.
//!
//! The set is closed: the nine RFC 9110 methods, each with a stable numeric
//! id and an upper-case wire name. `OPTIONS` and `HEAD` are reserved — a
//! [`RouteController`](crate::RouteController) answers them itself, so they
//! can never carry a user handler.
//!
//! Unknown method strings fail [`FromStr`]; the dispatcher treats that as
//! "unknown" and answers `405 Method Not Allowed`.

use std::fmt;
use std::str::FromStr;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Method {
    Options = 0,
    Head    = 1,
    Post    = 2,
    Get     = 3,
    Put     = 4,
    Patch   = 5,
    Delete  = 6,
    Connect = 7,
    Trace   = 8,
}

impl Method {
    /// Every method, in id order.
    pub const ALL: [Method; 9] = [
        Self::Options,
        Self::Head,
        Self::Post,
        Self::Get,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Connect,
        Self::Trace,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// The stable numeric id of this method.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn is_valid_id(id: u8) -> bool {
        Self::from_id(id).is_some()
    }

    /// Name for a numeric id, or `""` when the id is unknown.
    pub fn name_of(id: u8) -> &'static str {
        Self::from_id(id).map_or("", Self::as_str)
    }

    /// Id for an upper-case method name.
    ///
    /// Unrecognised names yield the `OPTIONS` id. That value is a sentinel,
    /// not a claim that the request was an `OPTIONS` request — dispatch code
    /// parses with [`FromStr`] instead and never sees this fallback.
    pub fn id_of(name: &str) -> u8 {
        name.parse::<Self>().unwrap_or(Self::Options).id()
    }

    /// `HEAD` and `OPTIONS` are answered by the controller itself.
    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Head | Self::Options)
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_ids_both_ways() {
        for method in Method::ALL {
            assert!(Method::is_valid_id(method.id()));
            assert_eq!(Method::name_of(method.id()), method.as_str());
            assert_eq!(Method::id_of(method.as_str()), method.id());
        }
    }

    #[test]
    fn test_should_return_empty_name_for_unknown_id() {
        assert!(!Method::is_valid_id(9));
        assert_eq!(Method::name_of(9), "");
        assert_eq!(Method::name_of(u8::MAX), "");
    }

    #[test]
    fn test_should_fall_back_to_options_id_for_unknown_name() {
        assert_eq!(Method::id_of("BREW"), Method::Options.id());
        assert_eq!(Method::id_of("get"), Method::Options.id());
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn test_should_flag_only_head_and_options_as_reserved() {
        let reserved: Vec<_> = Method::ALL.into_iter().filter(|m| m.is_reserved()).collect();
        assert_eq!(reserved, vec![Method::Options, Method::Head]);
    }
}
