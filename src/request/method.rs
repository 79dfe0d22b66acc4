//! Request method tags.

use std::fmt;

/// HTTP method of a request.
///
/// `Custom` stands for any verb outside the eight known ones; the verb text
/// itself is stored on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Head,
    Trace,
    Put,
    Delete,
    Options,
    Connect,
    Custom,
}

impl Method {
    /// The canonical uppercase verb. `Custom` has none of its own and reads as `GET`.
    pub const fn canonical(self) -> &'static str {
        match self {
            Method::Get | Method::Custom => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
        }
    }

    /// Map verb text (any case) to a tag; unknown verbs become `Custom`.
    pub fn from_verb(verb: &str) -> Method {
        match verb.trim().to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "HEAD" => Method::Head,
            "TRACE" => Method::Trace,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "CONNECT" => Method::Connect,
            _ => Method::Custom,
        }
    }

    /// Methods whose loose parameters belong in the body rather than the query.
    pub fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Head,
        Method::Trace,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Connect,
    ];

    #[test]
    fn known_tags_round_trip_through_text() {
        for method in KNOWN {
            assert_eq!(Method::from_verb(method.canonical()), method);
        }
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(Method::from_verb("delete"), Method::Delete);
        assert_eq!(Method::from_verb(" Options "), Method::Options);
    }

    #[test]
    fn unknown_verbs_are_custom() {
        assert_eq!(Method::from_verb("PURGE"), Method::Custom);
        assert_eq!(Method::Custom.canonical(), "GET");
    }
}
