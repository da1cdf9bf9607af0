use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// Request methods recognized on the request line: the RFC 7231 set plus
/// the WebDAV, versioning, UPnP and cache-control extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    ACL,
    BIND,
    COPY,
    CHECKOUT,
    LOCK,
    UNLOCK,
    LINK,
    MKCOL,
    MOVE,
    MKACTIVITY,
    MERGE,
    #[serde(rename = "M-SEARCH")]
    MSEARCH,
    MKCALENDAR,
    NOTIFY,
    PROPFIND,
    PROPPATCH,
    PATCH,
    PURGE,
    REPORT,
    REBIND,
    SUBSCRIBE,
    SEARCH,
    SOURCE,
    UNSUBSCRIBE,
    UNBIND,
    UNLINK,
}

/// Longest token the request-line scanner buffers while looking for the
/// method delimiter. No method in [`METHODS`] comes close.
pub(crate) const MAX_METHOD_LEN: usize = 16;

/// Method name to enum dispatch table, matched case-insensitively.
static METHODS: [(&str, Method); 34] = [
    ("GET", Method::GET),
    ("HEAD", Method::HEAD),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("CONNECT", Method::CONNECT),
    ("OPTIONS", Method::OPTIONS),
    ("TRACE", Method::TRACE),
    ("ACL", Method::ACL),
    ("BIND", Method::BIND),
    ("COPY", Method::COPY),
    ("CHECKOUT", Method::CHECKOUT),
    ("LOCK", Method::LOCK),
    ("UNLOCK", Method::UNLOCK),
    ("LINK", Method::LINK),
    ("MKCOL", Method::MKCOL),
    ("MOVE", Method::MOVE),
    ("MKACTIVITY", Method::MKACTIVITY),
    ("MERGE", Method::MERGE),
    ("M-SEARCH", Method::MSEARCH),
    ("MKCALENDAR", Method::MKCALENDAR),
    ("NOTIFY", Method::NOTIFY),
    ("PROPFIND", Method::PROPFIND),
    ("PROPPATCH", Method::PROPPATCH),
    ("PATCH", Method::PATCH),
    ("PURGE", Method::PURGE),
    ("REPORT", Method::REPORT),
    ("REBIND", Method::REBIND),
    ("SUBSCRIBE", Method::SUBSCRIBE),
    ("SEARCH", Method::SEARCH),
    ("SOURCE", Method::SOURCE),
    ("UNSUBSCRIBE", Method::UNSUBSCRIBE),
    ("UNBIND", Method::UNBIND),
    ("UNLINK", Method::UNLINK),
];

impl Method {
    /// Look up a method token, ignoring ASCII case.
    ///
    /// Returns `None` if the bytes do not match a known method.
    pub fn from_token(token: &[u8]) -> Option<Self> {
        if token.is_empty() || token.len() > MAX_METHOD_LEN {
            return None;
        }
        METHODS
            .iter()
            .find(|(name, _)| name.as_bytes().eq_ignore_ascii_case(token))
            .map(|&(_, method)| method)
    }

    /// Return the canonical method name.
    pub fn as_str(&self) -> &'static str {
        METHODS
            .iter()
            .find(|(_, method)| method == self)
            .map_or("UNKNOWN", |&(name, _)| name)
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
    fn every_table_entry_round_trips() {
        for (name, method) in METHODS {
            assert_eq!(Method::from_token(name.as_bytes()), Some(method));
            assert_eq!(method.as_str(), name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Method::from_token(b"get"), Some(Method::GET));
        assert_eq!(Method::from_token(b"m-search"), Some(Method::MSEARCH));
        assert_eq!(Method::from_token(b"PropFind"), Some(Method::PROPFIND));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(Method::from_token(b""), None);
        assert_eq!(Method::from_token(b"FOOBAR"), None);
        assert_eq!(Method::from_token(b"GETS"), None);
        assert_eq!(Method::from_token(b"UNSUBSCRIBEXXXXXXXX"), None);
    }

    #[test]
    fn longest_method_fits_scan_limit() {
        assert!(METHODS.iter().all(|(name, _)| name.len() <= MAX_METHOD_LEN));
    }
}
