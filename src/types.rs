use serde::{Serialize, Serializer};
use std::fmt;

use crate::method::Method;
use crate::parser::{Framing, MessageKind};

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// HTTP protocol version as read from the start line. Each component is a
/// single decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_10: Self = Self::new(1, 0);
    pub const HTTP_11: Self = Self::new(1, 1);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// A single header or trailer field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Field name, as delivered (original casing preserved).
    pub name: String,
    /// Field value, as delivered (one leading SP/HTAB dropped).
    pub value: String,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A fully parsed request or response, assembled from parser callbacks by
/// [`Collector`](crate::Collector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// [`MessageKind::Request`] or [`MessageKind::Response`].
    pub kind: MessageKind,
    /// Request method (requests only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    /// Request target (requests only).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Status code (responses only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Reason phrase (responses only, may be empty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub version: Version,
    pub headers: Vec<Header>,
    /// Fields from the trailer section of a chunked body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailers: Vec<Header>,
    /// How the body was delimited.
    pub framing: Option<Framing>,
    #[serde(serialize_with = "serialize_body")]
    pub body: Option<Vec<u8>>,
    /// Whether the connection could carry another message afterwards.
    pub keep_alive: bool,
    /// Whether the connection switched protocols after this message.
    pub upgrade: bool,
}

/// Serialize body bytes as a UTF-8 string (lossy) for JSON output.
fn serialize_body<S: Serializer>(body: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match body {
        None => s.serialize_none(),
        Some(bytes) => s.serialize_str(&String::from_utf8_lossy(bytes)),
    }
}

impl Message {
    pub fn is_request(&self) -> bool {
        self.kind == MessageKind::Request
    }

    pub fn is_response(&self) -> bool {
        self.kind == MessageKind::Response
    }

    /// Return the body as a UTF-8 `&str` if it is valid UTF-8.
    pub fn body_as_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Return the raw body bytes.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Look up the first header value by name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_value(&self.headers, name).next()
    }

    /// Return all values for headers matching `name` (case-insensitive).
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        find_value(&self.headers, name).collect()
    }

    /// Look up the first trailer value by name (case-insensitive).
    pub fn trailer_value(&self, name: &str) -> Option<&str> {
        find_value(&self.trailers, name).next()
    }
}

fn find_value<'a>(fields: &'a [Header], name: &str) -> impl Iterator<Item = &'a str> {
    fields
        .iter()
        .filter(move |h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

// ---------------------------------------------------------------------------
// Parsed
// ---------------------------------------------------------------------------

/// Result of running a whole capture through the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed {
    /// Every message completed, in stream order.
    pub messages: Vec<Message>,
    /// Bytes interpreted as HTTP.
    pub consumed: usize,
    /// Bytes following an upgrade, belonging to the new protocol.
    #[serde(serialize_with = "serialize_body")]
    pub upgrade: Option<Vec<u8>>,
}
