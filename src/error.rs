use std::fmt;

/// Category of a fatal parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request method token is empty, too long, not followed by SP,
    /// or not a known method.
    InvalidMethod,
    /// The request-target contains a line break, or the request line does
    /// not continue with the `HTTP/` literal.
    InvalidRequestLine,
    /// The status line does not start with `HTTP/` or its status code is
    /// malformed.
    InvalidStatusLine,
    /// A version component is not a single decimal digit, or the version
    /// is not followed by the end of the line.
    InvalidVersion,
    /// A line that must end in LF does not.
    MissingLineFeed,
    /// A header field name or value exceeded the configured line limit
    /// without being terminated.
    HeaderOverflow,
    /// A header line ended before its `:` separator.
    InvalidHeader,
    /// A chunk-size line contains a character that is neither a hex digit
    /// nor the start of a chunk extension, or the size overflows.
    InvalidChunkSize,
    /// The `Content-Length` value is not a non-negative decimal integer, or
    /// disagrees with an earlier `Content-Length`.
    InvalidContentLength,
    /// End of input was signalled in the middle of a message.
    UnexpectedEof,
    /// The connection is closed (after `Connection: close`, a read-to-EOF
    /// body, or an earlier fatal error); no more input is accepted.
    Closed,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidMethod => "invalid HTTP method",
            Self::InvalidRequestLine => "malformed request line",
            Self::InvalidStatusLine => "malformed status line",
            Self::InvalidVersion => "invalid HTTP version",
            Self::MissingLineFeed => "missing LF line terminator",
            Self::HeaderOverflow => "header line exceeds maximum allowed size",
            Self::InvalidHeader => "header line without a colon",
            Self::InvalidChunkSize => "invalid chunk size",
            Self::InvalidContentLength => "invalid Content-Length",
            Self::UnexpectedEof => "unexpected end of input inside a message",
            Self::Closed => "connection is closed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`Parser::execute`](crate::Parser::execute).
///
/// Every error is fatal for the connection: the parser does not try to
/// resynchronize, and further input is refused until
/// [`Parser::reset`](crate::Parser::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    offset: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// What went wrong.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Offset of the offending byte within the buffer passed to the
    /// failing `execute` call.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl From<ParseError> for ErrorKind {
    fn from(err: ParseError) -> Self {
        err.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.offset)
    }
}

impl std::error::Error for ParseError {}
