use serde::Serialize;
use std::mem;

use crate::error::{ErrorKind, ParseError};
use crate::log::{debug, warning};
use crate::method::{MAX_METHOD_LEN, Method};
use crate::settings::{DataCallback, NotifyCallback, Settings};
use crate::tables::{is_token, unhex};
use crate::types::Version;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default ceiling on a single unterminated header name or value.
pub const DEFAULT_MAX_HEADER_LINE_SIZE: usize = 4096;

/// Configurable limits for the HTTP parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of bytes a header field name or value may span
    /// without its terminator being seen (default: 4 096).
    ///
    /// This is the only bound on how much input a caller has to carry
    /// between `execute` calls while a header line is incomplete.
    pub max_header_line_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_line_size: DEFAULT_MAX_HEADER_LINE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Message kind / framing
// ---------------------------------------------------------------------------

/// Which side of the conversation a parser decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Request lines only.
    Request,
    /// Status lines only.
    Response,
    /// Decide per message from its first bytes: `HT` starts a response,
    /// anything else a request.
    Either,
}

/// How the end of a message body is determined, decided once the header
/// section is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// No body.
    Empty,
    /// Exactly this many bytes (`Content-Length`).
    Length(u64),
    /// `Transfer-Encoding: chunked`. Takes precedence over `Content-Length`.
    Chunked,
    /// Everything until the connection closes (signalled by an empty
    /// `execute`). Only responses are framed this way.
    UntilClose,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // ---- Message start ----
    StartEither,
    StartRequest,
    StartResponse,

    // ---- Request line ----
    RequestMethod,
    RequestUrlStart,
    RequestUrl,
    RequestUrlSp,
    RequestHttp(u8),
    RequestLineEnd,

    // ---- Status line ----
    ResponseHttp(u8),
    ResponseVersionSp,
    ResponseStatusStart,
    StatusCode(u8),
    ReasonStart,
    Reason,

    // ---- Shared by both start lines ----
    VersionMajor,
    VersionDot,
    VersionMinor,
    StartLineLf,

    // ---- Header section (also used for trailers) ----
    HeaderField,
    HeaderValueStart,
    HeaderValue,
    HeaderValueLf,
    HeadersAlmostDone,

    // ---- Bodies ----
    Body,
    BodyUntilEof,
    ChunkSizeStart,
    ChunkSize,
    ChunkExt,
    ChunkSizeLf,
    ChunkData,
    ChunkDataEnd,
    ChunkDataLf,

    // ---- Between / after messages ----
    MessageDone,
    Upgraded,
    Dead,
}

impl State {
    fn start(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Request => Self::StartRequest,
            MessageKind::Response => Self::StartResponse,
            MessageKind::Either => Self::StartEither,
        }
    }

    /// States in which no message is in progress.
    fn at_boundary(self) -> bool {
        matches!(
            self,
            Self::StartEither
                | Self::StartRequest
                | Self::StartResponse
                | Self::MessageDone
                | Self::Upgraded
                | Self::Dead
        )
    }

    fn name(self) -> &'static str {
        match self {
            Self::StartEither => "start_either",
            Self::StartRequest => "start_request",
            Self::StartResponse => "start_response",
            Self::RequestMethod => "request_method",
            Self::RequestUrlStart => "request_url_start",
            Self::RequestUrl => "request_url",
            Self::RequestUrlSp => "request_url_sp",
            Self::RequestHttp(_) => "request_http",
            Self::RequestLineEnd => "request_line_end",
            Self::ResponseHttp(_) => "response_http",
            Self::ResponseVersionSp => "response_version_sp",
            Self::ResponseStatusStart => "response_status_start",
            Self::StatusCode(_) => "status_code",
            Self::ReasonStart => "reason_start",
            Self::Reason => "reason",
            Self::VersionMajor => "version_major",
            Self::VersionDot => "version_dot",
            Self::VersionMinor => "version_minor",
            Self::StartLineLf => "start_line_lf",
            Self::HeaderField => "header_field",
            Self::HeaderValueStart => "header_value_start",
            Self::HeaderValue => "header_value",
            Self::HeaderValueLf => "header_value_lf",
            Self::HeadersAlmostDone => "headers_almost_done",
            Self::Body => "body",
            Self::BodyUntilEof => "body_until_eof",
            Self::ChunkSizeStart => "chunk_size_start",
            Self::ChunkSize => "chunk_size",
            Self::ChunkExt => "chunk_ext",
            Self::ChunkSizeLf => "chunk_size_lf",
            Self::ChunkData => "chunk_data",
            Self::ChunkDataEnd => "chunk_data_end",
            Self::ChunkDataLf => "chunk_data_lf",
            Self::MessageDone => "message_done",
            Self::Upgraded => "upgraded",
            Self::Dead => "dead",
        }
    }
}

/// Interpretation of the header value currently being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HeaderKind {
    #[default]
    General,
    ContentLength,
    TransferEncoding,
    Connection,
}

/// Framing-relevant facts collected while scanning headers.
#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    chunked: bool,
    connection_close: bool,
    connection_keep_alive: bool,
    connection_upgrade: bool,
    upgrade_header: bool,
    trailers: bool,
    message_complete: bool,
}

const HTTP_SLASH: &[u8; 5] = b"HTTP/";

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// An incremental, callback-driven HTTP/1.x message parser.
///
/// One parser serves one connection and is reused for every message on it.
/// [`execute`](Self::execute) accepts any fragment of the byte stream and
/// reports how many leading bytes it interpreted; the caller keeps the rest
/// and presents it again, followed by newly read bytes, on the next call.
/// The callback sequence does not depend on how the stream is split.
///
/// `T` is caller-owned state reachable from every callback through
/// [`user_data_mut`](Self::user_data_mut).
///
/// # Usage
///
/// ```rust
/// use wirehook::{MessageKind, Parser, Settings};
///
/// fn on_body(p: &mut Parser<Vec<u8>>, data: &[u8]) {
///     p.user_data_mut().extend_from_slice(data);
/// }
///
/// let settings: Settings<Vec<u8>> = Settings {
///     on_body: Some(on_body),
///     ..Settings::new()
/// };
///
/// let mut parser = Parser::<Vec<u8>>::new(MessageKind::Response);
/// let data = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
///
/// // First read stops in the middle of a header name.
/// let first = &data[..20];
/// let used = parser.execute(&settings, first).unwrap();
///
/// // Re-present the unconsumed tail together with the rest.
/// let mut next = first[used..].to_vec();
/// next.extend_from_slice(&data[20..]);
/// assert_eq!(parser.execute(&settings, &next).unwrap(), next.len());
///
/// assert_eq!(parser.user_data().as_slice(), b"hello");
/// assert_eq!(parser.status_code(), 200);
/// ```
pub struct Parser<T = ()> {
    kind: MessageKind,
    current: MessageKind,
    state: State,
    config: ParserConfig,

    // Per-message results
    method: Option<Method>,
    major: u8,
    minor: u8,
    status_code: u16,
    content_length: Option<u64>,
    framing: Option<Framing>,
    upgraded: bool,

    // Scanning bookkeeping
    header_kind: HeaderKind,
    flags: Flags,
    remaining: u64,

    user_data: T,
}

impl<T: Default> Parser<T> {
    /// Create a parser with default configuration and default user data.
    pub fn new(kind: MessageKind) -> Self {
        Self::with_user_data(kind, T::default())
    }

    /// Create a parser with custom limits.
    pub fn with_config(kind: MessageKind, config: ParserConfig) -> Self {
        let mut parser = Self::new(kind);
        parser.config = config;
        parser
    }
}

impl<T> Parser<T> {
    /// Create a parser carrying `user_data`.
    pub fn with_user_data(kind: MessageKind, user_data: T) -> Self {
        Self {
            kind,
            current: kind,
            state: State::start(kind),
            config: ParserConfig::default(),
            method: None,
            major: 0,
            minor: 0,
            status_code: 0,
            content_length: None,
            framing: None,
            upgraded: false,
            header_kind: HeaderKind::General,
            flags: Flags::default(),
            remaining: 0,
            user_data,
        }
    }

    /// Reset every per-message field and return to the start state for the
    /// configured [`MessageKind`]. Configuration and user data are kept.
    pub fn reset(&mut self) {
        self.current = self.kind;
        self.state = State::start(self.kind);
        self.method = None;
        self.major = 0;
        self.minor = 0;
        self.status_code = 0;
        self.content_length = None;
        self.framing = None;
        self.upgraded = false;
        self.header_kind = HeaderKind::General;
        self.flags = Flags::default();
        self.remaining = 0;
    }

    /// Feed a fragment of the byte stream into the parser.
    ///
    /// Callbacks from `settings` run in-line, before this returns. The
    /// returned count is the number of leading bytes of `buf` that were
    /// interpreted; anything after it must be passed again, unmodified and
    /// followed by new input, on the next call. After an upgrade the bytes
    /// past the count belong to the new protocol and must not be fed back.
    ///
    /// An empty `buf` signals end of input: it completes a body that is
    /// read until the connection closes, and is an error in the middle of
    /// any other message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on any protocol violation. The error carries
    /// the offset of the offending byte; the parser refuses further input
    /// until [`reset`](Self::reset).
    pub fn execute(&mut self, settings: &Settings<T>, buf: &[u8]) -> Result<usize, ParseError> {
        if buf.is_empty() {
            return self.execute_eof(settings);
        }

        let mut state = self.state;
        let mut i = 0;

        // Each arm either falls through to consume `c`, advances `i` itself
        // and `continue`s, or `continue`s without advancing to re-dispatch
        // the same byte under a new state. A re-dispatch always changes
        // `state`.
        while i < buf.len() {
            let c = buf[i];

            match state {
                // ===================== MESSAGE START =====================
                State::StartEither => {
                    if c == b'\r' || c == b'\n' {
                        i += 1;
                        continue;
                    }
                    if c == b'H' {
                        // `HT` opens a status line, `HE` a HEAD request.
                        let Some(&next) = buf.get(i + 1) else {
                            return Ok(self.suspend(state, i));
                        };
                        if next == b'T' {
                            self.current = MessageKind::Response;
                            state = State::StartResponse;
                            continue;
                        }
                    }
                    self.current = MessageKind::Request;
                    state = State::StartRequest;
                    continue;
                }

                State::StartRequest => {
                    if c == b'\r' || c == b'\n' {
                        i += 1;
                        continue;
                    }
                    self.current = MessageKind::Request;
                    self.notify(settings.on_message_begin);
                    state = State::RequestMethod;
                    continue;
                }

                State::StartResponse => {
                    if c == b'\r' || c == b'\n' {
                        i += 1;
                        continue;
                    }
                    self.current = MessageKind::Response;
                    self.notify(settings.on_message_begin);
                    state = State::ResponseHttp(0);
                    continue;
                }

                // ===================== REQUEST LINE =====================
                State::RequestMethod => {
                    let rest = &buf[i..];
                    let Some(len) = rest.iter().position(|&b| !is_token(b)) else {
                        if rest.len() > MAX_METHOD_LEN {
                            return Err(self.fail(ErrorKind::InvalidMethod, i));
                        }
                        return Ok(self.suspend(state, i));
                    };
                    if rest[len] != b' ' {
                        return Err(self.fail(ErrorKind::InvalidMethod, i + len));
                    }
                    let Some(method) = Method::from_token(&rest[..len]) else {
                        return Err(self.fail(ErrorKind::InvalidMethod, i));
                    };
                    self.method = Some(method);
                    i += len + 1;
                    state = State::RequestUrlStart;
                    continue;
                }

                State::RequestUrlStart => match c {
                    b' ' | b'\t' => {}
                    b'\r' | b'\n' => return Err(self.fail(ErrorKind::InvalidRequestLine, i)),
                    _ => {
                        state = State::RequestUrl;
                        continue;
                    }
                },

                State::RequestUrl => {
                    let rest = &buf[i..];
                    match rest.iter().position(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {
                        Some(end) if matches!(rest[end], b'\r' | b'\n') => {
                            return Err(self.fail(ErrorKind::InvalidRequestLine, i + end));
                        }
                        Some(end) => {
                            self.data(settings.on_url, &rest[..end]);
                            i += end + 1;
                            state = State::RequestUrlSp;
                        }
                        None => {
                            self.data(settings.on_url, rest);
                            i = buf.len();
                        }
                    }
                    continue;
                }

                State::RequestUrlSp => {
                    if c != b' ' && c != b'\t' {
                        state = State::RequestHttp(0);
                        continue;
                    }
                }

                State::RequestHttp(n) => {
                    if c != HTTP_SLASH[n as usize] {
                        return Err(self.fail(ErrorKind::InvalidRequestLine, i));
                    }
                    state = if n as usize + 1 == HTTP_SLASH.len() {
                        State::VersionMajor
                    } else {
                        State::RequestHttp(n + 1)
                    };
                }

                State::RequestLineEnd => match c {
                    b'\r' => state = State::StartLineLf,
                    b'\n' => state = State::HeaderField,
                    _ => return Err(self.fail(ErrorKind::InvalidVersion, i)),
                },

                // ===================== STATUS LINE =====================
                State::ResponseHttp(n) => {
                    if c != HTTP_SLASH[n as usize] {
                        return Err(self.fail(ErrorKind::InvalidStatusLine, i));
                    }
                    state = if n as usize + 1 == HTTP_SLASH.len() {
                        State::VersionMajor
                    } else {
                        State::ResponseHttp(n + 1)
                    };
                }

                State::ResponseVersionSp => {
                    if c != b' ' {
                        return Err(self.fail(ErrorKind::InvalidVersion, i));
                    }
                    state = State::ResponseStatusStart;
                }

                State::ResponseStatusStart => match c {
                    b' ' => {}
                    b'0'..=b'9' => {
                        state = State::StatusCode(0);
                        continue;
                    }
                    _ => return Err(self.fail(ErrorKind::InvalidStatusLine, i)),
                },

                State::StatusCode(digits) => match c {
                    b'0'..=b'9' => {
                        if digits == 3 {
                            return Err(self.fail(ErrorKind::InvalidStatusLine, i));
                        }
                        self.status_code = self.status_code * 10 + u16::from(c - b'0');
                        state = State::StatusCode(digits + 1);
                    }
                    b' ' => state = State::ReasonStart,
                    b'\r' | b'\n' => {
                        state = State::Reason;
                        continue;
                    }
                    _ => return Err(self.fail(ErrorKind::InvalidStatusLine, i)),
                },

                State::ReasonStart => {
                    if c != b' ' {
                        state = State::Reason;
                        continue;
                    }
                }

                State::Reason => {
                    let rest = &buf[i..];
                    match rest.iter().position(|&b| b == b'\r' || b == b'\n') {
                        Some(end) => {
                            self.data(settings.on_status, &rest[..end]);
                            state = if rest[end] == b'\r' {
                                State::StartLineLf
                            } else {
                                State::HeaderField
                            };
                            i += end + 1;
                        }
                        None => {
                            self.data(settings.on_status, rest);
                            i = buf.len();
                        }
                    }
                    continue;
                }

                // ===================== VERSION =====================
                State::VersionMajor => match c {
                    b'0'..=b'9' => {
                        self.major = c - b'0';
                        state = State::VersionDot;
                    }
                    _ => return Err(self.fail(ErrorKind::InvalidVersion, i)),
                },

                State::VersionDot => {
                    if c != b'.' {
                        return Err(self.fail(ErrorKind::InvalidVersion, i));
                    }
                    state = State::VersionMinor;
                }

                State::VersionMinor => match c {
                    b'0'..=b'9' => {
                        self.minor = c - b'0';
                        state = if self.current == MessageKind::Response {
                            State::ResponseVersionSp
                        } else {
                            State::RequestLineEnd
                        };
                    }
                    _ => return Err(self.fail(ErrorKind::InvalidVersion, i)),
                },

                State::StartLineLf => {
                    if c != b'\n' {
                        return Err(self.fail(ErrorKind::MissingLineFeed, i));
                    }
                    state = State::HeaderField;
                }

                // ===================== HEADERS =====================
                State::HeaderField => match c {
                    b'\r' => state = State::HeadersAlmostDone,
                    b'\n' => {
                        state = State::HeadersAlmostDone;
                        continue;
                    }
                    _ => {
                        let rest = &buf[i..];
                        let delim = rest.iter().position(|&b| matches!(b, b':' | b'\r' | b'\n'));
                        let Some(colon) = delim else {
                            if rest.len() > self.config.max_header_line_size {
                                return Err(self.fail(ErrorKind::HeaderOverflow, i));
                            }
                            return Ok(self.suspend(state, i));
                        };
                        if rest[colon] != b':' {
                            return Err(self.fail(ErrorKind::InvalidHeader, i + colon));
                        }
                        let name = &rest[..colon];
                        self.field(settings.on_header_field, name);
                        self.classify_header(name);
                        i += colon + 1;
                        state = State::HeaderValueStart;
                        continue;
                    }
                },

                State::HeaderValueStart => {
                    // At most one leading SP / HTAB is dropped.
                    state = State::HeaderValue;
                    if c != b' ' && c != b'\t' {
                        continue;
                    }
                }

                State::HeaderValue => {
                    let rest = &buf[i..];
                    let Some(end) = rest.iter().position(|&b| b == b'\r' || b == b'\n') else {
                        if rest.len() > self.config.max_header_line_size {
                            return Err(self.fail(ErrorKind::HeaderOverflow, i));
                        }
                        return Ok(self.suspend(state, i));
                    };
                    let value = &rest[..end];
                    self.field(settings.on_header_value, value);
                    if let Err(kind) = self.apply_header_value(value) {
                        return Err(self.fail(kind, i));
                    }
                    state = if rest[end] == b'\r' {
                        State::HeaderValueLf
                    } else {
                        State::HeaderField
                    };
                    i += end + 1;
                    continue;
                }

                State::HeaderValueLf => {
                    state = State::HeaderField;
                    if c != b'\n' {
                        continue;
                    }
                }

                State::HeadersAlmostDone => {
                    if c != b'\n' {
                        return Err(self.fail(ErrorKind::MissingLineFeed, i));
                    }
                    state = if self.flags.trailers {
                        self.complete(settings)
                    } else {
                        self.headers_done(settings)
                    };
                }

                // ===================== BODY =====================
                State::Body => {
                    let n = self.take_body(settings, &buf[i..]);
                    i += n;
                    if self.remaining == 0 {
                        state = self.complete(settings);
                    }
                    continue;
                }

                State::BodyUntilEof => {
                    self.data(settings.on_body, &buf[i..]);
                    i = buf.len();
                    continue;
                }

                // ===================== CHUNKED ENCODING =====================
                State::ChunkSizeStart => {
                    let Some(v) = unhex(c) else {
                        return Err(self.fail(ErrorKind::InvalidChunkSize, i));
                    };
                    self.remaining = u64::from(v);
                    state = State::ChunkSize;
                }

                State::ChunkSize => match c {
                    b'\r' => state = State::ChunkSizeLf,
                    b'\n' => {
                        state = State::ChunkSizeLf;
                        continue;
                    }
                    b';' | b' ' | b'\t' => state = State::ChunkExt,
                    _ => {
                        let size = unhex(c).and_then(|v| {
                            self.remaining
                                .checked_mul(16)
                                .and_then(|r| r.checked_add(u64::from(v)))
                        });
                        match size {
                            Some(size) => self.remaining = size,
                            None => return Err(self.fail(ErrorKind::InvalidChunkSize, i)),
                        }
                    }
                },

                // Chunk extensions are skipped.
                State::ChunkExt => match c {
                    b'\r' => state = State::ChunkSizeLf,
                    b'\n' => {
                        state = State::ChunkSizeLf;
                        continue;
                    }
                    _ => {}
                },

                State::ChunkSizeLf => {
                    if c != b'\n' {
                        return Err(self.fail(ErrorKind::MissingLineFeed, i));
                    }
                    if self.remaining == 0 {
                        // Last chunk; whatever follows is the trailer section.
                        self.flags.trailers = true;
                        state = State::HeaderField;
                    } else {
                        state = State::ChunkData;
                    }
                }

                State::ChunkData => {
                    let n = self.take_body(settings, &buf[i..]);
                    i += n;
                    if self.remaining == 0 {
                        state = State::ChunkDataEnd;
                    }
                    continue;
                }

                State::ChunkDataEnd => match c {
                    b'\r' => state = State::ChunkDataLf,
                    b'\n' => {
                        state = State::ChunkDataLf;
                        continue;
                    }
                    _ => return Err(self.fail(ErrorKind::MissingLineFeed, i)),
                },

                State::ChunkDataLf => {
                    if c != b'\n' {
                        return Err(self.fail(ErrorKind::MissingLineFeed, i));
                    }
                    state = State::ChunkSizeStart;
                }

                // ===================== BETWEEN MESSAGES =====================
                State::MessageDone => {
                    if c != b'\r' && c != b'\n' {
                        if self.should_keep_alive() {
                            self.reset();
                            state = self.state;
                        } else {
                            debug!("connection closed after message, refusing further input");
                            state = State::Dead;
                        }
                        continue;
                    }
                }

                State::Upgraded => break,

                State::Dead => {
                    warning!("input after connection close: {} bytes dropped", buf.len() - i);
                    return Err(self.fail(ErrorKind::Closed, i));
                }
            }

            i += 1;
        }

        self.state = state;
        Ok(i)
    }

    fn execute_eof(&mut self, settings: &Settings<T>) -> Result<usize, ParseError> {
        match self.state {
            State::BodyUntilEof => {
                self.complete(settings);
                self.state = if self.upgraded { State::Upgraded } else { State::Dead };
                Ok(0)
            }
            state if state.at_boundary() => Ok(0),
            _ => Err(self.fail(ErrorKind::UnexpectedEof, 0)),
        }
    }

    // ----- helpers --------------------------------------------------------

    fn suspend(&mut self, state: State, at: usize) -> usize {
        self.state = state;
        at
    }

    fn fail(&mut self, kind: ErrorKind, at: usize) -> ParseError {
        debug!("parse error: {} at byte {}", kind, at);
        self.state = State::Dead;
        ParseError::new(kind, at)
    }

    #[inline]
    fn notify(&mut self, callback: Option<NotifyCallback<T>>) {
        if let Some(callback) = callback {
            callback(self);
        }
    }

    /// Deliver a non-empty payload; empty payloads are dropped.
    #[inline]
    fn data(&mut self, callback: Option<DataCallback<T>>, data: &[u8]) {
        if let Some(callback) = callback {
            if !data.is_empty() {
                callback(self, data);
            }
        }
    }

    /// Deliver a header name or value, empty or not.
    #[inline]
    fn field(&mut self, callback: Option<DataCallback<T>>, data: &[u8]) {
        if let Some(callback) = callback {
            callback(self, data);
        }
    }

    /// Deliver up to `remaining` body bytes from `rest`, returning how many.
    fn take_body(&mut self, settings: &Settings<T>, rest: &[u8]) -> usize {
        let n = rest.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        self.data(settings.on_body, &rest[..n]);
        self.remaining -= n as u64;
        n
    }

    /// Decide what the header value that follows `name` means for framing.
    fn classify_header(&mut self, name: &[u8]) {
        self.header_kind = HeaderKind::General;
        if self.flags.trailers {
            return;
        }
        let name = name.trim_ascii_end();
        if name.eq_ignore_ascii_case(b"content-length") {
            self.header_kind = HeaderKind::ContentLength;
        } else if name.eq_ignore_ascii_case(b"transfer-encoding") {
            self.header_kind = HeaderKind::TransferEncoding;
        } else if name.eq_ignore_ascii_case(b"connection") {
            self.header_kind = HeaderKind::Connection;
        } else if name.eq_ignore_ascii_case(b"upgrade") {
            self.flags.upgrade_header = true;
        }
    }

    fn apply_header_value(&mut self, value: &[u8]) -> Result<(), ErrorKind> {
        match mem::take(&mut self.header_kind) {
            HeaderKind::General => {}
            HeaderKind::Connection => {
                for token in value.split(|&b| b == b',') {
                    let token = token.trim_ascii();
                    if contains_ignore_case(token, b"close") {
                        self.flags.connection_close = true;
                    } else if token.eq_ignore_ascii_case(b"upgrade") {
                        self.flags.connection_upgrade = true;
                    } else if token.eq_ignore_ascii_case(b"keep-alive") {
                        self.flags.connection_keep_alive = true;
                    }
                }
            }
            HeaderKind::ContentLength => {
                let length =
                    parse_content_length(value.trim_ascii()).ok_or(ErrorKind::InvalidContentLength)?;
                match self.content_length {
                    Some(previous) if previous != length => {
                        return Err(ErrorKind::InvalidContentLength);
                    }
                    _ => self.content_length = Some(length),
                }
            }
            HeaderKind::TransferEncoding => {
                if contains_ignore_case(value, b"chunked") {
                    self.flags.chunked = true;
                }
            }
        }
        Ok(())
    }

    /// Blank line after the headers: settle upgrade and framing.
    fn headers_done(&mut self, settings: &Settings<T>) -> State {
        self.upgraded = if self.flags.upgrade_header && self.flags.connection_upgrade {
            self.current == MessageKind::Request || self.status_code == 101
        } else {
            self.method == Some(Method::CONNECT)
        };
        let has_body = self.flags.chunked || self.content_length.is_some();

        self.notify(settings.on_headers_complete);

        if (self.upgraded && !has_body) || self.method == Some(Method::CONNECT) {
            self.framing = Some(Framing::Empty);
            return self.complete(settings);
        }

        let framing = self.decide_framing();
        self.framing = Some(framing);
        match framing {
            Framing::Empty | Framing::Length(0) => self.complete(settings),
            Framing::Length(n) => {
                self.remaining = n;
                State::Body
            }
            Framing::Chunked => State::ChunkSizeStart,
            Framing::UntilClose => State::BodyUntilEof,
        }
    }

    fn decide_framing(&self) -> Framing {
        if self.flags.chunked {
            return Framing::Chunked;
        }
        if let Some(length) = self.content_length {
            return Framing::Length(length);
        }
        if self.current != MessageKind::Response {
            return Framing::Empty;
        }
        match self.status_code {
            100..=199 | 204 | 304 => Framing::Empty,
            _ => Framing::UntilClose,
        }
    }

    /// Fire `MessageComplete` and pick the state that follows the message.
    fn complete(&mut self, settings: &Settings<T>) -> State {
        self.flags.message_complete = true;
        self.notify(settings.on_message_complete);
        if self.upgraded {
            debug!("protocol upgraded, leaving HTTP framing");
            State::Upgraded
        } else {
            State::MessageDone
        }
    }

    // ----- public query ---------------------------------------------------

    /// The [`MessageKind`] this parser was created with.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Kind of the message in progress (or last completed). For
    /// [`MessageKind::Either`] parsers this stays `Either` until the first
    /// byte of a message has been seen.
    pub fn message_kind(&self) -> MessageKind {
        self.current
    }

    /// Request method, once the method token and its delimiter were seen.
    pub fn method(&self) -> Option<Method> {
        self.method
    }

    /// Parsed protocol version (`0.0` before the version is seen).
    pub fn version(&self) -> Version {
        Version::new(self.major, self.minor)
    }

    pub fn http_major(&self) -> u8 {
        self.major
    }

    pub fn http_minor(&self) -> u8 {
        self.minor
    }

    /// Response status code (`0` for requests).
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Value of the `Content-Length` header, if one was seen. `Some(0)` is
    /// distinct from an absent header.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Body framing, decided once the header section is complete.
    pub fn framing(&self) -> Option<Framing> {
        self.framing
    }

    /// Whether the connection may carry another message after this one.
    pub fn should_keep_alive(&self) -> bool {
        if self.flags.connection_close {
            return false;
        }
        if self.major == 0 && self.minor == 0 {
            // Version never observed.
            return true;
        }
        if (self.major, self.minor) >= (1, 1) {
            return true;
        }
        self.flags.connection_keep_alive
    }

    /// Whether the current message switched the connection to another
    /// protocol (`CONNECT`, or a negotiated `Upgrade`).
    pub fn is_upgrade(&self) -> bool {
        self.upgraded
    }

    /// `true` once the upgrading message is complete: every byte past the
    /// count returned by `execute`, and all later reads, belong to the new
    /// protocol.
    pub fn ready_upgrade_data(&self) -> bool {
        self.flags.message_complete && self.upgraded
    }

    /// Name of the automaton state, for diagnostics.
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Change the header line limit. Takes effect from the next scan.
    pub fn set_max_header_line_size(&mut self, size: usize) {
        self.config.max_header_line_size = size;
    }

    // ----- user data ------------------------------------------------------

    pub fn user_data(&self) -> &T {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut T {
        &mut self.user_data
    }

    pub fn set_user_data(&mut self, user_data: T) {
        self.user_data = user_data;
    }

    pub fn into_user_data(self) -> T {
        self.user_data
    }
}

impl<T: Default> Default for Parser<T> {
    fn default() -> Self {
        Self::new(MessageKind::Either)
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Strict non-negative decimal: at least one digit, nothing else.
fn parse_content_length(value: &[u8]) -> Option<u64> {
    if value.is_empty() {
        return None;
    }
    value.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
