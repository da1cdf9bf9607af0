//! # WireHook
//!
//! An **incremental, callback-driven HTTP/1.x message parser** implemented
//! as a single resumable state machine, usable both as a Rust library and
//! as a CLI tool.
//!
//! The parser consumes requests, responses, or an auto-detected mix from
//! arbitrarily fragmented input. It never copies or buffers message data:
//! every piece is delivered as a borrowed slice of the caller's buffer to a
//! table of optional callbacks ([`Settings`]). When input ends in the
//! middle of something that must be seen whole, `execute` reports how much
//! it consumed and the caller re-presents the rest with the next read.
//!
//! Supported framing: `Content-Length`, `Transfer-Encoding: chunked` (with
//! extensions and trailers), read-until-close, keep-alive pipelining and
//! protocol upgrade (`Upgrade` / `CONNECT`).
//!
//! ## Quick start: one-shot parsing
//!
//! ```rust
//! use wirehook::{MessageKind, parse_messages};
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let parsed = parse_messages(MessageKind::Request, raw).expect("valid request");
//! let request = &parsed.messages[0];
//! assert_eq!(request.method.map(|m| m.as_str()), Some("GET"));
//! assert_eq!(request.url, "/hello");
//! ```
//!
//! ## Quick start: callbacks
//!
//! ```rust
//! use wirehook::{MessageKind, Parser, Settings};
//!
//! fn on_header_field(p: &mut Parser<usize>, _name: &[u8]) {
//!     *p.user_data_mut() += 1;
//! }
//!
//! let settings: Settings<usize> = Settings {
//!     on_header_field: Some(on_header_field),
//!     ..Settings::new()
//! };
//!
//! let mut parser = Parser::<usize>::new(MessageKind::Request);
//! let used = parser.execute(&settings, b"GET / HTTP/1.1\r\nHost: a\r\nAcc").unwrap();
//! assert_eq!(*parser.user_data(), 1);
//!
//! // "Acc" was not consumed; present it again with the rest of the stream.
//! parser.execute(&settings, b"Accept: */*\r\n\r\n").unwrap();
//! assert_eq!(used, 25);
//! assert_eq!(*parser.user_data(), 2);
//! ```

mod collect;
mod error;
mod log;
mod method;
mod output;
mod parser;
mod settings;
mod tables;
mod twobuf;
mod types;

// Re-export public API.
pub use collect::Collector;
pub use error::{ErrorKind, ParseError};
pub use method::Method;
pub use output::{format_debug, format_headers_only, format_json};
pub use parser::{DEFAULT_MAX_HEADER_LINE_SIZE, Framing, MessageKind, Parser, ParserConfig};
pub use settings::{DataCallback, NotifyCallback, Settings};
pub use twobuf::{CarryOverflow, TwoBuf};
pub use types::{Header, Message, Parsed, Version};

use crate::method::MAX_METHOD_LEN;

/// Parse a **complete** capture from a byte slice in one call.
///
/// This is a convenience wrapper around [`Parser`] and [`Collector`]. For
/// incremental / streaming use-cases, create a `Parser` directly.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed or ends inside a
/// message.
pub fn parse_messages(kind: MessageKind, data: &[u8]) -> Result<Parsed, ParseError> {
    parse_messages_with_config(kind, data, ParserConfig::default())
}

/// Parse a **complete** capture using custom [`ParserConfig`] limits.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed, ends inside a message,
/// or exceeds the configured limits.
pub fn parse_messages_with_config(
    kind: MessageKind,
    data: &[u8],
    config: ParserConfig,
) -> Result<Parsed, ParseError> {
    let mut parser = Parser::<Collector>::with_config(kind, config);
    let consumed = parser.execute(&Collector::SETTINGS, data)?;

    if parser.ready_upgrade_data() {
        return Ok(collected(parser, consumed, Some(data[consumed..].to_vec())));
    }
    if consumed < data.len() {
        return Err(ParseError::new(ErrorKind::UnexpectedEof, consumed));
    }
    parser
        .execute(&Collector::SETTINGS, &[])
        .map_err(|e| ParseError::new(e.kind(), consumed))?;
    Ok(collected(parser, consumed, None))
}

/// Parse a capture as if it arrived in reads of at most `chunk_size`
/// bytes, carrying unconsumed tails between reads through a [`TwoBuf`].
///
/// Messages come out the same as from [`parse_messages_with_config`] for
/// every `chunk_size`, except that `max_header_line_size` can only be
/// exceeded by a header line that straddles a read. Error offsets are
/// relative to `data`.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed, ends inside a message,
/// or exceeds the configured limits.
pub fn parse_messages_chunked(
    kind: MessageKind,
    data: &[u8],
    config: ParserConfig,
    chunk_size: usize,
) -> Result<Parsed, ParseError> {
    let chunk = chunk_size.clamp(1, data.len().max(1));
    // The longest tail the parser leaves behind is an unterminated header
    // line at the limit, or a method token. It never outgrows the input.
    let carry = config
        .max_header_line_size
        .max(MAX_METHOD_LEN)
        .min(data.len());
    let mut twobuf = TwoBuf::new(chunk.max(carry));

    let mut parser = Parser::<Collector>::with_config(kind, config);
    let mut read = 0;
    let mut consumed = 0;

    while read < data.len() {
        let n = chunk.min(data.len() - read);
        twobuf.right_mut()[..n].copy_from_slice(&data[read..read + n]);
        read += n;

        let window = twobuf.window(n);
        let used = parser
            .execute(&Collector::SETTINGS, window)
            .map_err(|e| ParseError::new(e.kind(), consumed + e.offset()))?;
        consumed += used;

        if parser.ready_upgrade_data() {
            let mut rest = window[used..].to_vec();
            rest.extend_from_slice(&data[read..]);
            return Ok(collected(parser, consumed, Some(rest)));
        }

        twobuf
            .retain(n, used)
            .map_err(|_| ParseError::new(ErrorKind::HeaderOverflow, consumed))?;
    }

    if twobuf.carried() > 0 {
        return Err(ParseError::new(ErrorKind::UnexpectedEof, consumed));
    }
    parser
        .execute(&Collector::SETTINGS, &[])
        .map_err(|e| ParseError::new(e.kind(), consumed))?;
    Ok(collected(parser, consumed, None))
}

fn collected(parser: Parser<Collector>, consumed: usize, upgrade: Option<Vec<u8>>) -> Parsed {
    Parsed {
        messages: parser.into_user_data().into_messages(),
        consumed,
        upgrade,
    }
}
