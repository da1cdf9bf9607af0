use crate::parser::Parser;

/// Callback receiving a borrowed view into the buffer passed to
/// [`Parser::execute`]. The slice is only valid for the duration of the call.
pub type DataCallback<T> = fn(&mut Parser<T>, &[u8]);

/// Callback signalling a structural boundary.
pub type NotifyCallback<T> = fn(&mut Parser<T>);

/// Table of optional observers invoked synchronously by
/// [`Parser::execute`].
///
/// Plain function pointers are used so a table can be built once as a
/// `static` or associated `const` and shared by every connection;
/// per-connection state lives in the parser's user data
/// ([`Parser::user_data_mut`]).
///
/// ```rust
/// use wirehook::{MessageKind, Parser, Settings};
///
/// #[derive(Default)]
/// struct Seen {
///     url: Vec<u8>,
///     done: bool,
/// }
///
/// fn on_url(p: &mut Parser<Seen>, data: &[u8]) {
///     p.user_data_mut().url.extend_from_slice(data);
/// }
///
/// fn on_message_complete(p: &mut Parser<Seen>) {
///     p.user_data_mut().done = true;
/// }
///
/// const SETTINGS: Settings<Seen> = Settings {
///     on_url: Some(on_url),
///     on_message_complete: Some(on_message_complete),
///     ..Settings::new()
/// };
///
/// let mut parser = Parser::<Seen>::new(MessageKind::Request);
/// parser.execute(&SETTINGS, b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();
/// assert_eq!(parser.user_data().url, b"/index.html");
/// assert!(parser.user_data().done);
/// ```
pub struct Settings<T> {
    /// First byte of a new message recognized.
    pub on_message_begin: Option<NotifyCallback<T>>,
    /// Request-target bytes (request only). May be split into several
    /// non-empty fragments at buffer boundaries.
    pub on_url: Option<DataCallback<T>>,
    /// Reason-phrase bytes (response only). May be split like `on_url`.
    pub on_status: Option<DataCallback<T>>,
    /// Complete header or trailer name, up to the `:`.
    pub on_header_field: Option<DataCallback<T>>,
    /// Complete header or trailer value, up to the line end.
    pub on_header_value: Option<DataCallback<T>>,
    /// Blank line ending the header section reached.
    pub on_headers_complete: Option<NotifyCallback<T>>,
    /// Body bytes, content-length framed, chunk data or read-to-EOF.
    pub on_body: Option<DataCallback<T>>,
    /// Message fully parsed.
    pub on_message_complete: Option<NotifyCallback<T>>,
}

impl<T> Settings<T> {
    /// A table with every callback absent.
    pub const fn new() -> Self {
        Self {
            on_message_begin: None,
            on_url: None,
            on_status: None,
            on_header_field: None,
            on_header_value: None,
            on_headers_complete: None,
            on_body: None,
            on_message_complete: None,
        }
    }
}

impl<T> Default for Settings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Settings<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Settings<T> {}
