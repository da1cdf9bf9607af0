use std::mem;

use crate::parser::{MessageKind, Parser};
use crate::settings::Settings;
use crate::types::{Header, Message};

/// Parser user data that assembles callback events into owned
/// [`Message`]s.
///
/// ```rust
/// use wirehook::{Collector, MessageKind, Parser};
///
/// let mut parser = Parser::<Collector>::new(MessageKind::Request);
/// parser
///     .execute(&Collector::SETTINGS, b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n")
///     .unwrap();
///
/// let urls: Vec<_> = parser.user_data().messages().iter().map(|m| m.url.as_str()).collect();
/// assert_eq!(urls, ["/a", "/b"]);
/// ```
#[derive(Debug, Default)]
pub struct Collector {
    messages: Vec<Message>,
    draft: Draft,
}

/// Raw pieces of the message in progress.
#[derive(Debug, Default)]
struct Draft {
    url: Vec<u8>,
    reason: Vec<u8>,
    field: Vec<u8>,
    headers: Vec<Header>,
    trailers: Vec<Header>,
    in_trailers: bool,
    body: Option<Vec<u8>>,
}

impl Collector {
    /// Callback table wiring every event into the collector.
    pub const SETTINGS: Settings<Collector> = Settings {
        on_message_begin: Some(Self::on_message_begin),
        on_url: Some(Self::on_url),
        on_status: Some(Self::on_status),
        on_header_field: Some(Self::on_header_field),
        on_header_value: Some(Self::on_header_value),
        on_headers_complete: Some(Self::on_headers_complete),
        on_body: Some(Self::on_body),
        on_message_complete: Some(Self::on_message_complete),
    };

    /// Messages completed so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Move the completed messages out, leaving the collector empty.
    pub fn take_messages(&mut self) -> Vec<Message> {
        mem::take(&mut self.messages)
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    fn on_message_begin(p: &mut Parser<Self>) {
        p.user_data_mut().draft = Draft::default();
    }

    fn on_url(p: &mut Parser<Self>, data: &[u8]) {
        p.user_data_mut().draft.url.extend_from_slice(data);
    }

    fn on_status(p: &mut Parser<Self>, data: &[u8]) {
        p.user_data_mut().draft.reason.extend_from_slice(data);
    }

    fn on_header_field(p: &mut Parser<Self>, data: &[u8]) {
        let field = &mut p.user_data_mut().draft.field;
        field.clear();
        field.extend_from_slice(data);
    }

    fn on_header_value(p: &mut Parser<Self>, data: &[u8]) {
        let draft = &mut p.user_data_mut().draft;
        let header = Header {
            name: String::from_utf8_lossy(&draft.field).into_owned(),
            value: String::from_utf8_lossy(data).into_owned(),
        };
        if draft.in_trailers {
            draft.trailers.push(header);
        } else {
            draft.headers.push(header);
        }
    }

    fn on_headers_complete(p: &mut Parser<Self>) {
        p.user_data_mut().draft.in_trailers = true;
    }

    fn on_body(p: &mut Parser<Self>, data: &[u8]) {
        p.user_data_mut()
            .draft
            .body
            .get_or_insert_with(Vec::new)
            .extend_from_slice(data);
    }

    fn on_message_complete(p: &mut Parser<Self>) {
        let draft = mem::take(&mut p.user_data_mut().draft);
        let kind = p.message_kind();
        let response = kind == MessageKind::Response;

        let message = Message {
            kind,
            method: p.method(),
            url: String::from_utf8_lossy(&draft.url).into_owned(),
            status_code: response.then(|| p.status_code()),
            reason: response.then(|| String::from_utf8_lossy(&draft.reason).into_owned()),
            version: p.version(),
            headers: draft.headers,
            trailers: draft.trailers,
            framing: p.framing(),
            body: draft.body,
            keep_alive: p.should_keep_alive(),
            upgrade: p.is_upgrade(),
        };
        p.user_data_mut().messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Framing;

    #[test]
    fn collects_response_with_trailers() {
        let mut parser = Parser::<Collector>::new(MessageKind::Response);
        let data = b"HTTP/1.1 200 OK\r\n\
            Transfer-Encoding: chunked\r\n\
            \r\n\
            3\r\nabc\r\n\
            0\r\n\
            Expires: never\r\n\
            \r\n";
        assert_eq!(parser.execute(&Collector::SETTINGS, data).unwrap(), data.len());

        let messages = parser.into_user_data().into_messages();
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.status_code, Some(200));
        assert_eq!(message.reason.as_deref(), Some("OK"));
        assert_eq!(message.framing, Some(Framing::Chunked));
        assert_eq!(message.body_as_str(), Some("abc"));
        assert_eq!(message.headers.len(), 1);
        assert_eq!(message.trailer_value("expires"), Some("never"));
    }

    #[test]
    fn take_messages_drains() {
        let mut parser = Parser::<Collector>::new(MessageKind::Request);
        parser
            .execute(&Collector::SETTINGS, b"GET / HTTP/1.1\r\n\r\n")
            .unwrap();
        assert_eq!(parser.user_data_mut().take_messages().len(), 1);
        assert!(parser.user_data().messages().is_empty());
    }
}
