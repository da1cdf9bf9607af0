#![allow(dead_code)]

use wirehook::{MessageKind, ParseError, Parser, Settings};

/// One observed callback. URL, status and body fragments that arrive back
/// to back are merged, so equal streams give equal event lists however
/// the input was split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Begin,
    Url(Vec<u8>),
    Status(Vec<u8>),
    Field(Vec<u8>),
    Value(Vec<u8>),
    HeadersComplete,
    Body(Vec<u8>),
    Complete,
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub const SETTINGS: Settings<Recorder> = Settings {
        on_message_begin: Some(on_message_begin),
        on_url: Some(on_url),
        on_status: Some(on_status),
        on_header_field: Some(on_header_field),
        on_header_value: Some(on_header_value),
        on_headers_complete: Some(on_headers_complete),
        on_body: Some(on_body),
        on_message_complete: Some(on_message_complete),
    };
}

fn on_message_begin(p: &mut Parser<Recorder>) {
    p.user_data_mut().events.push(Event::Begin);
}

fn on_url(p: &mut Parser<Recorder>, data: &[u8]) {
    append(p, Event::Url, data);
}

fn on_status(p: &mut Parser<Recorder>, data: &[u8]) {
    append(p, Event::Status, data);
}

fn on_header_field(p: &mut Parser<Recorder>, data: &[u8]) {
    p.user_data_mut().events.push(Event::Field(data.to_vec()));
}

fn on_header_value(p: &mut Parser<Recorder>, data: &[u8]) {
    p.user_data_mut().events.push(Event::Value(data.to_vec()));
}

fn on_headers_complete(p: &mut Parser<Recorder>) {
    p.user_data_mut().events.push(Event::HeadersComplete);
}

fn on_body(p: &mut Parser<Recorder>, data: &[u8]) {
    append(p, Event::Body, data);
}

fn on_message_complete(p: &mut Parser<Recorder>) {
    p.user_data_mut().events.push(Event::Complete);
}

fn append(p: &mut Parser<Recorder>, wrap: fn(Vec<u8>) -> Event, data: &[u8]) {
    assert!(!data.is_empty(), "empty fragment delivered");
    let events = &mut p.user_data_mut().events;
    let merged = match (events.last_mut(), wrap(Vec::new())) {
        (Some(Event::Url(buf)), Event::Url(_))
        | (Some(Event::Status(buf)), Event::Status(_))
        | (Some(Event::Body(buf)), Event::Body(_)) => {
            buf.extend_from_slice(data);
            true
        }
        _ => false,
    };
    if !merged {
        events.push(wrap(data.to_vec()));
    }
}

/// What a whole stream produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub events: Vec<Event>,
    /// Total bytes the parser reported as consumed.
    pub consumed: usize,
    /// Bytes left for the next protocol after an upgrade.
    pub upgrade: Option<Vec<u8>>,
}

/// Feed `data` in the given segments, carrying unconsumed bytes forward the
/// way a socket reader would, then signal end of input.
pub fn feed_segments<'a>(
    kind: MessageKind,
    segments: impl IntoIterator<Item = &'a [u8]>,
) -> Result<Outcome, ParseError> {
    let mut parser = Parser::<Recorder>::new(kind);
    let mut segments = segments.into_iter();
    let mut carry = Vec::new();
    let mut consumed = 0;

    while let Some(segment) = segments.next() {
        carry.extend_from_slice(segment);
        if carry.is_empty() {
            continue;
        }
        let used = parser.execute(&Recorder::SETTINGS, &carry)?;
        consumed += used;
        carry.drain(..used);

        if parser.ready_upgrade_data() {
            for rest in segments.by_ref() {
                carry.extend_from_slice(rest);
            }
            return Ok(Outcome {
                events: parser.into_user_data().events,
                consumed,
                upgrade: Some(carry),
            });
        }
    }

    assert!(carry.is_empty(), "stream ended with {} unconsumed bytes", carry.len());
    parser.execute(&Recorder::SETTINGS, &[])?;
    Ok(Outcome {
        events: parser.into_user_data().events,
        consumed,
        upgrade: None,
    })
}

pub fn feed_whole(kind: MessageKind, data: &[u8]) -> Result<Outcome, ParseError> {
    feed_segments(kind, [data])
}

/// Split `data` at the given sorted offsets.
pub fn feed_split_at(kind: MessageKind, data: &[u8], cuts: &[usize]) -> Result<Outcome, ParseError> {
    let mut segments = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        segments.push(&data[start..cut]);
        start = cut;
    }
    segments.push(&data[start..]);
    feed_segments(kind, segments)
}

pub fn field(name: &str) -> Event {
    Event::Field(name.as_bytes().to_vec())
}

pub fn value(value: &str) -> Event {
    Event::Value(value.as_bytes().to_vec())
}

pub fn url(url: &str) -> Event {
    Event::Url(url.as_bytes().to_vec())
}

pub fn status(reason: &str) -> Event {
    Event::Status(reason.as_bytes().to_vec())
}

pub fn body(body: &[u8]) -> Event {
    Event::Body(body.to_vec())
}
