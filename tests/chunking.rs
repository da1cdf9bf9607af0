mod common;

use common::{Outcome, feed_segments, feed_split_at, feed_whole};
use proptest::prelude::*;
use wirehook::{MessageKind, ParserConfig, parse_messages_chunked, parse_messages_with_config};

// =========================================================================
// Fixtures
// =========================================================================

struct Fixture {
    name: &'static str,
    kind: MessageKind,
    raw: &'static [u8],
}

const FIXTURES: &[Fixture] = &[
    Fixture {
        name: "curl_get",
        kind: MessageKind::Request,
        raw: b"GET /test HTTP/1.1\r\n\
               User-Agent: curl/7.18.0 (i486-pc-linux-gnu) libcurl/7.18.0 OpenSSL/0.9.8g zlib/1.2.3.3 libidn/1.1\r\n\
               Host: 0.0.0.0=5000\r\n\
               Accept: */*\r\n\
               \r\n",
    },
    Fixture {
        name: "chunked_with_trailers",
        kind: MessageKind::Request,
        raw: b"POST /chunked_w_trailing_headers HTTP/1.1\r\n\
               Transfer-Encoding: chunked\r\n\
               \r\n\
               5\r\nhello\r\n\
               6\r\n world\r\n\
               0\r\n\
               Vary: *\r\n\
               Content-Type: text/plain\r\n\
               \r\n",
    },
    Fixture {
        name: "chunk_extensions",
        kind: MessageKind::Request,
        raw: b"POST /chunked_w_extensions HTTP/1.1\r\n\
               Transfer-Encoding: chunked\r\n\
               \r\n\
               5;ilovew3;somuchlove=aretheseparametersfor\r\nhello\r\n\
               6;blahblah;blah\r\n world\r\n\
               0\r\n\
               \r\n",
    },
    Fixture {
        name: "chunked_zero_padded",
        kind: MessageKind::Request,
        raw: b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n000\r\n\r\n",
    },
    Fixture {
        name: "newline_prefix",
        kind: MessageKind::Request,
        raw: b"\r\nGET /test HTTP/1.1\r\n\r\n",
    },
    Fixture {
        name: "websocket_upgrade",
        kind: MessageKind::Request,
        raw: b"GET /demo HTTP/1.1\r\n\
               Host: example.com\r\n\
               Connection: Upgrade\r\n\
               Sec-WebSocket-Key2: 12998 5 Y3 1  .P00\r\n\
               Sec-WebSocket-Protocol: sample\r\n\
               Upgrade: WebSocket\r\n\
               Sec-WebSocket-Key1: 4 @1  46546xW%0l 1 5\r\n\
               Origin: http://example.com\r\n\
               \r\n\
               Hot diggity dogg",
    },
    Fixture {
        name: "switching_protocols_length",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 101 Switching Protocols\r\n\
               Connection: upgrade\r\n\
               Upgrade: h2c\r\n\
               Content-Length: 4\r\n\
               \r\n\
               bodyproto",
    },
    Fixture {
        name: "switching_protocols_chunked",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 101 Switching Protocols\r\n\
               Connection: upgrade\r\n\
               Upgrade: h2c\r\n\
               Transfer-Encoding: chunked\r\n\
               \r\n\
               2\r\nbo\r\n\
               2\r\ndy\r\n\
               0\r\n\
               \r\n\
               proto",
    },
    Fixture {
        name: "field_with_space",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 200 OK\r\n\
               Server: Microsoft-IIS/6.0\r\n\
               X-Powered-By: ASP.NET\r\n\
               en-US Content-Type: text/xml\r\n\
               Content-Type: text/xml\r\n\
               Content-Length: 16\r\n\
               Date: Fri, 23 Jul 2010 18:45:38 GMT\r\n\
               Connection: keep-alive\r\n\
               \r\n\
               <xml>hello</xml>",
    },
    Fixture {
        name: "newline_body",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 301 MovedPermanently\r\n\
               Date: Wed, 15 May 2013 17:06:33 GMT\r\n\
               Server: Server\r\n\
               Location: https://www.amazon.com/\r\n\
               Content-Length: 1\r\n\
               \r\n\
               \n",
    },
    Fixture {
        name: "empty_reason_until_close",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 200 \r\nContent-Type: text/plain\r\n\r\nread until the end",
    },
    Fixture {
        name: "content_length_lookalike",
        kind: MessageKind::Response,
        raw: b"HTTP/1.1 200 OK\r\n\
               Content-Length-X: 0\r\n\
               Transfer-Encoding: chunked\r\n\
               \r\n\
               2\r\nOK\r\n\
               0\r\n\
               \r\n",
    },
    Fixture {
        name: "pipelined_requests",
        kind: MessageKind::Request,
        raw: b"GET /a HTTP/1.1\r\nHost: x\r\n\r\n\
               POST /b HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc\
               GET /c HTTP/1.1\r\n\r\n",
    },
    Fixture {
        name: "mixed_exchange",
        kind: MessageKind::Either,
        raw: b"HEAD /h HTTP/1.1\r\n\r\n\
               HTTP/1.1 200 OK\r\n\
               Content-Type: text/plain\r\n\
               Transfer-Encoding: chunked\r\n\
               \r\n\
               7\r\nMozilla\r\n\
               9\r\nDeveloper\r\n\
               7\r\nNetwork\r\n\
               0\r\n\
               \r\n",
    },
    Fixture {
        name: "bare_lf",
        kind: MessageKind::Request,
        raw: b"POST /lf HTTP/1.1\nContent-Length: 2\nX-Empty:\n\nok",
    },
];

fn reference(fixture: &Fixture) -> Outcome {
    feed_whole(fixture.kind, fixture.raw)
        .unwrap_or_else(|e| panic!("{}: whole input failed: {e}", fixture.name))
}

// =========================================================================
// Split-point invariance
// =========================================================================

#[test]
fn every_single_split_point() {
    for fixture in FIXTURES {
        let expected = reference(fixture);
        for cut in 0..=fixture.raw.len() {
            let got = feed_split_at(fixture.kind, fixture.raw, &[cut])
                .unwrap_or_else(|e| panic!("{} split at {cut}: {e}", fixture.name));
            assert_eq!(got, expected, "{} split at {cut}", fixture.name);
        }
    }
}

#[test]
fn one_byte_at_a_time() {
    for fixture in FIXTURES {
        let expected = reference(fixture);
        let got = feed_segments(fixture.kind, fixture.raw.chunks(1))
            .unwrap_or_else(|e| panic!("{} byte by byte: {e}", fixture.name));
        assert_eq!(got, expected, "{} byte by byte", fixture.name);
    }
}

#[test]
fn consumed_plus_upgrade_covers_input() {
    for fixture in FIXTURES {
        let out = reference(fixture);
        let tail = out.upgrade.as_ref().map_or(0, Vec::len);
        assert_eq!(out.consumed + tail, fixture.raw.len(), "{}", fixture.name);
    }
}

#[test]
fn chunked_driver_matches_one_shot() {
    for fixture in FIXTURES {
        let expected = parse_messages_with_config(fixture.kind, fixture.raw, ParserConfig::default())
            .unwrap_or_else(|e| panic!("{}: {e}", fixture.name));
        for chunk in [1, 2, 3, 5, 7, 16, 64] {
            let got =
                parse_messages_chunked(fixture.kind, fixture.raw, ParserConfig::default(), chunk)
                    .unwrap_or_else(|e| panic!("{} in {chunk}-byte reads: {e}", fixture.name));
            assert_eq!(got, expected, "{} in {chunk}-byte reads", fixture.name);
        }
    }
}

#[test]
fn errors_do_not_depend_on_splits() {
    let raw: &[u8] = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\nxyz\r\n";
    let expected = feed_whole(MessageKind::Request, raw).unwrap_err().kind();
    for cut in 0..=raw.len() {
        let err = feed_split_at(MessageKind::Request, raw, &[cut]).unwrap_err();
        assert_eq!(err.kind(), expected, "split at {cut}");
    }
}

// =========================================================================
// Random partitions
// =========================================================================

/// Turn a list of segment lengths into sorted cut offsets within `len`.
fn cuts_from_sizes(sizes: &[usize], len: usize) -> Vec<usize> {
    let mut cuts = Vec::with_capacity(sizes.len());
    let mut at = 0;
    for &size in sizes {
        at += size;
        if at >= len {
            break;
        }
        cuts.push(at);
    }
    cuts
}

proptest! {
    #[test]
    fn random_partition_gives_same_events(
        index in 0..FIXTURES.len(),
        sizes in proptest::collection::vec(0usize..48, 0..24),
    ) {
        let fixture = &FIXTURES[index];
        let expected = reference(fixture);
        let cuts = cuts_from_sizes(&sizes, fixture.raw.len());
        let got = feed_split_at(fixture.kind, fixture.raw, &cuts);
        prop_assert_eq!(got, Ok(expected), "{} cut at {:?}", fixture.name, cuts);
    }

    #[test]
    fn random_read_size_gives_same_messages(
        index in 0..FIXTURES.len(),
        chunk in 1usize..128,
    ) {
        let fixture = &FIXTURES[index];
        let expected = parse_messages_with_config(fixture.kind, fixture.raw, ParserConfig::default());
        let got = parse_messages_chunked(fixture.kind, fixture.raw, ParserConfig::default(), chunk);
        prop_assert_eq!(got, expected);
    }
}
