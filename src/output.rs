use std::fmt::Write;

use crate::types::{Header, Message, Parsed};

/// Serialize a [`Parsed`] capture to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(parsed: &Parsed, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(parsed).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(parsed).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render every message of a capture in a human-readable debug format.
pub fn format_debug(parsed: &Parsed) -> String {
    let mut out = String::with_capacity(256 * parsed.messages.len().max(1));

    for message in &parsed.messages {
        write_message_debug(&mut out, message);
    }

    if let Some(rest) = &parsed.upgrade {
        let _ = writeln!(out, "--- Upgrade Data ({} bytes) ---", rest.len());
        write_bytes(&mut out, rest);
    }

    out
}

fn write_message_debug(out: &mut String, message: &Message) {
    if message.is_request() {
        out.push_str("=== HTTP Request ===\n");
        if let Some(method) = message.method {
            let _ = writeln!(out, "Method:  {method}");
        }
        let _ = writeln!(out, "URL:     {}", message.url);
        let _ = writeln!(out, "Version: {}", message.version);
    } else {
        out.push_str("=== HTTP Response ===\n");
        let _ = writeln!(out, "Version: {}", message.version);
        if let Some(status) = message.status_code {
            let _ = writeln!(out, "Status:  {status}");
        }
        let _ = writeln!(out, "Reason:  {}", message.reason.as_deref().unwrap_or(""));
    }
    if let Some(framing) = message.framing {
        let _ = writeln!(out, "Framing: {framing:?}");
    }
    let _ = writeln!(out, "Keep-Alive: {}", message.keep_alive);
    if message.upgrade {
        out.push_str("Upgrade: yes\n");
    }

    write_fields(out, "Headers", &message.headers);
    if !message.trailers.is_empty() {
        write_fields(out, "Trailers", &message.trailers);
    }

    match &message.body {
        Some(body) => {
            let _ = writeln!(out, "\n--- Body ({} bytes) ---", body.len());
            write_bytes(out, body);
        }
        None => out.push_str("\n--- No Body ---\n"),
    }

    out.push_str("====================\n");
}

fn write_fields(out: &mut String, title: &str, fields: &[Header]) {
    let _ = writeln!(out, "\n--- {title} ({}) ---", fields.len());
    for field in fields {
        let _ = writeln!(out, "  {}: {}", field.name, field.value);
    }
}

fn write_bytes(out: &mut String, bytes: &[u8]) {
    match std::str::from_utf8(bytes) {
        Ok(s) => out.push_str(s),
        Err(_) => {
            let _ = write!(out, "<binary data: {} bytes>", bytes.len());
        }
    }
    out.push('\n');
}

/// Render only the start line and headers of each message (no body),
/// separated by blank lines.
pub fn format_headers_only(parsed: &Parsed) -> String {
    let mut out = String::with_capacity(128 * parsed.messages.len().max(1));

    for (i, message) in parsed.messages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if message.is_request() {
            let method = message.method.map_or("", |m| m.as_str());
            let _ = writeln!(out, "{method} {} {}", message.url, message.version);
        } else {
            let _ = writeln!(
                out,
                "{} {} {}",
                message.version,
                message.status_code.unwrap_or_default(),
                message.reason.as_deref().unwrap_or("")
            );
        }
        for header in &message.headers {
            let _ = writeln!(out, "{}: {}", header.name, header.value);
        }
    }

    out
}
