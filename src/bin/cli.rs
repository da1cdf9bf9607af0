use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};

use wirehook::{
    DEFAULT_MAX_HEADER_LINE_SIZE, MessageKind, ParserConfig, format_debug, format_headers_only,
    format_json, parse_messages_chunked, parse_messages_with_config,
};

/// WireHook CLI: incremental HTTP/1.x message parser.
///
/// Reads a raw HTTP capture (one or more pipelined requests and/or
/// responses) from a file, --raw string, or stdin and outputs a structured
/// representation in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP message as a single shell argument.
#[derive(ClapParser)]
#[command(name = "wirehook-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw HTTP capture.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP capture string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Which messages the capture holds.
    #[arg(short, long, default_value = "either", value_enum)]
    kind: Kind,

    /// Feed the parser in reads of at most this many bytes.
    #[arg(short, long)]
    chunk_size: Option<usize>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum length of an unterminated header name or value.
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_LINE_SIZE)]
    max_header_line_size: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Kind {
    /// Requests only
    Request,
    /// Responses only
    Response,
    /// Detect per message
    Either,
}

impl From<Kind> for MessageKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Request => MessageKind::Request,
            Kind::Response => MessageKind::Response,
            Kind::Either => MessageKind::Either,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Start line + headers only
    Headers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        max_header_line_size: cli.max_header_line_size,
    };
    let kind = MessageKind::from(cli.kind);

    let result = match cli.chunk_size {
        Some(size) => parse_messages_chunked(kind, &data, config, size),
        None => parse_messages_with_config(kind, &data, config),
    };
    let parsed = match result {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(2);
        }
    };

    let output = match cli.format {
        OutputFormat::Json => format_json(&parsed, cli.pretty),
        OutputFormat::Debug => format_debug(&parsed),
        OutputFormat::Headers => format_headers_only(&parsed),
    };

    print!("{output}");
    if matches!(cli.format, OutputFormat::Json) {
        println!();
    }
}

/// Read the capture from --raw, FILE, or stdin, in that order of preference.
fn read_input(cli: &Cli) -> io::Result<Vec<u8>> {
    match (&cli.raw, &cli.file) {
        (Some(raw), _) => Ok(unescape(raw).into_bytes()),
        (None, Some(path)) => fs::read(path),
        (None, None) => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand `\r`, `\n`, `\t` and `\\`; any other backslash is literal.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        let expanded = match (ch, chars.peek()) {
            ('\\', Some('r')) => '\r',
            ('\\', Some('n')) => '\n',
            ('\\', Some('t')) => '\t',
            ('\\', Some('\\')) => '\\',
            _ => {
                out.push(ch);
                continue;
            }
        };
        chars.next();
        out.push(expanded);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_expands_line_breaks() {
        assert_eq!(unescape(r"GET / HTTP/1.1\r\n\r\n"), "GET / HTTP/1.1\r\n\r\n");
        assert_eq!(unescape(r"a\tb\\c\q"), "a\tb\\c\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
