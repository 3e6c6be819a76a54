use std::fmt;

use crate::config::Limits;
use crate::http::request::{Method, Request};

/// A request field with a configured capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Method,
    Target,
    Query,
    Cookie,
    Body,
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No space after the method token
    MissingMethodSeparator,
    /// Empty request target
    MissingTarget,
    /// No `\r\n\r\n` between head and body
    MissingHeaderTerminator,
    /// Request head is not valid UTF-8
    InvalidEncoding,
    /// Target or an echoed header value contains an ASCII control character
    ControlCharacter { field: Field },
    /// A field is longer than its configured capacity
    TooLarge { field: Field, len: usize, limit: usize },
}

impl ParseError {
    /// Oversized requests are dropped without a response; everything else
    /// is answered with 400.
    pub fn is_too_large(&self) -> bool {
        matches!(self, ParseError::TooLarge { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingMethodSeparator => f.write_str("missing method separator"),
            ParseError::MissingTarget => f.write_str("missing request target"),
            ParseError::MissingHeaderTerminator => f.write_str("missing blank line after headers"),
            ParseError::InvalidEncoding => f.write_str("request head is not valid UTF-8"),
            ParseError::ControlCharacter { field } => {
                write!(f, "{:?} contains a control character", field)
            }
            ParseError::TooLarge { field, len, limit } => {
                write!(f, "{:?} is {} bytes, limit is {}", field, len, limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

const COOKIE_PREFIX: &str = "Cookie: ";
const CONNECTION_PREFIX: &str = "Connection: ";

/// Byte offsets of the request line tokens.
struct RequestLine {
    /// End of the method token (the first space)
    method_end: usize,
    /// End of the target token
    target_end: usize,
    /// End of the line
    line_end: usize,
}

/// Tokenizes one request message.
///
/// The request line is bounds-checked before anything else, so an oversized
/// method or target is reported as too large even when the message was cut
/// off before its blank line. The returned request borrows from `buf`; no
/// state is kept between calls.
pub fn parse_http_request<'a>(buf: &'a [u8], limits: &Limits) -> Result<Request<'a>, ParseError> {
    let request_line = scan_request_line(buf, limits)?;

    // Look for header/body separator
    let headers_end = find(buf, b"\r\n\r\n").ok_or(ParseError::MissingHeaderTerminator)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let head = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidEncoding)?;

    // Offsets sit on ASCII spaces or CRs, so they are char boundaries.
    let method_str = &head[..request_line.method_end];
    let target = &head[request_line.method_end + 1..request_line.target_end];
    let version = head
        .get(request_line.target_end + 1..request_line.line_end)
        .filter(|v| !v.is_empty());

    reject_controls(Field::Target, target)?;

    let query = match target.split_once('?') {
        Some((_, raw)) => parse_query(raw),
        None => Vec::new(),
    };

    // Headers
    let mut cookie = None;
    let mut connection = None;

    for line in head[request_line.line_end..].split("\r\n") {
        if cookie.is_none() {
            if let Some(value) = line.strip_prefix(COOKIE_PREFIX) {
                let value = trim_trailing_controls(value);
                check_len(Field::Cookie, value.len(), limits.cookie)?;
                reject_controls(Field::Cookie, value)?;
                cookie = Some(value);
                continue;
            }
        }

        if connection.is_none() {
            if let Some(value) = line.strip_prefix(CONNECTION_PREFIX) {
                connection = Some(value);
            }
        }
    }

    // Body
    let method = Method::parse(method_str);
    let body = if method == Method::POST && !body_bytes.is_empty() {
        check_len(Field::Body, body_bytes.len(), limits.body)?;
        Some(body_bytes)
    } else {
        None
    };

    Ok(Request {
        method,
        target,
        query,
        cookie,
        body,
        version,
        connection,
    })
}

/// Splits a raw query string into ordered `(key, value)` pairs.
///
/// A group without `=` keeps its key with an empty value; empty groups
/// (`a=1&&b=2`) carry no key and are skipped.
pub fn parse_query(raw: &str) -> Vec<(&str, &str)> {
    raw.split('&')
        .filter(|group| !group.is_empty())
        .map(|group| group.split_once('=').unwrap_or((group, "")))
        .collect()
}

/// Locates the request line tokens and enforces the method, target and
/// query capacities on raw bytes.
///
/// The line ends at the first `\r\n`, or at the end of the buffer when a
/// read was cut short.
fn scan_request_line(buf: &[u8], limits: &Limits) -> Result<RequestLine, ParseError> {
    let line_end = find(buf, b"\r\n").unwrap_or(buf.len());
    let line = &buf[..line_end];

    let method_end = position(line, b' ').ok_or(ParseError::MissingMethodSeparator)?;
    if method_end == 0 {
        return Err(ParseError::MissingMethodSeparator);
    }
    check_len(Field::Method, method_end, limits.method)?;

    let rest = &line[method_end + 1..];
    let target_len = position(rest, b' ').unwrap_or(rest.len());
    if target_len == 0 {
        return Err(ParseError::MissingTarget);
    }
    check_len(Field::Target, target_len, limits.target)?;

    let target = &rest[..target_len];
    if let Some(q) = position(target, b'?') {
        check_len(Field::Query, target_len - q - 1, limits.query)?;
    }

    Ok(RequestLine {
        method_end,
        target_end: method_end + 1 + target_len,
        line_end,
    })
}

fn check_len(field: Field, len: usize, limit: usize) -> Result<(), ParseError> {
    if len > limit {
        return Err(ParseError::TooLarge { field, len, limit });
    }
    Ok(())
}

// A bare CR would otherwise reach response headers such as Set-Cookie.
fn reject_controls(field: Field, value: &str) -> Result<(), ParseError> {
    if value.bytes().any(|b| b.is_ascii_control()) {
        return Err(ParseError::ControlCharacter { field });
    }
    Ok(())
}

fn trim_trailing_controls(value: &str) -> &str {
    value.trim_end_matches(|c: char| c.is_ascii_control())
}

fn position(buf: &[u8], byte: u8) -> Option<usize> {
    buf.iter().position(|&b| b == byte)
}

fn find(buf: &[u8], needle: &[u8]) -> Option<usize> {
    buf.windows(needle.len())
        .position(|w| w == needle)
}
