use crate::http::headers::Headers;
use crate::http::request::{Method, Request};

/// Errors that can occur during HTTP request parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The request line or header block is malformed
    InvalidRequest,
    /// The version field is not `HTTP/1.1`
    InvalidVersion,
    /// Content-Length header value is not a non-negative number
    InvalidContentLength,
    /// Transfer-Encoding is not supported; its presence is malformed
    UnsupportedTransferEncoding,
    /// The request is incomplete and more data is needed
    Incomplete,
}

/// Parses an HTTP request from a byte buffer.
///
/// The buffer must hold at least the full header block (up to and including
/// `\r\n\r\n`) and, when a `Content-Length` header is present, that many
/// body bytes after it.
///
/// An unknown method token is not a parse failure: the request is returned
/// with `Method::INVALID` so the caller can answer `501 Not Implemented`.
///
/// # Returns
///
/// - `Ok((Request, usize))` - a parsed request and the number of bytes consumed
/// - `Err(ParseError::Incomplete)` - headers or body not fully buffered yet;
///   the caller should read more and retry
/// - `Err(ParseError::*)` - the buffered bytes are not a valid request
pub fn parse_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let head = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let (method, target, version) = parse_request_line(request_line)?;
    if version != "HTTP/1.1" {
        return Err(ParseError::InvalidVersion);
    }

    let mut headers = Headers::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        // Lines without a colon are ignored; the first occurrence of a
        // duplicated name wins.
        if let Some((name, value)) = line.split_once(':') {
            if !headers.contains(name) {
                headers.set(name, value.trim_start());
            }
        }
    }

    if headers.contains("Transfer-Encoding") {
        return Err(ParseError::UnsupportedTransferEncoding);
    }

    let content_length = match headers.get("Content-Length") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?,
        None => 0,
    };

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }
    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

/// Splits `METHOD SP TARGET SP VERSION` on single spaces.
fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split(' ');
    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() || method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidRequest);
    }
    Ok((Method::from_token(method), target, version))
}

pub(crate) fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
