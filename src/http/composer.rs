use crate::http::mime;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes the status line and headers to wire bytes.
///
/// The payload (in-memory body or file content) is transmitted separately.
pub fn compose_head(response: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        response.status.as_u16(),
        response.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (name, value) in response.headers.iter() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

/// Synthesizes a full error response for a status code.
///
/// The body is `"<code> <reason>"` and the connection is marked for close.
pub fn error_response(code: StatusCode) -> Response {
    let body = format!("{} {}", code.as_u16(), code.reason_phrase());

    ResponseBuilder::new(code)
        .header("Content-Type", mime::TEXT_HTML)
        .header("Connection", "close")
        .body(body.into_bytes())
        .build()
}
