use crate::http::headers::Headers;

/// HTTP methods the server dispatches on.
///
/// Any token that is not `GET` or `POST` parses to `INVALID`; such requests
/// still flow through the handler so it can answer `501 Not Implemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    INVALID,
}

impl Method {
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            _ => Method::INVALID,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw request target as received, no percent-decoding applied.
    pub target: String,
    pub version: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the client asked to keep the connection open.
    ///
    /// An absent `Connection` header means keep-alive (HTTP/1.1 default);
    /// any value other than `keep-alive` closes the connection.
    pub fn keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| v.eq_ignore_ascii_case("keep-alive"))
            .unwrap_or(true)
    }
}
