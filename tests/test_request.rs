use hearth::http::headers::Headers;
use hearth::http::request::{Method, Request};

fn request_with_headers(headers: Headers) -> Request {
    Request {
        method: Method::GET,
        target: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: Vec::new(),
    }
}

#[test]
fn test_method_from_token() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(Method::from_token("PUT"), Method::INVALID);
    assert_eq!(Method::from_token("DELETE"), Method::INVALID);
    assert_eq!(Method::from_token("get"), Method::INVALID);
    assert_eq!(Method::from_token(""), Method::INVALID);
}

#[test]
fn test_keep_alive_defaults_to_true() {
    let req = request_with_headers(Headers::new());
    assert!(req.keep_alive());
}

#[test]
fn test_keep_alive_explicit() {
    let mut headers = Headers::new();
    headers.set("Connection", "keep-alive");
    let req = request_with_headers(headers);
    assert!(req.keep_alive());
}

#[test]
fn test_keep_alive_close() {
    let mut headers = Headers::new();
    headers.set("Connection", "close");
    let req = request_with_headers(headers);
    assert!(!req.keep_alive());
}

#[test]
fn test_keep_alive_is_case_insensitive() {
    let mut headers = Headers::new();
    headers.set("connection", "Keep-Alive");
    let req = request_with_headers(headers);
    assert!(req.keep_alive());
}

#[test]
fn test_content_length_accessor() {
    let mut headers = Headers::new();
    headers.set("Content-Length", "42");
    let req = request_with_headers(headers);
    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_content_length_missing_is_zero() {
    let req = request_with_headers(Headers::new());
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_header_accessor_is_case_insensitive() {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/html");
    let req = request_with_headers(headers);

    assert_eq!(req.header("content-type").unwrap(), "text/html");
    assert_eq!(req.header("CONTENT-TYPE").unwrap(), "text/html");
    assert!(req.header("Content-Length").is_none());
}

#[test]
fn test_headers_set_replaces_in_place() {
    let mut headers = Headers::new();
    headers.set("Connection", "keep-alive");
    headers.set("connection", "close");

    assert_eq!(headers.get("Connection").unwrap(), "close");
    assert_eq!(headers.len(), 1);
}

#[test]
fn test_headers_preserve_insertion_order() {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/html");
    headers.set("Content-Length", "0");
    headers.set("Connection", "close");

    let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Content-Type", "Content-Length", "Connection"]);
}
