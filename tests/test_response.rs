use std::path::PathBuf;

use hearth::http::composer;
use hearth::http::mime;
use hearth::http::response::{ResponseBuilder, StatusCode};

#[test]
fn test_status_code_numeric_values() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::UnsupportedMediaType.as_u16(), 415);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_code_reason_phrases() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::UnsupportedMediaType.reason_phrase(),
        "Unsupported Media Type"
    );
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
    assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
}

#[test]
fn test_builder_adds_content_length_from_body() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"hello".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "5");
    assert!(!response.is_static);
    assert!(response.file_path.is_none());
}

#[test]
fn test_builder_keeps_explicit_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "99")
        .body(b"hi".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "99");
}

#[test]
fn test_builder_empty_body_gets_zero_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert_eq!(response.headers.get("Content-Length").unwrap(), "0");
}

#[test]
fn test_builder_static_file_response() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "200000")
        .static_file(PathBuf::from("/srv/www/big.html"))
        .build();

    assert!(response.is_static);
    assert_eq!(
        response.file_path.as_deref(),
        Some(std::path::Path::new("/srv/www/big.html"))
    );
    assert!(response.body.is_empty());
    assert_eq!(response.headers.get("Content-Length").unwrap(), "200000");
}

#[test]
fn test_compose_head_layout() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/html")
        .body(b"<p>hi</p>".to_vec())
        .build();

    let head = composer::compose_head(&response);
    let text = String::from_utf8(head).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/html\r\n"));
    assert!(text.contains("Content-Length: 9\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
    // The body is transmitted separately.
    assert!(!text.contains("<p>hi</p>"));
}

#[test]
fn test_error_response_contents() {
    let response = composer::error_response(StatusCode::NotFound);

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body, b"404 Not Found".to_vec());
    assert_eq!(response.headers.get("Content-Type").unwrap(), mime::TEXT_HTML);
    assert_eq!(response.headers.get("Connection").unwrap(), "close");
    assert_eq!(response.headers.get("Content-Length").unwrap(), "13");
    assert!(!response.is_static);
}

#[test]
fn test_error_response_status_line() {
    let response = composer::error_response(StatusCode::NotImplemented);
    let head = composer::compose_head(&response);
    let text = String::from_utf8(head).unwrap();

    assert!(text.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
}

#[test]
fn test_mime_table() {
    assert_eq!(mime::from_extension("html").unwrap(), "text/html");
    assert_eq!(mime::from_extension("htm").unwrap(), "text/html");
    assert_eq!(mime::from_extension("css").unwrap(), "text/css");
    assert_eq!(mime::from_extension("js").unwrap(), "text/javascript");
    assert_eq!(mime::from_extension("txt").unwrap(), "text/plain");
    assert_eq!(mime::from_extension("json").unwrap(), "application/json");
    assert_eq!(mime::from_extension("png").unwrap(), "image/png");
    assert_eq!(mime::from_extension("jpg").unwrap(), "image/jpeg");
    assert_eq!(mime::from_extension("jpeg").unwrap(), "image/jpeg");
    assert_eq!(mime::from_extension("gif").unwrap(), "image/gif");
    assert_eq!(mime::from_extension("svg").unwrap(), "image/svg+xml");
    assert_eq!(mime::from_extension("ico").unwrap(), "image/x-icon");
    assert_eq!(mime::from_extension("woff2").unwrap(), "font/woff2");
    assert!(mime::from_extension("exe").is_none());
    assert!(mime::from_extension("").is_none());
}

#[test]
fn test_mime_content_type_uses_last_dot_extension() {
    use std::path::Path;

    assert_eq!(
        mime::content_type(Path::new("/srv/www/index.html")).unwrap(),
        "text/html"
    );
    assert_eq!(
        mime::content_type(Path::new("/srv/www/archive.tar.json")).unwrap(),
        "application/json"
    );
    assert!(mime::content_type(Path::new("/srv/www/noext")).is_none());
}
