use std::path::Path;

pub const TEXT_HTML: &str = "text/html";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Maps a file extension (without the dot) to its media type.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "html" | "htm" => Some("text/html"),
        "css" => Some("text/css"),
        "js" => Some("text/javascript"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "woff2" => Some("font/woff2"),
        _ => None,
    }
}

/// Media type for a path, keyed on its last-dot extension.
pub fn content_type(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
}
