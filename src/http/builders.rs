use std::fs;

use crate::files::resolver::Resolver;
use crate::http::encoding;
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Files larger than this are not buffered in memory; their payload is
/// delivered via sendfile.
const STATIC_FILE_THRESHOLD: u64 = 128 * 1024;

/// Outcome of a builder: a full response, or the status code the composer
/// should turn into an error response.
pub type BuildResult = Result<Response, StatusCode>;

/// Method-keyed dispatch to the registered response builders.
///
/// Immutable after setup and shared by all workers. Methods without a
/// registered builder resolve to `None`, which the connection handler
/// answers with `501 Not Implemented`.
pub struct BuilderRegistry {
    get: GetBuilder,
    post: PostBuilder,
}

impl BuilderRegistry {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            get: GetBuilder { resolver },
            post: PostBuilder,
        }
    }

    pub fn build(&self, request: &Request) -> Option<BuildResult> {
        match request.method {
            Method::GET => Some(self.get.build(request)),
            Method::POST => Some(self.post.build(request)),
            Method::INVALID => None,
        }
    }
}

/// Serves static files from the document root.
pub struct GetBuilder {
    resolver: Resolver,
}

impl GetBuilder {
    /// Builds a response to a GET request.
    ///
    /// The target is resolved against the document root, the media type is
    /// derived from the extension (unknown extensions are `415`), and files
    /// over the static threshold are marked for sendfile delivery instead
    /// of being read into memory.
    pub fn build(&self, request: &Request) -> BuildResult {
        let path = self.resolver.resolve(&request.target)?;

        let content_type = mime::content_type(&path).ok_or(StatusCode::UnsupportedMediaType)?;

        let meta = fs::metadata(&path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to stat file");
            StatusCode::InternalServerError
        })?;
        let size = meta.len();

        if size > STATIC_FILE_THRESHOLD {
            Ok(ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", content_type)
                .header("Content-Length", size.to_string())
                .static_file(path)
                .build())
        } else {
            let contents = self.resolver.read(&path)?;
            Ok(ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", content_type)
                .body(contents)
                .build())
        }
    }
}

/// Echoes URL-encoded form submissions on `/submit`.
pub struct PostBuilder;

impl PostBuilder {
    /// Builds a response to a POST request.
    ///
    /// Only `application/x-www-form-urlencoded` bodies (parameters after
    /// the first `;` ignored) on the `/submit` target are accepted. The
    /// response echoes the decoded pairs and closes the connection.
    pub fn build(&self, request: &Request) -> BuildResult {
        let content_type = request.header("Content-Type").unwrap_or("");
        let base = content_type.split(';').next().unwrap_or("").trim();
        if base != mime::FORM_URLENCODED {
            return Err(StatusCode::UnsupportedMediaType);
        }
        if request.target != "/submit" {
            return Err(StatusCode::NotFound);
        }

        let pairs = encoding::parse_form(&request.body);

        let mut body = String::new();
        for (key, value) in &pairs {
            body.push_str(key);
            body.push_str(": ");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("POST Successful!");

        Ok(ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", mime::TEXT_HTML)
            .header("Connection", "close")
            .body(body.into_bytes())
            .build())
    }
}
