//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 request/response cycle with support
//! for keep-alive connections.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection handler implementing the
//!   request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and accessors
//! - **`response`**: HTTP response representation with builder pattern
//! - **`builders`**: Method-specific response builders (GET static files,
//!   POST form echo) and their registry
//! - **`composer`**: Serializes response heads and synthesizes error
//!   responses
//! - **`headers`**: Case-insensitive header map
//! - **`mime`**: Media type detection based on file extensions
//! - **`encoding`**: Percent-decoding and form parsing
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌──────────────┐
//!        │ WaitForData  │ ← Bounded wait for the next request
//!        └──────┬───────┘
//!               │ Readable
//!               ▼
//!        ┌──────────────┐
//!        │ ReadRequest  │ ← Accumulate and parse
//!        └──────┬───────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────┐
//!        │    Build     │ ← Dispatch to the builder registry
//!        └──────┬───────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────┐
//!        │     Send     │ ← Head, then body or sendfile
//!        └──────┬───────┘
//!               │ Sent
//!               ▼
//!        ┌──────────────┐
//!        │   Continue   │
//!        └──────┬───────┘
//!               ├─ Keep-alive, under request cap → WaitForData
//!               └─ Otherwise → Close
//! ```

pub mod builders;
pub mod composer;
pub mod connection;
pub mod encoding;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
