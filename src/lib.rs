//! Hearth - HTTP/1.1 static file server
//!
//! Core library for the acceptor, worker pool, and HTTP handling.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
