//! Document root access.
//!
//! Maps request URIs to canonical filesystem paths and reads served files,
//! keeping every resolved path inside the configured root.

pub mod resolver;
