//! Pixforge - TCP task service for PNG resizing and color quantization
//!
//! Clients send colon-delimited request frames over a persistent TCP
//! connection; each connection gets its own worker that runs the image
//! pipelines from the `pixel-ops` crate against the filesystem and reports
//! `OK` or an error back.
//! This library exposes modules for integration testing.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tasks;
