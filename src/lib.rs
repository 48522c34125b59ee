#![deny(missing_docs)]

//! Core library for the pkgname service.

/// HTTP routing and JSON handlers.
pub mod api;
/// Preloaded static assets with content-hash ETags.
pub mod assets;
/// Environment-driven configuration management.
pub mod config;
/// Rejection rules and the derived length rule.
pub mod filters;
/// Bounded history of recent names.
pub mod history;
/// Structured logging and tracing setup.
pub mod logging;
/// Store activity counters.
pub mod metrics;
/// Listener binding for the HTTP binary.
pub mod server;
/// Loading candidate names from flat files.
pub mod sources;
/// The shared name store.
pub mod store;
