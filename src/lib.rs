//! httpd - single-threaded keep-alive HTTP server
//!
//! Core library for the connection table, the readiness-driven event loop
//! and the hand-rolled request/response handling.

pub mod config;
pub mod http;
pub mod server;
