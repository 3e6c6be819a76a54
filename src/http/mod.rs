//! HTTP protocol subset.
//!
//! A deliberately small request/response layer working directly on raw
//! receive buffers: no chunked encoding, no pipelining, no header folding.
//!
//! # Architecture
//!
//! - **`parser`**: Tokenizes a receive buffer into a borrowed [`request::Request`]
//! - **`request`**: Request representation, query and cookie lookups
//! - **`persistence`**: Keep-alive decision
//! - **`page`**: Builds the HTML echo page (or a 400) for a request
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`date`**: ISO-8601 timestamps for headers and the access log
//! - **`connection`**: Per-connection state and single-message dispatch
//!
//! # Message flow
//!
//! ```text
//!   raw bytes ──► parser ──► Request ──► page ──► Response ──► writer
//!                   │                                 ▲
//!                   └── malformed ── 400 ─────────────┘
//!                   └── too large ── close, no response
//! ```
//!
//! After a 200, the connection stays in its slot only when
//! [`persistence::keep_alive`] says so.

pub mod connection;
pub mod date;
pub mod page;
pub mod parser;
pub mod persistence;
pub mod request;
pub mod response;
pub mod writer;
