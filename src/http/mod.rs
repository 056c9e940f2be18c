//! HTTP surface of the admin front end.
//!
//! # Data Flow
//! ```text
//! client request
//!     → server.rs (request ID, tracing, timeout, request metrics)
//!     → auth::session_gate (gated routes only)
//!     → handlers/* (buckets, config, proxy, auth, health)
//!     → envelope.rs ({"success": ..., "data" | "error": ...})
//!     → client response
//! ```

pub mod envelope;
pub mod handlers;
pub mod server;

pub use envelope::{ApiError, Envelope};
pub use server::{AppState, HttpServer};
