//! Session-based access control.
//!
//! # Data Flow
//! ```text
//! POST /auth/login
//!     → credential.rs (check the single configured credential)
//!     → session.rs (new session with authenticated = true)
//!     → cookie.rs (Set-Cookie with the session token)
//!
//! Any gated request:
//!     → cookie.rs (read token)
//!     → session.rs (look up session)
//!     → gate.rs (pass or 401)
//! ```
//!
//! # Design Decisions
//! - With no credential configured the gate is open
//! - The gate only reads the session flag; it never checks credentials
//! - Sessions live in process memory and expire after a fixed TTL

pub mod cookie;
pub mod credential;
pub mod gate;
pub mod session;

pub use credential::Credential;
pub use gate::{session_gate, SessionGate};
pub use session::{Session, SessionStore};
