//! Request handlers, one module per resource.

pub mod auth;
pub mod buckets;
pub mod config;
pub mod proxy;
pub mod status;
