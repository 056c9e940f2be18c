//! Admin front end for an S3-compatible object storage cluster.
//!
//! Serves a JSON API over the cluster's admin API: bucket listings completed
//! with per-bucket details, the cached cluster configuration, a pass-through
//! for everything else, and a single-credential session gate in front.

pub mod aggregator;
pub mod auth;
pub mod buckets;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::schema::AdminConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
