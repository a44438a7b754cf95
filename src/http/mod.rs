//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request view (decoded path, queries axis, header object)
//!     → routing::dispatch against a registry snapshot
//!     → canned JSON / 404 / 500 response back to the client
//! ```

pub mod server;

pub use server::HttpServer;
