//! Matching and dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path, queries, headers)
//!     → matcher.rs (path template vs request path, placeholder capture)
//!     → subset.rs (expected values vs actual values, per axis)
//!     → dispatcher.rs (ordered walk, first match wins)
//!     → Outcome: Matched { status, body, lag } or NotFound
//! ```
//!
//! # Design Decisions
//! - Rules are evaluated in file → template → rule order, deterministic
//! - No regex and no compilation step; templates are compared as written
//! - Matching is pure and synchronous; the only await lives in the HTTP
//!   layer (the deliberate response delay)

pub mod dispatcher;
pub mod matcher;
pub mod subset;

pub use dispatcher::{dispatch, Outcome, RequestView};
