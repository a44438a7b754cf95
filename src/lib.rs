//! Configurable HTTP stub server.
//!
//! Declarative request → response rules are loaded from a watched
//! directory; each incoming request is answered by the first rule whose
//! expected method, path, params, queries and headers it satisfies.

pub mod config;
pub mod http;
pub mod net;
pub mod registry;
pub mod routing;

pub use config::loader::{load_dir, LoadError};
pub use http::HttpServer;
pub use registry::{SharedRegistry, StubRegistry};
