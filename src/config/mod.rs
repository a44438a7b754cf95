//! Rule configuration subsystem.
//!
//! # Data Flow
//! ```text
//! rule files (.yml/.yaml/.json)
//!     → loader.rs (enumerate directory, parse & validate each file)
//!     → StubRegistry (immutable, one FileEntry per source file)
//!     → published via SharedRegistry (atomic swap)
//!
//! On directory change:
//!     watcher.rs detects create/modify/remove
//!     → loader.rs rebuilds the whole registry
//!     → swap task publishes it; a failed reload keeps the last good one
//! ```
//!
//! # Design Decisions
//! - Rules are immutable once loaded; every change is a full rebuild
//! - Files that share a path template are kept separate, never merged
//! - Syntactic checks live in Serde, semantic checks in `validate()`

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_dir, LoadError};
pub use schema::{ExpectedRequest, ResponseSpec, Rule, RuleOptions};
