//! The live rule registry.
//!
//! # Data Flow
//! ```text
//! rule files on disk
//!     → config::loader (parse all files, build a fresh StubRegistry)
//!     → SharedRegistry::replace (atomic whole-reference swap)
//!     → dispatch takes a snapshot per request
//! ```
//!
//! # Design Decisions
//! - A registry is immutable once built; reloads build a new one from
//!   scratch and publish it by reference swap, never by patching
//! - Readers hold an `Arc` snapshot for the life of one dispatch, so a
//!   swap mid-request cannot expose partial state
//! - Rules from different files are never merged, even for identical
//!   path templates; each file stays independently reasoned about

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::schema::Rule;

/// All rules parsed from one source file.
///
/// Path templates iterate in lexical order; the rules under a template
/// keep their source order.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// File name the rules came from, for logs and diagnostics.
    pub source: String,
    pub paths: BTreeMap<String, Vec<Rule>>,
}

/// The full set of loaded rules, ordered per source file.
#[derive(Debug, Clone, Default)]
pub struct StubRegistry {
    pub files: Vec<FileEntry>,
}

impl StubRegistry {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn rule_count(&self) -> usize {
        self.files
            .iter()
            .flat_map(|file| file.paths.values())
            .map(Vec::len)
            .sum()
    }
}

/// Process-wide handle to the current registry.
///
/// Cloning is cheap; all clones observe the same swaps.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<ArcSwap<StubRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: StubRegistry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(registry))),
        }
    }

    /// Takes a consistent snapshot of the current registry.
    pub fn snapshot(&self) -> Arc<StubRegistry> {
        self.inner.load_full()
    }

    /// Publishes a freshly built registry. In-flight snapshots keep the
    /// previous one alive until they drop.
    pub fn replace(&self, registry: StubRegistry) {
        self.inner.store(Arc::new(registry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RuleFile;

    fn registry_with(source: &str, yaml: &str) -> StubRegistry {
        let paths: RuleFile = serde_yaml::from_str(yaml).unwrap();
        StubRegistry {
            files: vec![FileEntry {
                source: source.to_string(),
                paths,
            }],
        }
    }

    #[test]
    fn test_counts() {
        let registry = registry_with(
            "a.yml",
            "/x:\n  - request: {}\n    response: {status: 200, body: null}\n/y:\n  - request: {}\n    response: {status: 200, body: null}\n  - request: {}\n    response: {status: 201, body: null}\n",
        );
        assert_eq!(registry.file_count(), 1);
        assert_eq!(registry.rule_count(), 3);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedRegistry::new(registry_with(
            "old.yml",
            "/x:\n  - request: {}\n    response: {status: 200, body: null}\n",
        ));

        let held = shared.snapshot();
        shared.replace(registry_with(
            "new.yml",
            "/x:\n  - request: {}\n    response: {status: 200, body: null}\n  - request: {}\n    response: {status: 201, body: null}\n",
        ));

        // The held snapshot still sees the old state in full.
        assert_eq!(held.rule_count(), 1);
        assert_eq!(held.files[0].source, "old.yml");

        // New readers see the replacement.
        let fresh = shared.snapshot();
        assert_eq!(fresh.rule_count(), 2);
        assert_eq!(fresh.files[0].source, "new.yml");
    }
}
