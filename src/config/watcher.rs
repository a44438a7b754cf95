//! Rule directory watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_dir;
use crate::registry::{SharedRegistry, StubRegistry};

/// Watches the rule directory and rebuilds the registry on changes.
pub struct StubWatcher {
    dir: PathBuf,
    update_tx: mpsc::UnboundedSender<StubRegistry>,
}

impl StubWatcher {
    /// Create a new watcher for `dir`.
    ///
    /// Returns the watcher and a receiver for rebuilt registries.
    pub fn new(dir: &Path) -> (Self, mpsc::UnboundedReceiver<StubRegistry>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                dir: dir.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// Every create/modify/remove event triggers a full reload of the
    /// directory. A reload that fails to parse leaves the currently
    /// served registry untouched. The returned watcher must be kept
    /// alive for as long as reloads should happen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let dir = self.dir.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    if event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove() {
                        tracing::info!("Rule directory change detected, reloading");
                        match load_dir(&dir) {
                            Ok(registry) => {
                                let _ = tx.send(registry);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload rules: {}. Keeping current rule set.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = ?self.dir, "Rule watcher started");
        Ok(watcher)
    }
}

/// Spawn the task that publishes rebuilt registries.
///
/// Requests in flight keep whatever snapshot they already took; only new
/// requests observe the swap.
pub fn spawn_swap_task(
    registry: SharedRegistry,
    mut updates: mpsc::UnboundedReceiver<StubRegistry>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(next) = updates.recv().await {
            tracing::info!(
                files = next.file_count(),
                rules = next.rule_count(),
                "Publishing reloaded rules"
            );
            registry.replace(next);
        }
    })
}
