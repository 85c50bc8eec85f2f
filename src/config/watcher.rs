//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_all;
use crate::config::schema::ProxyConfig;
use crate::observability::metrics;

/// A watcher that monitors the server and browser files for changes.
pub struct ConfigWatcher {
    config_path: PathBuf,
    browsers_path: Option<PathBuf>,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configurations.
    pub fn new(
        config_path: &Path,
        browsers_path: Option<&Path>,
    ) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                config_path: config_path.to_path_buf(),
                browsers_path: browsers_path.map(Path::to_path_buf),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the files in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let config_path = self.config_path.clone();
        let browsers_path = self.browsers_path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match load_all(&config_path, browsers_path.as_deref()) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                metrics::record_reload(false);
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current configuration.",
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

        watcher.watch(&self.config_path, RecursiveMode::NonRecursive)?;
        if let Some(path) = &self.browsers_path {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(
            config = ?self.config_path,
            browsers = ?self.browsers_path,
            "Config watcher started"
        );
        Ok(watcher)
    }
}
