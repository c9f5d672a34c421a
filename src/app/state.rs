//! Application state shared across tasks

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config: Arc::new(config),
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Receiver that flips to `true` once shutdown begins
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every task to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("Shutdown signalled");
        }
    }
}
