use chrono::FixedOffset;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::core::time::offset_from_minutes;
use crate::sync::ContentStore;
use crate::sync::github::GithubStore;
use crate::sync::relay::RelayError;

/// Immutable per-process relay state shared by all requests.
pub struct State {
    /// `None` until the GitHub owner, repo and token are configured.
    pub store: Option<Arc<dyn ContentStore>>,
    pub csv_offset: FixedOffset,
    pub port: u16,
}

impl State {
    pub fn new(config: &RelayConfig) -> Arc<Self> {
        let store: Option<Arc<dyn ContentStore>> = match config.github() {
            Ok(target) => match GithubStore::new(target, config.http_timeout) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    log::error!("Failed to build GitHub client: {}", e);
                    None
                }
            },
            Err(e) => {
                log::warn!("{}; every request will fail until it is set", e);
                None
            }
        };

        Self::with_store(store, config)
    }

    pub fn with_store(store: Option<Arc<dyn ContentStore>>, config: &RelayConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            csv_offset: offset_from_minutes(config.csv_offset_minutes),
            port: config.port,
        })
    }

    pub fn store(&self) -> Result<&dyn ContentStore, RelayError> {
        self.store.as_deref().ok_or(RelayError::MissingConfig)
    }
}
