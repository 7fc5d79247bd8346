pub mod relay;
pub mod storage;

use chrono::{DateTime, FixedOffset, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Backend, ClientConfig};
use crate::core::form::{FormError, NewItemForm};
use crate::core::item::{ItemId, SyncStatus};
use crate::core::state::{Action, AppState, Effect};
use crate::core::time::offset_from_minutes;
use crate::core::view::{self, ListView, UiEvent};
use crate::sheet::{self, CsvWriter, Row, SheetError};
use crate::sync::Capabilities;
use relay::RelayClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Remote file changed concurrently: {0}")]
    Conflict(String),
    #[error("Relay returned {status}: {message}")]
    Relay { status: u16, message: String },
    #[error("Relay URL not configured")]
    NoRelay,
    #[error("No items to download.")]
    NothingToExport,
    #[error("No item with id {0}")]
    UnknownItem(ItemId),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// A running client: the in-memory list, where it is persisted, and the
/// optional relay it syncs new items to.
pub struct Session {
    pub state: AppState,
    state_path: PathBuf,
    relay: Option<RelayClient>,
    offset: FixedOffset,
    conflict_retries: u32,
}

impl Session {
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let relay = match config.backend {
            Backend::Local => None,
            Backend::CsvRelay => {
                let url = config.relay_url.as_deref().ok_or(ClientError::NoRelay)?;
                Some(RelayClient::new(url)?)
            }
        };
        let state_path = config.state_path();
        Ok(Self {
            state: storage::load_state(&state_path),
            state_path,
            relay,
            offset: offset_from_minutes(config.utc_offset_minutes),
            conflict_retries: config.conflict_retries,
        })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn render(&self) -> ListView {
        view::render(&self.state, self.offset)
    }

    fn persist(&self) {
        if let Err(e) = storage::save_state(&self.state_path, &self.state) {
            log::error!("Failed to save state: {}", e);
        }
    }

    /// Submit the form: validate, add the item locally, then try to append
    /// it to the remote CSV.
    ///
    /// Validation failures return before any network call and leave the
    /// form untouched. Otherwise the form is reset whatever the remote
    /// outcome, and a remote failure only marks the item `failed`.
    pub async fn submit(
        &mut self,
        form: &mut NewItemForm,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, ClientError> {
        let item = form.build(now, self.offset)?;
        let initial = if self.relay.is_some() {
            SyncStatus::Pending
        } else {
            SyncStatus::Local
        };

        let mut effects = self.state.apply(Action::Add(item, initial));
        self.persist();
        form.reset(now, self.offset);

        // Add may have bumped the id to keep it unique
        let id = self.state.items[0].item.id;
        effects.extend(self.push(id).await);
        Ok(effects)
    }

    /// Send one local item to the relay and record the outcome.
    async fn push(&mut self, id: ItemId) -> Vec<Effect> {
        let Some(relay) = self.relay.as_ref() else {
            return Vec::new();
        };
        let Some(tracked) = self.state.get(id) else {
            return Vec::new();
        };

        let item = tracked.item.clone();
        let action = match relay.save_with_retry(&item, self.conflict_retries).await {
            Ok(_) => {
                log::info!("Saved \"{}\" to remote CSV", item.title);
                Action::MarkSynced(id)
            }
            Err(e) => {
                log::warn!("Failed to save \"{}\" remotely: {}", item.title, e);
                Action::MarkFailed(id, e.to_string())
            }
        };
        let effects = self.state.apply(action);
        self.persist();
        effects
    }

    /// Re-submit every item whose remote save failed.
    pub async fn retry_failed(&mut self) -> Result<Vec<Effect>, ClientError> {
        if self.relay.is_none() {
            return Err(ClientError::NoRelay);
        }
        let ids: Vec<ItemId> = self.state.failed().map(|t| t.item.id).collect();
        let mut effects = Vec::new();
        for id in ids {
            self.state.apply(Action::MarkPending(id));
            effects.extend(self.push(id).await);
        }
        Ok(effects)
    }

    /// Route a UI event through the rendered bindings and apply the result.
    pub fn handle(
        &mut self,
        id: ItemId,
        event: UiEvent,
        confirmed: bool,
    ) -> Result<Vec<Effect>, ClientError> {
        if self.state.get(id).is_none() {
            return Err(ClientError::UnknownItem(id));
        }
        let Some(action) = self.render().bindings.dispatch(id, event, confirmed) else {
            return Ok(Vec::new());
        };
        let effects = self.state.apply(action);
        self.persist();
        Ok(effects)
    }

    /// The local list as a CSV document.
    pub fn export_csv(&self) -> Result<String, ClientError> {
        if self.state.is_empty() {
            return Err(ClientError::NothingToExport);
        }
        let items: Vec<_> = self.state.items.iter().map(|t| t.item.clone()).collect();
        Ok(CsvWriter::write_document(&items, self.offset)?)
    }

    pub async fn remote_capabilities(&self) -> Result<Capabilities, ClientError> {
        let relay = self.relay.as_ref().ok_or(ClientError::NoRelay)?;
        relay.capabilities().await
    }

    /// Fetch and parse the remote CSV. An absent file is an empty list.
    pub async fn pull(&self) -> Result<Vec<Row>, ClientError> {
        let relay = self.relay.as_ref().ok_or(ClientError::NoRelay)?;
        match relay.load().await? {
            Some(text) => Ok(sheet::parse_document(&text)?),
            None => Ok(Vec::new()),
        }
    }
}
