use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId, SyncStatus, TrackedItem};

/// A state change requested by the user or by the sync layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert a new item at the top of the list with the given sync status.
    Add(Item, SyncStatus),
    Toggle(ItemId),
    /// Remove an item. Only dispatched after the user confirmed.
    Delete(ItemId),
    MarkPending(ItemId),
    MarkSynced(ItemId),
    MarkFailed(ItemId, String),
}

/// Side effects the front end should carry out after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(String),
    /// An item was just completed.
    Celebrate(ItemId),
    /// A local change was not propagated to the remote file.
    Diverged(ItemId),
}

/// The whole in-memory model of the list, independent of any display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Newest first.
    #[serde(default)]
    pub items: Vec<TrackedItem>,
    /// Items deleted locally that still have a row in the remote file.
    #[serde(default)]
    pub diverged_deletions: Vec<Item>,
}

impl AppState {
    pub fn get(&self, id: ItemId) -> Option<&TrackedItem> {
        self.items.iter().find(|t| t.item.id == id)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut TrackedItem> {
        self.items.iter_mut().find(|t| t.item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn completed(&self) -> usize {
        self.items.iter().filter(|t| t.item.completed).count()
    }

    /// `"<completed>/<total> completed"`
    pub fn count_label(&self) -> String {
        format!("{}/{} completed", self.completed(), self.total())
    }

    /// Smallest id at or after `candidate` not already used in this state.
    pub fn next_free_id(&self, candidate: ItemId) -> ItemId {
        let mut id = candidate;
        while self.get(id).is_some() {
            id += 1;
        }
        id
    }

    pub fn failed(&self) -> impl Iterator<Item = &TrackedItem> {
        self.items
            .iter()
            .filter(|t| matches!(t.sync, SyncStatus::Failed(_)))
    }

    /// Apply an action and return the effects it produced.
    ///
    /// Actions naming an unknown id are no-ops.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        let mut effects = Vec::new();

        match action {
            Action::Add(mut item, sync) => {
                item.id = self.next_free_id(item.id);
                log::debug!("Adding item {}: {}", item.id, item.title);
                self.items.insert(0, TrackedItem { item, sync });
                effects.push(Effect::Notify("Item added successfully! 🎉".to_string()));
            }
            Action::Toggle(id) => {
                let Some(tracked) = self.get_mut(id) else {
                    log::debug!("Toggle for unknown item {}", id);
                    return effects;
                };
                tracked.item.toggle();
                if tracked.item.completed {
                    effects.push(Effect::Celebrate(id));
                }
                if tracked.sync.is_on_remote() {
                    tracked.sync = SyncStatus::Diverged;
                    effects.push(Effect::Diverged(id));
                    effects.push(Effect::Notify(
                        "Completion change saved locally only; the remote CSV is append-only"
                            .to_string(),
                    ));
                }
            }
            Action::Delete(id) => {
                let Some(pos) = self.items.iter().position(|t| t.item.id == id) else {
                    log::debug!("Delete for unknown item {}", id);
                    return effects;
                };
                let removed = self.items.remove(pos);
                if removed.sync.is_on_remote() {
                    log::info!("Deleted item {} still has a remote row", id);
                    self.diverged_deletions.push(removed.item);
                    effects.push(Effect::Diverged(id));
                    effects.push(Effect::Notify(
                        "Item deleted locally; it remains in the remote CSV".to_string(),
                    ));
                } else {
                    effects.push(Effect::Notify("Item deleted".to_string()));
                }
            }
            Action::MarkPending(id) => {
                if let Some(tracked) = self.get_mut(id) {
                    tracked.sync = SyncStatus::Pending;
                }
            }
            Action::MarkSynced(id) => {
                if let Some(tracked) = self.get_mut(id) {
                    tracked.sync = SyncStatus::Synced;
                    effects.push(Effect::Notify("Saved to remote CSV".to_string()));
                }
            }
            Action::MarkFailed(id, reason) => {
                if let Some(tracked) = self.get_mut(id) {
                    effects.push(Effect::Notify(format!(
                        "Could not save \"{}\" remotely: {}",
                        tracked.item.title, reason
                    )));
                    tracked.sync = SyncStatus::Failed(reason);
                }
            }
        }

        effects
    }
}
