use std::collections::HashMap;

use chrono::FixedOffset;

use super::category::icon_for;
use super::item::ItemId;
use super::state::{Action, AppState};
use super::time::display_timestamp;

/// Events an item card can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEvent {
    Toggle,
    Delete,
}

/// Display data for one item, with no behavior attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCard {
    pub id: ItemId,
    pub icon: &'static str,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub created: String,
    pub scheduled: Option<String>,
    pub created_by: String,
    pub completed: bool,
    pub sync_label: &'static str,
}

/// Maps item ids to the events their card accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    handlers: HashMap<ItemId, Vec<UiEvent>>,
}

impl Bindings {
    pub fn bind(&mut self, id: ItemId, event: UiEvent) {
        let events = self.handlers.entry(id).or_default();
        if !events.contains(&event) {
            events.push(event);
        }
    }

    pub fn events_for(&self, id: ItemId) -> &[UiEvent] {
        self.handlers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a UI event to the action it should dispatch.
    ///
    /// Returns `None` for unknown ids or events the card does not accept.
    /// A delete is only resolved when the user confirmed it.
    pub fn dispatch(&self, id: ItemId, event: UiEvent, confirmed: bool) -> Option<Action> {
        if !self.events_for(id).contains(&event) {
            log::debug!("No {:?} binding for item {}", event, id);
            return None;
        }
        match event {
            UiEvent::Toggle => Some(Action::Toggle(id)),
            UiEvent::Delete if confirmed => Some(Action::Delete(id)),
            UiEvent::Delete => None,
        }
    }
}

/// Rendered list: cards in display order plus their event bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub cards: Vec<ItemCard>,
    pub bindings: Bindings,
    pub count_label: String,
    pub empty: bool,
}

pub fn render(state: &AppState, offset: FixedOffset) -> ListView {
    let mut bindings = Bindings::default();
    let cards = state
        .items
        .iter()
        .map(|tracked| {
            let item = &tracked.item;
            bindings.bind(item.id, UiEvent::Toggle);
            bindings.bind(item.id, UiEvent::Delete);
            ItemCard {
                id: item.id,
                icon: icon_for(&item.category),
                category: item.category.clone(),
                title: item.title.clone(),
                description: (!item.description.is_empty()).then(|| item.description.clone()),
                created: display_timestamp(&item.created_at, offset),
                scheduled: item
                    .scheduled_date
                    .as_ref()
                    .map(|dt| display_timestamp(dt, offset)),
                created_by: item.created_by.clone(),
                completed: item.completed,
                sync_label: tracked.sync.label(),
            }
        })
        .collect();

    ListView {
        cards,
        bindings,
        count_label: state.count_label(),
        empty: state.is_empty(),
    }
}
