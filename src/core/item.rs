use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identifier of an item: the creation instant in epoch milliseconds.
pub type ItemId = i64;

/// Where an item stands relative to the remote CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum SyncStatus {
    /// Local-only backend, nothing to sync.
    #[default]
    Local,
    /// Added locally, remote save in flight.
    Pending,
    /// Row appended to the remote file.
    Synced,
    /// Remote save failed; the item only exists locally.
    Failed(String),
    /// Synced once, then changed locally in a way the remote file cannot record.
    Diverged,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed(_) => "failed",
            Self::Diverged => "diverged",
        }
    }

    /// Whether the item has a row in the remote file.
    pub fn is_on_remote(&self) -> bool {
        matches!(self, Self::Synced | Self::Diverged)
    }
}

/// One bucket-list entry. Serializes with the camelCase field names the relay
/// accepts, so an `Item` doubles as the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub created_by: String,
}

impl Item {
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            category: category.into(),
            description: String::new(),
            scheduled_date: None,
            completed: false,
            created_at,
            created_by: String::new(),
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// An item together with its local sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub item: Item,
    #[serde(default)]
    pub sync: SyncStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-01T05:30:00+05:30").unwrap()
    }

    #[test]
    fn new_item_starts_incomplete() {
        let item = Item::new(1, "Visit Kyoto", "travel", created());
        assert!(!item.completed);
        assert!(item.scheduled_date.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let mut item = Item::new(1704067200000, "Visit Kyoto", "travel", created());
        item.created_by = "Alice".to_string();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1704067200000i64);
        assert_eq!(json["scheduledDate"], serde_json::Value::Null);
        assert_eq!(json["createdAt"], "2024-01-01T05:30:00+05:30");
        assert_eq!(json["createdBy"], "Alice");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn accepts_zulu_timestamps() {
        let json = r#"{"id":1,"title":"t","category":"misc","scheduledDate":null,
            "createdAt":"2024-01-01T00:00:00.000Z"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.created_at.offset().local_minus_utc(), 0);
        assert_eq!(item.description, "");
    }

    #[test]
    fn sync_status_serde_shape() {
        let failed = SyncStatus::Failed("boom".into());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");
        let back: SyncStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
        assert!(SyncStatus::Diverged.is_on_remote());
        assert!(!SyncStatus::Pending.is_on_remote());
    }
}
