//! Relay operations: turn a save request into one appended CSV row, and read
//! the file back. Stateless; every call does its own fetch.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use thiserror::Error;

use super::{ContentStore, StoreError};
use crate::core::time::csv_timestamp;
use crate::sheet::{CsvWriter, Row, SheetError};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid payload")]
    InvalidPayload,
    #[error("Missing GitHub configuration in environment")]
    MissingConfig,
    /// The file could not be read; carries the hosting API's status.
    #[error("CSV not found")]
    NotFound { status: u16 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Body of a save request. Only `title` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_by: Option<String>,
}

impl SavePayload {
    /// Parse a request body. Anything but a JSON object with a non-empty
    /// `title` is invalid.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let reject = |e: serde_json::Error| {
            log::debug!("Rejecting payload: {}", e);
            RelayError::InvalidPayload
        };
        let value: serde_json::Value = serde_json::from_slice(body).map_err(reject)?;
        // Derived structs also deserialize from sequences
        if !value.is_object() {
            return Err(RelayError::InvalidPayload);
        }
        let payload: SavePayload = serde_json::from_value(value).map_err(reject)?;
        match payload.title.as_deref() {
            Some(t) if !t.trim().is_empty() => Ok(payload),
            _ => Err(RelayError::InvalidPayload),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn to_row(&self, offset: FixedOffset) -> Row {
        let stamp = |dt: &Option<DateTime<FixedOffset>>| {
            dt.as_ref()
                .map(|d| csv_timestamp(d, offset))
                .unwrap_or_default()
        };
        Row {
            title: self.title().to_string(),
            category: self.category.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            scheduled: stamp(&self.scheduled_date),
            completed: self.completed,
            created_at: stamp(&self.created_at),
            created_by: self.created_by.clone().unwrap_or_default(),
        }
    }
}

pub fn commit_message(title: &str) -> String {
    format!("Update bucket list CSV: add \"{}\"", title)
}

/// Append one row for `payload` to the remote file, creating the file with a
/// header if it does not exist. Returns the hosting API's write result.
///
/// Fetch and write are not atomic. If the file changes in between, the
/// write fails with [`StoreError::Conflict`] and nothing is retried here.
pub async fn append_item(
    store: &dyn ContentStore,
    payload: &SavePayload,
    offset: FixedOffset,
) -> Result<serde_json::Value, RelayError> {
    let row = CsvWriter::write_row(&payload.to_row(offset))?;

    let (content, sha) = match store.fetch().await? {
        Some(file) => (CsvWriter::append(&file.content, &row), Some(file.sha)),
        None => (CsvWriter::new_file(&row), None),
    };

    let result = store
        .write(&content, sha.as_deref(), &commit_message(payload.title()))
        .await?;

    log::info!(
        "Appended \"{}\" ({})",
        payload.title(),
        if sha.is_some() { "updated" } else { "created" }
    );
    Ok(result)
}

/// Read the remote CSV text. Any hosting API refusal is reported as not
/// found with that API's status.
pub async fn load_csv(store: &dyn ContentStore) -> Result<String, RelayError> {
    match store.fetch().await {
        Ok(Some(file)) => Ok(file.content),
        Ok(None) => Err(RelayError::NotFound { status: 404 }),
        Err(StoreError::Fetch { status, body }) => {
            log::warn!("Loading CSV failed with {}: {}", status, body);
            Err(RelayError::NotFound { status })
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::offset_from_minutes;
    use crate::sheet::{parse_document, HEADER};
    use crate::sync::memory::MemoryStore;
    use crate::sync::RemoteFile;

    fn utc() -> FixedOffset {
        offset_from_minutes(0)
    }

    fn kyoto() -> SavePayload {
        SavePayload::parse(
            br#"{"title":"Visit Kyoto","category":"travel","description":"","completed":false,
                "createdAt":"2024-01-01T00:00:00.000Z","createdBy":"Alice"}"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_requires_title() {
        assert!(matches!(
            SavePayload::parse(br#"{"title":""}"#),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(br#"{"category":"travel"}"#),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(b"[1,2]"),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(b"not json"),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(br#"{"title":"x","createdAt":"yesterday"}"#),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(br#"["x",null,null,null,false,null,null]"#),
            Err(RelayError::InvalidPayload)
        ));
        assert!(matches!(
            SavePayload::parse(br#""x""#),
            Err(RelayError::InvalidPayload)
        ));
    }

    #[test]
    fn null_fields_render_empty() {
        let payload = SavePayload::parse(br#"{"title":"x","category":null}"#).unwrap();
        let row = payload.to_row(utc());
        assert_eq!(row.category, "");
        assert_eq!(row.created_at, "");
        assert!(!row.completed);
    }

    #[tokio::test]
    async fn absent_file_gets_header_plus_row() {
        let store = MemoryStore::default();
        append_item(&store, &kyoto(), utc()).await.unwrap();
        assert_eq!(
            store.content().unwrap(),
            "Title,Category,Description,Scheduled Date,Completed,Created At,Created By\n\
             \"Visit Kyoto\",\"travel\",\"\",\"\",\"No\",\"1/1/2024, 12:00:00 AM\",\"Alice\"\n"
        );
        assert_eq!(
            store.writes.lock().unwrap().as_slice(),
            ["Update bucket list CSV: add \"Visit Kyoto\""]
        );
    }

    #[tokio::test]
    async fn existing_file_grows_by_one_row() {
        let existing = format!(
            "{}\"A\",\"food\",\"\",\"\",\"No\",\"\",\"Bob\"\n\"B\",\"books\",\"\",\"\",\"Yes\",\"\",\"Bob\"\n",
            HEADER
        );
        let store = MemoryStore::with_content(&existing);
        let result = append_item(&store, &kyoto(), utc()).await.unwrap();
        assert_eq!(result["content"]["sha"], "sha-1");

        let content = store.content().unwrap();
        assert!(content.starts_with(&existing));
        let rows = parse_document(&content).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].title, "Visit Kyoto");
        assert_eq!(content.lines().next().unwrap(), HEADER.trim_end());
    }

    #[tokio::test]
    async fn stale_sha_is_a_conflict() {
        // A store whose file moves on between our fetch and our write.
        struct Racing(MemoryStore);

        #[async_trait::async_trait]
        impl ContentStore for Racing {
            async fn fetch(&self) -> Result<Option<RemoteFile>, StoreError> {
                let file = self.0.fetch().await?;
                self.0.bump(&format!("{}\"other\"\n", HEADER));
                Ok(file)
            }

            async fn write(
                &self,
                content: &str,
                sha: Option<&str>,
                message: &str,
            ) -> Result<serde_json::Value, StoreError> {
                self.0.write(content, sha, message).await
            }
        }

        let store = Racing(MemoryStore::with_content(HEADER));
        let err = append_item(&store, &kyoto(), utc()).await.unwrap_err();
        assert!(matches!(err, RelayError::Store(ref e) if e.is_conflict()));
        assert_eq!(store.0.content().unwrap(), format!("{}\"other\"\n", HEADER));
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let store = MemoryStore::failing(500);
        let err = append_item(&store, &kyoto(), utc()).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Store(StoreError::Fetch { status: 500, .. })
        ));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let store = MemoryStore::default();
        assert!(matches!(
            load_csv(&store).await,
            Err(RelayError::NotFound { status: 404 })
        ));

        let store = MemoryStore::with_content(HEADER);
        assert_eq!(load_csv(&store).await.unwrap(), HEADER);
    }

    #[tokio::test]
    async fn load_passes_upstream_status_through() {
        let store = MemoryStore::failing(403);
        assert!(matches!(
            load_csv(&store).await,
            Err(RelayError::NotFound { status: 403 })
        ));
    }
}
