pub mod github;
pub mod relay;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current revision of the remote CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Decoded file text.
    pub content: String,
    /// Content-version token that must accompany an update.
    pub sha: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected because the file changed since it was read.
    #[error("Remote file changed since it was read ({status}): {body}")]
    Conflict { status: u16, body: String },
    #[error("Failed fetching file: {status} {body}")]
    Fetch { status: u16, body: String },
    #[error("GitHub update failed: {status} {body}")]
    Write { status: u16, body: String },
    #[error("Failed to decode file content: {0}")]
    Decode(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Read and versioned write access to a single hosted file.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the file. `Ok(None)` means it does not exist yet.
    async fn fetch(&self) -> Result<Option<RemoteFile>, StoreError>;

    /// Replace the file content. `sha` is the token from the fetch that this
    /// content was derived from; `None` asks for the file to be created.
    /// Returns the hosting API's write confirmation verbatim.
    async fn write(
        &self,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<serde_json::Value, StoreError>;
}

/// What the remote CSV can record. Rows can only be appended: completion
/// toggles and deletions stay local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub append: bool,
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const APPEND_ONLY: Capabilities = Capabilities {
        append: true,
        update: false,
        delete: false,
    };
}
