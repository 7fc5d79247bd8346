use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::ClientError;
use crate::core::item::Item;
use crate::sync::Capabilities;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    conflict: bool,
}

#[derive(Debug, Deserialize)]
struct LoadBody {
    csv: String,
}

/// HTTP client for the CSV relay.
#[derive(Clone)]
pub struct RelayClient {
    base_url: String,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST one item. Returns the hosting API's write result.
    pub async fn save(&self, item: &Item) -> Result<serde_json::Value, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/save-csv"))
            .json(item)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let body: serde_json::Value = resp.json().await?;
            return Ok(body["result"].clone());
        }

        let text = resp.text().await.unwrap_or_default();
        let parsed: Option<ErrorBody> = serde_json::from_str(&text).ok();
        let conflict = status == StatusCode::CONFLICT || parsed.as_ref().is_some_and(|b| b.conflict);
        let message = parsed.and_then(|b| b.error).unwrap_or(text);

        if conflict {
            Err(ClientError::Conflict(message))
        } else {
            Err(ClientError::Relay {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// POST an item, re-submitting up to `retries` more times when the relay
    /// reports a version conflict. Each attempt makes the relay refetch the
    /// file. Other errors are returned immediately.
    pub async fn save_with_retry(
        &self,
        item: &Item,
        retries: u32,
    ) -> Result<serde_json::Value, ClientError> {
        let mut attempt = 0;
        loop {
            match self.save(item).await {
                Err(ClientError::Conflict(msg)) if attempt < retries => {
                    attempt += 1;
                    log::info!(
                        "Conflict saving \"{}\" (attempt {}/{}): {}",
                        item.title,
                        attempt,
                        retries,
                        msg
                    );
                }
                other => return other,
            }
        }
    }

    /// Fetch the remote CSV text. `Ok(None)` if the file does not exist yet.
    pub async fn load(&self) -> Result<Option<String>, ClientError> {
        let resp = self.http.get(self.url("/api/load-csv")).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json::<LoadBody>().await?.csv)),
            StatusCode::NOT_FOUND => Ok(None),
            s => {
                let message = resp.text().await.unwrap_or_default();
                Err(ClientError::Relay {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }

    pub async fn capabilities(&self) -> Result<Capabilities, ClientError> {
        let resp = self.http.get(self.url("/api/capabilities")).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Relay { status, message });
        }
        Ok(resp.json().await?)
    }
}
