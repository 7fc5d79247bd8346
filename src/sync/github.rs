use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ContentStore, RemoteFile, StoreError};
use crate::config::GithubTarget;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// File entry returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    #[serde(default)]
    content: String,
    sha: String,
    #[serde(default)]
    size: u64,
}

impl ContentsEntry {
    /// Files over 1 MB come back with `content` left empty. Writing on top
    /// of that would drop every existing row, so it is an error.
    fn into_remote(self) -> Result<RemoteFile, StoreError> {
        if self.content.is_empty() && self.size > 0 {
            return Err(StoreError::Decode(format!(
                "{} bytes on the remote but no inline content",
                self.size
            )));
        }
        Ok(RemoteFile {
            content: decode_content(&self.content)?,
            sha: self.sha,
        })
    }
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Minimal GitHub contents API client bound to one file.
#[derive(Clone)]
pub struct GithubStore {
    target: GithubTarget,
    http: Client,
}

impl GithubStore {
    pub fn new(target: GithubTarget, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder()
            .user_agent(concat!("bucketlist-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { target, http })
    }

    /// URL of the file, with each path segment percent-encoded.
    pub fn contents_url(&self) -> String {
        let path: Vec<String> = self
            .target
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.target.api_url,
            self.target.owner,
            self.target.repo,
            path.join("/")
        )
    }
}

#[async_trait]
impl ContentStore for GithubStore {
    async fn fetch(&self) -> Result<Option<RemoteFile>, StoreError> {
        let resp = self
            .http
            .get(self.contents_url())
            .query(&[("ref", self.target.branch.as_str())])
            .header(AUTHORIZATION, format!("Bearer {}", self.target.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let entry: ContentsEntry = resp.json().await?;
                let file = entry.into_remote().inspect_err(|e| {
                    log::warn!("Refusing to use {}: {}", self.target.path, e);
                })?;
                log::debug!(
                    "Fetched {} ({} bytes, sha {})",
                    self.target.path,
                    file.content.len(),
                    file.sha
                );
                Ok(Some(file))
            }
            StatusCode::NOT_FOUND => {
                log::info!("{} not found on {}", self.target.path, self.target.branch);
                Ok(None)
            }
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(StoreError::Fetch {
                    status: s.as_u16(),
                    body,
                })
            }
        }
    }

    async fn write(
        &self,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<serde_json::Value, StoreError> {
        let body = PutContents {
            message,
            content: BASE64.encode(content.as_bytes()),
            branch: &self.target.branch,
            sha,
        };

        let resp = self
            .http
            .put(self.contents_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.target.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // 409: sha no longer current. 422 without a sha: someone created
            // the file between our fetch and this write.
            if status == StatusCode::CONFLICT
                || (status == StatusCode::UNPROCESSABLE_ENTITY && sha.is_none())
            {
                return Err(StoreError::Conflict {
                    status: status.as_u16(),
                    body,
                });
            }
            return Err(StoreError::Write {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Decode the base64 payload GitHub returns. It is wrapped at 60 columns, so
/// whitespace is dropped first.
pub fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: &str) -> GithubTarget {
        GithubTarget {
            api_url: "https://api.github.com".into(),
            owner: "alice".into(),
            repo: "lists".into(),
            token: "t".into(),
            path: path.into(),
            branch: "main".into(),
        }
    }

    #[test]
    fn contents_url_keeps_slashes() {
        let store = GithubStore::new(target("data/bucket_list.csv"), Duration::from_secs(5)).unwrap();
        assert_eq!(
            store.contents_url(),
            "https://api.github.com/repos/alice/lists/contents/data/bucket_list.csv"
        );
    }

    #[test]
    fn contents_url_escapes_segments() {
        let store = GithubStore::new(target("my data/list #1.csv"), Duration::from_secs(5)).unwrap();
        assert!(store.contents_url().ends_with("/contents/my%20data/list%20%231.csv"));
    }

    #[test]
    fn decode_wrapped_content() {
        let encoded = BASE64.encode("Title,Category\n\"a\",\"b\"\n");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);
        assert_eq!(decode_content(&wrapped).unwrap(), "Title,Category\n\"a\",\"b\"\n");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_content("!!!"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn oversized_entry_without_content_is_rejected() {
        let entry: ContentsEntry =
            serde_json::from_str(r#"{"content":"","sha":"abc","size":1500000,"encoding":"none"}"#)
                .unwrap();
        assert!(matches!(entry.into_remote(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn empty_file_entry_is_empty_content() {
        let entry: ContentsEntry =
            serde_json::from_str(r#"{"content":"","sha":"abc","size":0}"#).unwrap();
        let file = entry.into_remote().unwrap();
        assert_eq!(file.content, "");
        assert_eq!(file.sha, "abc");
    }

    #[test]
    fn put_body_omits_missing_sha() {
        let body = PutContents {
            message: "m",
            content: "Yg==".into(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }
}
