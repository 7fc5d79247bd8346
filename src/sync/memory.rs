use async_trait::async_trait;
use std::sync::Mutex;

use super::{ContentStore, RemoteFile, StoreError};

#[derive(Default)]
struct Inner {
    file: Option<RemoteFile>,
    revision: u32,
    /// Content a concurrent writer stores right after the next fetch.
    race: Option<String>,
}

impl Inner {
    fn replace(&mut self, content: &str, sha_prefix: &str) -> String {
        self.revision += 1;
        let sha = format!("{}{}", sha_prefix, self.revision);
        self.file = Some(RemoteFile {
            content: content.to_string(),
            sha: sha.clone(),
        });
        sha
    }
}

/// In-process stand-in for the hosting API, with its optimistic-concurrency
/// check: a write must carry the current sha, or none if the file is absent.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// Status to answer fetches with instead of the file.
    fail_fetch: Option<u16>,
    pub writes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_content(content: &str) -> Self {
        let store = Self::default();
        store.lock().file = Some(RemoteFile {
            content: content.to_string(),
            sha: "sha-0".to_string(),
        });
        store
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_fetch: Some(status),
            ..Self::default()
        }
    }

    /// After the next fetch, another writer replaces the file with `content`,
    /// so the caller's following write carries a stale sha.
    pub fn racing_once(initial: &str, content: &str) -> Self {
        let store = Self::with_content(initial);
        store.lock().race = Some(content.to_string());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn content(&self) -> Option<String> {
        self.lock().file.as_ref().map(|f| f.content.clone())
    }

    pub fn sha(&self) -> Option<String> {
        self.lock().file.as_ref().map(|f| f.sha.clone())
    }

    /// Change the file behind the caller's back, as a concurrent writer would.
    pub fn bump(&self, content: &str) {
        self.lock().replace(content, "sha-x");
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self) -> Result<Option<RemoteFile>, StoreError> {
        if let Some(status) = self.fail_fetch {
            return Err(StoreError::Fetch {
                status,
                body: "stub failure".into(),
            });
        }
        let mut inner = self.lock();
        let file = inner.file.clone();
        if let Some(content) = inner.race.take() {
            inner.replace(&content, "sha-x");
        }
        Ok(file)
    }

    async fn write(
        &self,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<serde_json::Value, StoreError> {
        let new_sha = {
            let mut inner = self.lock();
            let current = inner.file.as_ref().map(|f| f.sha.as_str());
            if current != sha {
                return Err(StoreError::Conflict {
                    status: 409,
                    body: format!("expected {:?}, got {:?}", current, sha),
                });
            }
            inner.replace(content, "sha-")
        };
        self.writes.lock().unwrap().push(message.to_string());

        Ok(serde_json::json!({ "content": { "sha": new_sha }, "commit": { "message": message } }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bump_and_write_make_progress() {
        let store = Arc::new(MemoryStore::with_content("a\n"));
        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    if i % 2 == 0 {
                        store.bump("b\n");
                    } else {
                        let sha = store.sha();
                        let _ = store.write("c\n", sha.as_deref(), "m").await;
                    }
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert!(store.content().is_some());
    }

    #[tokio::test]
    async fn race_once_invalidates_the_fetched_sha() {
        let store = MemoryStore::racing_once("a\n", "b\n");
        let file = store.fetch().await.unwrap().unwrap();
        assert_eq!(file.content, "a\n");
        assert!(store.write("c\n", Some(&file.sha), "m").await.unwrap_err().is_conflict());

        let file = store.fetch().await.unwrap().unwrap();
        assert_eq!(file.content, "b\n");
        store.write("c\n", Some(&file.sha), "m").await.unwrap();
        assert_eq!(store.content().as_deref(), Some("c\n"));
    }
}
