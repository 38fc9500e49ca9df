//! Persisted local state

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Lowered Questionnaire of the auto-saved session
pub const QUESTIONNAIRE_KEY: &str = "fhirQuestionnaire";
/// Last guiding step, stored as a JSON string
pub const STEP_KEY: &str = "state";

/// Key/value store behind auto-save.
///
/// A missing key means "no auto-saved session"; `clear` removes every key.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn init(&self) -> Result<()>;
    async fn load(&self, key: &str) -> Result<Option<Value>>;
    async fn save(&self, key: &str, value: &Value) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        check_key(key)?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        check_key(key)?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

/// One `<key>.json` file per key under a state directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tracing::debug!(dir = %self.dir.display(), "State directory ready");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path(key)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::CorruptState {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path(key)?;
        // Replace atomically through a sibling temp file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                tokio::fs::remove_file(&path).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_lifecycle() {
        let store = MemoryStore::new();
        store.init().await.unwrap();
        assert_eq!(store.load(STEP_KEY).await.unwrap(), None);

        store.save(STEP_KEY, &json!("items")).await.unwrap();
        assert_eq!(store.load(STEP_KEY).await.unwrap(), Some(json!("items")));

        store.clear().await.unwrap();
        assert_eq!(store.load(STEP_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state"));
        store.init().await.unwrap();

        let doc = json!({"resourceType": "Questionnaire", "status": "draft"});
        store.save(QUESTIONNAIRE_KEY, &doc).await.unwrap();
        assert!(store.dir().join("fhirQuestionnaire.json").exists());
        assert_eq!(store.load(QUESTIONNAIRE_KEY).await.unwrap(), Some(doc));

        let other = FileStore::new(store.dir());
        assert!(other.load(QUESTIONNAIRE_KEY).await.unwrap().is_some());

        store.clear().await.unwrap();
        assert_eq!(store.load(QUESTIONNAIRE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        tokio::fs::write(dir.path().join("state.json"), "{oops").await.unwrap();
        assert!(matches!(
            store.load(STEP_KEY).await,
            Err(Error::CorruptState { .. })
        ));
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.save("../evil", &json!(1)).await,
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(MemoryStore::new().load("").await, Err(Error::InvalidKey(_))));
    }

    #[tokio::test]
    async fn clearing_a_missing_directory_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path().join("never-created"))
            .clear()
            .await
            .unwrap();
    }
}
