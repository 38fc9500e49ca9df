//! Where editor documents come from and go to

use crate::client::FhirClient;
use crate::error::{Error, Result};
use async_trait::async_trait;
use ferrum_questionnaire::{from_fhir, parse_questionnaire, EditorDocument, LformsConverter};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of a Questionnaire to edit
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load(&self) -> Result<EditorDocument>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Destination for a lowered Questionnaire.
///
/// Returns the resource as stored, which for a server includes the
/// assigned id and `meta`.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn save(&self, resource: &Value) -> Result<Value>;
}

/// A Questionnaire (or legacy LForms form) on disk
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for FileDocument {
    async fn load(&self) -> Result<EditorDocument> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let doc = parse_questionnaire(&text, &LformsConverter)?;
        tracing::info!(path = %self.path.display(), items = doc.tree.len(), "Loaded questionnaire");
        Ok(doc)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl DocumentSink for FileDocument {
    async fn save(&self, resource: &Value) -> Result<Value> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut text = serde_json::to_string_pretty(resource)?;
        text.push('\n');
        tokio::fs::write(&self.path, text).await?;
        tracing::info!(path = %self.path.display(), "Saved questionnaire");
        Ok(resource.clone())
    }
}

/// A Questionnaire on a FHIR server.
///
/// Loading always reads the newest version. Saving updates when an id is
/// known and creates otherwise.
pub struct ServerDocument {
    client: Arc<FhirClient>,
    id: Option<String>,
}

impl ServerDocument {
    pub fn new(client: Arc<FhirClient>, id: Option<String>) -> Self {
        Self { client, id }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
impl DocumentSource for ServerDocument {
    async fn load(&self) -> Result<EditorDocument> {
        let id = self
            .id
            .as_deref()
            .ok_or_else(|| Error::MissingId("cannot load a questionnaire without id".to_string()))?;
        let raw = self.client.read_latest(id).await?;
        Ok(from_fhir(&raw)?)
    }

    fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("{}/Questionnaire/{}", self.client.base_url(), id),
            None => format!("{}/Questionnaire", self.client.base_url()),
        }
    }
}

#[async_trait]
impl DocumentSink for ServerDocument {
    async fn save(&self, resource: &Value) -> Result<Value> {
        match &self.id {
            Some(id) => {
                let mut resource = resource.clone();
                if let Some(obj) = resource.as_object_mut() {
                    obj.insert("id".to_string(), Value::String(id.clone()));
                }
                self.client.update(&resource).await
            }
            None => self.client.create(resource).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use ferrum_questionnaire::to_fhir;
    use serde_json::json;

    #[tokio::test]
    async fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileDocument::new(dir.path().join("nested").join("form.json"));
        let raw = json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [{"linkId": "a", "type": "string", "text": "A"}]
        });

        file.save(&raw).await.unwrap();
        let doc = file.load().await.unwrap();
        assert_eq!(to_fhir(&doc), raw);
        assert!(file.describe().ends_with("form.json"));
    }

    #[tokio::test]
    async fn file_load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = FileDocument::new(&path).load().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Questionnaire(ferrum_questionnaire::Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileDocument::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn server_load_needs_an_id() {
        let client = Arc::new(FhirClient::new(&ClientConfig::new("https://fhir.example.org")).unwrap());
        let doc = ServerDocument::new(client, None);
        assert!(matches!(doc.load().await, Err(Error::MissingId(_))));
        assert_eq!(doc.describe(), "https://fhir.example.org/Questionnaire");
    }
}
