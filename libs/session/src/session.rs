//! The single active editing session

use crate::autosave::{AutosaveOptions, AutosaveOutcome, Autosaver};
use crate::error::{Error, Result};
use crate::store::{StateStore, QUESTIONNAIRE_KEY, STEP_KEY};
use ferrum_fhir_client::DocumentSource;
use ferrum_questionnaire::{
    default_document, from_fhir, is_default_skeleton, to_fhir, EditorDocument,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of asking the session to replace its document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Replaced,
    /// The current document has user content; call again with
    /// `confirmed = true` to discard it
    NeedsConfirmation,
}

/// Owns the lifted model exclusively, plus the store it auto-saves to.
pub struct EditSession {
    doc: EditorDocument,
    step: Option<String>,
    store: Arc<dyn StateStore>,
    autosaver: Autosaver,
}

impl EditSession {
    /// Start on the default document
    pub async fn new(store: Arc<dyn StateStore>, options: AutosaveOptions) -> Result<Self> {
        store.init().await?;
        Ok(Self {
            doc: default_document()?,
            step: None,
            autosaver: Autosaver::new(Arc::clone(&store), options),
            store,
        })
    }

    pub fn model(&self) -> &EditorDocument {
        &self.doc
    }

    pub fn model_mut(&mut self) -> &mut EditorDocument {
        &mut self.doc
    }

    pub fn lower(&self) -> Value {
        to_fhir(&self.doc)
    }

    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    pub fn set_step(&mut self, step: impl Into<String>) {
        self.step = Some(step.into());
    }

    /// Whether replacing the document would lose user content
    pub fn has_user_content(&self) -> bool {
        !is_default_skeleton(&self.lower())
    }

    /// Replace the document, unless that would discard edits the user has
    /// not confirmed losing. Pending auto-saves of the old document are
    /// dropped.
    pub fn load(&mut self, doc: EditorDocument, confirmed: bool) -> LoadOutcome {
        if !confirmed && self.has_user_content() {
            return LoadOutcome::NeedsConfirmation;
        }
        self.autosaver.cancel();
        self.doc = doc;
        tracing::info!(items = self.doc.tree.len(), "Session document replaced");
        LoadOutcome::Replaced
    }

    pub async fn load_from(
        &mut self,
        source: &dyn DocumentSource,
        confirmed: bool,
    ) -> Result<LoadOutcome> {
        if !confirmed && self.has_user_content() {
            return Ok(LoadOutcome::NeedsConfirmation);
        }
        tracing::info!(source = %source.describe(), "Loading questionnaire");
        let doc = source.load().await?;
        Ok(self.load(doc, true))
    }

    pub fn schedule_autosave(&self) -> JoinHandle<Result<AutosaveOutcome>> {
        self.autosaver.schedule(self.doc.clone(), self.step.clone())
    }

    pub async fn save_now(&self) -> Result<()> {
        self.autosaver
            .save_now(&self.doc, self.step.as_deref())
            .await
    }

    /// Resume the auto-saved session, if there is one
    pub async fn restore(&mut self) -> Result<bool> {
        let Some(saved) = self.store.load(QUESTIONNAIRE_KEY).await? else {
            return Ok(false);
        };
        self.autosaver.cancel();
        self.doc = from_fhir(&saved)?;
        self.step = match self.store.load(STEP_KEY).await? {
            Some(Value::String(step)) => Some(step),
            Some(other) => {
                return Err(Error::CorruptState {
                    key: STEP_KEY.to_string(),
                    reason: format!("expected a string, found {}", other),
                })
            }
            None => None,
        };
        tracing::info!(items = self.doc.tree.len(), step = ?self.step, "Session restored");
        Ok(true)
    }

    /// Forget the auto-saved session and start over on the default document
    pub async fn discard_autosave(&mut self) -> Result<()> {
        self.autosaver.clear().await?;
        self.doc = default_document()?;
        self.step = None;
        Ok(())
    }
}
