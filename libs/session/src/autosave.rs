//! Debounced auto-save

use crate::error::Result;
use crate::store::{StateStore, QUESTIONNAIRE_KEY, STEP_KEY};
use ferrum_questionnaire::{to_fhir, EditorDocument};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub debounce: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Saved,
    /// A later schedule (or a cancel) took over before this one ran
    Superseded,
}

/// Coalesces bursts of edits into one lowering and store write.
///
/// Every `schedule` bumps a generation counter. A scheduled pass waits out
/// the debounce window and only lowers and writes if its generation is
/// still the newest, so the last schedule in a burst wins.
///
/// Writes are serialized by one lock and the generation is checked again
/// once it is held, so a pass that was overtaken while waiting never lands
/// after a newer write.
#[derive(Clone)]
pub struct Autosaver {
    store: Arc<dyn StateStore>,
    options: AutosaveOptions,
    generation: Arc<AtomicU64>,
    write_lock: Arc<Mutex<()>>,
}

impl Autosaver {
    pub fn new(store: Arc<dyn StateStore>, options: AutosaveOptions) -> Self {
        Self {
            store,
            options,
            generation: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn options(&self) -> &AutosaveOptions {
        &self.options
    }

    pub fn schedule(
        &self,
        snapshot: EditorDocument,
        step: Option<String>,
    ) -> JoinHandle<Result<AutosaveOutcome>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let store = Arc::clone(&self.store);
        let write_lock = Arc::clone(&self.write_lock);
        let debounce = self.options.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "Autosave superseded");
                return Ok(AutosaveOutcome::Superseded);
            }
            let lowered = to_fhir(&snapshot);
            let _guard = write_lock.lock().await;
            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "Autosave superseded while waiting to write");
                return Ok(AutosaveOutcome::Superseded);
            }
            write(store.as_ref(), &lowered, step.as_deref()).await?;
            tracing::debug!(generation, "Autosaved");
            Ok(AutosaveOutcome::Saved)
        })
    }

    /// Drop every pending pass
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Lower and write right away, superseding anything pending. A pass
    /// already writing finishes first.
    pub async fn save_now(&self, doc: &EditorDocument, step: Option<&str>) -> Result<()> {
        self.cancel();
        let lowered = to_fhir(doc);
        let _guard = self.write_lock.lock().await;
        write(self.store.as_ref(), &lowered, step).await
    }

    /// Drop every pending pass and clear the store once no write is in
    /// flight
    pub async fn clear(&self) -> Result<()> {
        self.cancel();
        let _guard = self.write_lock.lock().await;
        self.store.clear().await
    }
}

async fn write(store: &dyn StateStore, lowered: &Value, step: Option<&str>) -> Result<()> {
    store.save(QUESTIONNAIRE_KEY, lowered).await?;
    if let Some(step) = step {
        store.save(STEP_KEY, &Value::String(step.to_string())).await?;
    }
    Ok(())
}
