//! Editing session for the questionnaire builder
//!
//! An [`EditSession`] owns one lifted document. Edits go through
//! [`EditSession::model_mut`]; [`EditSession::schedule_autosave`] lowers
//! and persists the document to a [`StateStore`] once a burst of edits has
//! settled. A later process resumes with [`EditSession::restore`].

pub mod autosave;
pub mod error;
pub mod session;
pub mod store;

pub use autosave::{AutosaveOptions, AutosaveOutcome, Autosaver};
pub use error::{Error, Result};
pub use session::{EditSession, LoadOutcome};
pub use store::{FileStore, MemoryStore, StateStore, QUESTIONNAIRE_KEY, STEP_KEY};
