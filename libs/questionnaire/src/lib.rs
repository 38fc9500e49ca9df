//! FHIR Questionnaire lifting and lowering
//!
//! This crate turns a raw FHIR R4 Questionnaire into an editing model and
//! back. Lifting folds help items into their parents, decodes the SDC
//! extensions the builder understands, resolves enableWhen targets to
//! item handles and computes inherited hidden flags. Lowering reverses
//! this and prunes empty and internal (`__$`) members. An unedited
//! document lowers back to what was lifted.
//!
//! # Example
//!
//! ```rust
//! use ferrum_questionnaire::{from_fhir, to_fhir};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = json!({
//!     "resourceType": "Questionnaire",
//!     "status": "draft",
//!     "item": [
//!         {"linkId": "smoker", "type": "boolean", "text": "Do you smoke?"},
//!         {"linkId": "packs", "type": "integer", "enableWhen": [
//!             {"question": "smoker", "operator": "=", "answerBoolean": true}
//!         ]}
//!     ]
//! });
//!
//! let mut doc = from_fhir(&raw)?;
//! let smoker = doc.tree.find_by_link_id("smoker").unwrap();
//! doc.tree.rename(smoker, "tobacco")?;
//!
//! let lowered = to_fhir(&doc);
//! assert_eq!(lowered["item"][1]["enableWhen"][0]["question"], "tobacco");
//! # Ok(())
//! # }
//! ```

pub mod codecs;
pub mod diagnostics;
pub mod error;
pub mod hidden;
pub mod legacy;
pub mod lift;
pub mod linkid;
pub mod lower;
pub mod model;
pub mod prune;
pub mod publish;
pub mod tree;
pub mod units;
pub mod urls;

pub use codecs::CodecContext;
pub use diagnostics::{check, Diagnostic};
pub use error::{Error, Result};
pub use legacy::{LegacyConverter, LformsConverter};
pub use lift::{
    default_document, duplicate_document, from_fhir, is_default_skeleton, parse_questionnaire,
};
pub use linkid::LinkIdIndex;
pub use lower::{to_fhir, to_fhir_with};
pub use model::{
    answer_field_for, DocumentState, EditorDocument, EnableWhen, ItemNode, ItemState, QuestionRef,
};
pub use publish::{PublishMode, PublishOptions, UserProfile};
pub use tree::{ItemTree, NodeId, Position};
pub use units::{TimeUnits, UcumUnit, UnitResolver};
