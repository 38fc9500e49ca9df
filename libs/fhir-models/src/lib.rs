//! FHIR data models
//!
//! Strongly-typed Rust structures for the parts of FHIR the questionnaire
//! builder reads and writes.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic models that work across FHIR R4, R4B, and R5
//!
//! Resources the builder edits structurally (the Questionnaire itself)
//! stay as `serde_json::Value`; the datatypes found inside them
//! (`Coding`, `Expression`, `Duration`, extensions and `value[x]`
//! choices) are modelled here. Every struct keeps unknown members in a
//! flattened map so nothing is lost on a parse/serialize cycle.
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::common::{Extension, TypedValue};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "url": "http://hl7.org/fhir/StructureDefinition/questionnaire-hidden",
//!     "valueBoolean": true
//! });
//!
//! let ext = Extension::parse(&raw).unwrap();
//! assert_eq!(ext.value, Some(TypedValue::Boolean(true)));
//! assert_eq!(ext.to_json(), raw);
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
