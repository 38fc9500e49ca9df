//! Version-agnostic FHIR models
//!
//! Types that work across FHIR R4, R4B, and R5

pub mod bundle;
pub mod complex;
pub mod error;
pub mod extension;
pub mod operation_outcome;
pub mod questionnaire;
pub mod typed_value;
pub mod value_set;

// Re-export commonly used types
pub use bundle::*;
pub use complex::*;
pub use error::{Error, Result};
pub use extension::*;
pub use operation_outcome::*;
pub use questionnaire::*;
pub use typed_value::*;
pub use value_set::*;
