//! Collaborators of the questionnaire builder
//!
//! The editing model in `ferrum-questionnaire` is pure. This crate moves
//! documents in and out of it: files on disk, a FHIR server that stores
//! Questionnaires, and a terminology server that expands answer value sets.
//!
//! # Example
//!
//! ```rust,no_run
//! use ferrum_fhir_client::{ClientConfig, FhirClient, SearchParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FhirClient::new(&ClientConfig::new("https://hapi.fhir.org/baseR4"))?;
//! let results = client
//!     .search(&SearchParams { term: Some("vital signs".into()), ..Default::default() })
//!     .await?;
//! println!("{} matches", results.total.unwrap_or(0));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod document;
pub mod error;
pub mod terminology;

pub use client::{ClientConfig, FhirClient, SearchParams};
pub use document::{DocumentSink, DocumentSource, FileDocument, ServerDocument};
pub use error::{Error, Result};
pub use terminology::TerminologyClient;
