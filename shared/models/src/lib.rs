//! # DocSmith Core Domain Models
//!
//! Transient, in-memory values shared by the DocSmith crates. Nothing here is
//! persisted; each value lives for one user action or one page lifetime.
//!
//! ## Key Models
//!
//! - **Availability**: tri-state readiness of an on-device model, with the
//!   signal vocabularies of the modern and legacy surfaces
//! - **SessionOptions**: capability-specific creation options
//! - **ProgressEvent**: one download-progress sample
//! - **ExtractedDocument**: plain text derived from an uploaded PDF or DOCX
//! - **AuthSession**: identity of the signed-in user (read-only here)

pub mod ai;
pub mod auth;
pub mod capability;
pub mod document;
pub mod language;


pub use ai::*;
pub use auth::*;
pub use capability::*;
pub use document::*;
pub use language::*;
