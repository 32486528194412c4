//! AI Response Validation
//!
//! Two stages run on extracted text:
//! - [`normalize`]: structural parse into `BuildGuide`, provenance stamping
//! - [`ConformanceChecker`]: pinned-item and catalog conformance per policy
//!
//! Structural failures are always fatal. Conformance failures are fatal
//! only under the `reject` policies.

mod conformance;
mod schema;

pub use conformance::{CatalogPolicy, ConformanceChecker, ConformanceReport, PinPolicy};
pub use schema::normalize;
