//! Guide Generation
//!
//! Everything between a weapon/aspect selection and a validated
//! `BuildGuide`:
//!
//! - [`aggregate`]: pins → full-detail constraint bundle
//! - [`compose`]: selection + catalog + constraints → prompt text
//! - [`GuidePipeline`]: one complete generation attempt
//! - [`GuideSession`]: generate / regenerate / reset with at most one
//!   attempt in flight

mod composer;
mod constraints;
mod pipeline;
mod session;

pub use composer::{Selection, compose};
pub use constraints::{ConstraintBundle, aggregate};
pub use pipeline::{GeneratedGuide, GuidePipeline};
pub use session::{GuideSession, SessionState};
