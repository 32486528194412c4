//! Schema Validator/Normalizer
//!
//! Parses extracted text into a `BuildGuide` and stamps provenance.

use tracing::{debug, warn};

use crate::types::{BuildGuide, ForgeError, Result, Source};

/// Parse candidate JSON into a guide and replace its `sources`.
///
/// Any parse failure is fatal and becomes `ForgeError::Parse`; the serde
/// diagnostic stays in the error detail and the logs only.
pub fn normalize(candidate: &str) -> Result<BuildGuide> {
    let mut guide: BuildGuide = serde_json::from_str(candidate).map_err(|e| {
        warn!("Guide JSON rejected: {}", e);
        debug!("Rejected candidate ({} chars): {}", candidate.len(), preview(candidate));
        ForgeError::parse(e.to_string())
    })?;

    if !guide.sources.is_empty() {
        debug!("Discarding {} generator-supplied source(s)", guide.sources.len());
    }
    guide.sources = vec![Source::local_database()];

    Ok(guide)
}

fn preview(text: &str) -> &str {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
