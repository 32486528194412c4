//! Response Extractor
//!
//! Locates the JSON object inside a free-form completion. First match wins:
//!
//! 1. interior of a ```` ```json ```` fenced block, trimmed
//! 2. first `{` through last `}` inclusive
//! 3. the trimmed text unchanged
//!
//! This is a heuristic over indices, not a parser: brace balance is never
//! inspected and the result is still untrusted until schema validation.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static JSON_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").ok());

/// Which tier produced the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    Fenced,
    BraceSpan,
    Raw,
}

/// Candidate JSON text borrowed from the raw response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    pub text: &'a str,
    pub tier: ExtractionTier,
}

/// Extract the JSON-bearing substring of a raw completion
pub fn extract_json(raw: &str) -> Extracted<'_> {
    if let Some(interior) = JSON_FENCE
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        trace!("Extracted JSON from fenced block");
        return Extracted {
            text: interior.as_str().trim(),
            tier: ExtractionTier::Fenced,
        };
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}'))
        && start < end
    {
        trace!("Extracted JSON from brace span {}..={}", start, end);
        return Extracted {
            text: &raw[start..=end],
            tier: ExtractionTier::BraceSpan,
        };
    }

    Extracted {
        text: raw.trim(),
        tier: ExtractionTier::Raw,
    }
}
