//! End-to-end generation pipeline
//!
//! compose → complete → extract → normalize → conform
//!
//! The network round-trip is the only suspension point. Every stage after
//! it is synchronous and side-effect free apart from logging.

use std::time::Instant;
use tracing::{debug, info, instrument};

use super::{ConstraintBundle, Selection, compose};
use crate::ai::{
    CatalogPolicy, ConformanceChecker, ConformanceReport, ExtractionTier, PinPolicy,
    SharedProvider, TimeoutConfig, TokenUsage, extract_json, normalize, with_timeout,
};
use crate::catalog::SharedCatalog;
use crate::types::{BuildGuide, Result};

/// A validated guide plus what it took to get it
#[derive(Debug, Clone)]
pub struct GeneratedGuide {
    pub guide: BuildGuide,
    pub report: ConformanceReport,
    pub usage: TokenUsage,
    pub tier: ExtractionTier,
}

pub struct GuidePipeline {
    provider: SharedProvider,
    catalog: SharedCatalog,
    conformance: ConformanceChecker,
    timeouts: TimeoutConfig,
}

impl GuidePipeline {
    /// Pipeline with default policies (`pins = reject`, `catalog = warn`)
    pub fn new(provider: SharedProvider, catalog: SharedCatalog) -> Self {
        let conformance = ConformanceChecker::new(
            catalog.clone(),
            PinPolicy::default(),
            CatalogPolicy::default(),
        );
        Self {
            provider,
            catalog,
            conformance,
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_policies(mut self, pins: PinPolicy, catalog: CatalogPolicy) -> Self {
        self.conformance = ConformanceChecker::new(self.catalog.clone(), pins, catalog);
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run one generation attempt
    #[instrument(
        skip_all,
        fields(
            weapon = %selection.weapon,
            aspect = %selection.aspect,
            pinned = constraints.len(),
            refine = prior.is_some(),
        )
    )]
    pub async fn run(
        &self,
        selection: &Selection,
        constraints: &ConstraintBundle,
        prior: Option<&BuildGuide>,
    ) -> Result<GeneratedGuide> {
        let start = Instant::now();

        let prompt = compose(self.catalog.as_ref(), selection, constraints, prior);
        debug!("Composed prompt ({} chars)", prompt.len());

        let response = with_timeout(
            self.timeouts.llm_request,
            self.provider.complete(&prompt),
            "guide completion",
        )
        .await?;

        let extracted = extract_json(&response.content);
        debug!(
            "Extracted {} chars via {:?}",
            extracted.text.len(),
            extracted.tier
        );

        let mut guide = normalize(extracted.text)?;
        let report = self
            .conformance
            .check(&mut guide, constraints, selection.weapon_id())?;

        info!(
            "Generated guide for {} in {}ms ({} tokens, {} issue(s))",
            guide.aspect_name,
            start.elapsed().as_millis(),
            response.usage.total(),
            report.issues.len()
        );

        Ok(GeneratedGuide {
            guide,
            report,
            usage: response.usage,
            tier: extracted.tier,
        })
    }
}
