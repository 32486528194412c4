//! Generate Command
//!
//! Fresh build guide for a weapon aspect.
//!
//! Usage:
//!   boonforge generate -w "Witch's Staff" -a "Aspect of Circe" [-o guide.json] [-f json]

use std::path::PathBuf;

use tokio::runtime::Runtime;
use tracing::info;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ServiceOverrides, resolve_selection, write_json};
use crate::types::{PinSet, Result};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub weapon: String,
    pub aspect: String,
    pub service: ServiceOverrides,
    /// Save the guide as JSON (input for `refine`)
    pub output: Option<PathBuf>,
    /// text or json
    pub format: String,
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let selection = resolve_selection(&options.weapon, &options.aspect)?;
    let ctx = CommandContext::load(options.service)?;
    let session = ctx.session()?;

    info!(
        "Generating with {} for {} / {}",
        ctx.config.llm.provider, selection.weapon, selection.aspect
    );

    let rt = Runtime::new()?;
    let guide = rt.block_on(ctx.with_retries(|| session.generate(selection.clone())))?;

    if let Some(path) = &options.output {
        write_json(path, &guide)?;
        info!("Saved guide to {}", path.display());
    }

    let out = Output::new();
    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&guide)?);
    } else {
        out.guide(&guide, &PinSet::new());
        if let Some(report) = session.last_report() {
            out.report(&report);
        }
        if let Some(path) = &options.output {
            out.success(&format!("Guide saved: {}", path.display()));
        }
    }

    Ok(())
}
