//! Refine Command
//!
//! Regenerate a saved guide, keeping pinned items and steering away from
//! its playstyle.
//!
//! Usage:
//!   boonforge refine -g guide.json -w "Witch's Staff" \
//!       [--pin-boon attack] [--pin-hammer "Vortex Strike"] [--pin-duo "Sun Worshipper"]

use std::path::PathBuf;

use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::normalize;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ServiceOverrides, resolve_selection, write_json};
use crate::types::{BuildGuide, ForgeError, PinSet, Result, Slot};

#[derive(Debug, Clone, Default)]
pub struct RefineOptions {
    /// Guide JSON written by `generate -o`
    pub guide: PathBuf,
    pub weapon: String,
    /// Defaults to the guide's aspect
    pub aspect: Option<String>,
    pub pin_boons: Vec<Slot>,
    pub pin_hammers: Vec<String>,
    pub pin_duos: Vec<String>,
    pub service: ServiceOverrides,
    /// Where to save the refined guide; defaults to overwriting `guide`
    pub output: Option<PathBuf>,
    pub format: String,
}

pub fn run(options: RefineOptions) -> Result<()> {
    let content = std::fs::read_to_string(&options.guide)?;
    let previous = normalize(&content)?;

    let aspect = options
        .aspect
        .clone()
        .unwrap_or_else(|| previous.aspect_name.clone());
    let selection = resolve_selection(&options.weapon, &aspect)?;
    let pins = build_pins(&previous, &options)?;

    let ctx = CommandContext::load(options.service.clone())?;
    let session = ctx.session()?;
    session.resume(selection, previous)?;

    info!(
        "Refining with {} pinned boon(s), {} hammer(s), {} duo(s)",
        pins.boons.len(),
        pins.hammers.len(),
        pins.duos.len()
    );

    let rt = Runtime::new()?;
    let guide = rt.block_on(ctx.with_retries(|| session.regenerate(pins.clone())))?;

    let path = options.output.as_ref().unwrap_or(&options.guide);
    write_json(path, &guide)?;

    let out = Output::new();
    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&guide)?);
    } else {
        out.guide(&guide, &pins);
        if let Some(report) = session.last_report() {
            out.report(&report);
        }
        out.success(&format!("Guide saved: {}", path.display()));
    }

    Ok(())
}

/// Pins from the command line; hammers and duos must name entries of the guide
fn build_pins(guide: &BuildGuide, options: &RefineOptions) -> Result<PinSet> {
    let mut pins = PinSet::new();

    for slot in &options.pin_boons {
        if !pins.is_boon_pinned(*slot) {
            pins.toggle_boon(guide, *slot);
        }
    }

    for name in &options.pin_hammers {
        if guide.hammer(name).is_none() {
            return Err(ForgeError::UnknownSelection(format!(
                "hammer '{}' is not in the guide",
                name
            )));
        }
        pins.hammers.insert(name.clone());
    }

    for name in &options.pin_duos {
        if guide.duo(name).is_none() {
            return Err(ForgeError::UnknownSelection(format!(
                "synergy '{}' is not in the guide",
                name
            )));
        }
        pins.duos.insert(name.clone());
    }

    Ok(pins)
}
