//! Constraint Aggregator
//!
//! Resolves a `PinSet` against the current guide into the full
//! recommendation values the next generation must restate verbatim.

use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{
    BoonRecommendation, BuildGuide, DuoRecommendation, HammerRecommendation, PinSet, Slot,
};

/// Pinned items with full detail, ready for prompt composition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintBundle {
    pub pinned_boons: BTreeMap<Slot, BoonRecommendation>,
    pub pinned_hammers: Vec<HammerRecommendation>,
    pub pinned_duos: Vec<DuoRecommendation>,
}

impl ConstraintBundle {
    pub fn is_empty(&self) -> bool {
        self.pinned_boons.is_empty() && self.pinned_hammers.is_empty() && self.pinned_duos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pinned_boons.len() + self.pinned_hammers.len() + self.pinned_duos.len()
    }
}

/// Build the constraint bundle for the next generation.
///
/// Pinned boons already carry their full value. Pinned hammer and duo
/// names are looked up in `guide`; names with no match are dropped so the
/// bundle only ever describes items that currently exist.
pub fn aggregate(guide: Option<&BuildGuide>, pins: &PinSet) -> ConstraintBundle {
    let mut bundle = ConstraintBundle {
        pinned_boons: pins.boons.clone(),
        ..Default::default()
    };

    let Some(guide) = guide else {
        if !pins.hammers.is_empty() || !pins.duos.is_empty() {
            debug!("No current guide; dropping hammer and duo pins");
        }
        return bundle;
    };

    // Guide order, not pin order, so the bundle is stable across toggles.
    bundle.pinned_hammers = guide
        .hammers
        .iter()
        .filter(|h| pins.is_hammer_pinned(&h.name))
        .cloned()
        .collect();
    bundle.pinned_duos = guide
        .duos
        .iter()
        .filter(|d| pins.is_duo_pinned(&d.boon_name))
        .cloned()
        .collect();

    let dropped = pins.hammers.len().saturating_sub(bundle.pinned_hammers.len())
        + pins.duos.len().saturating_sub(bundle.pinned_duos.len());
    if dropped > 0 {
        debug!("Dropped {} stale pin(s) not present in current guide", dropped);
    }

    bundle
}
