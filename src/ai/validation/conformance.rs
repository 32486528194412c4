//! Post-parse conformance checks
//!
//! A structurally valid guide can still ignore a pin or invent a boon.
//! This stage compares the guide against the constraint bundle and the
//! reference catalog, then rejects, repairs or merely reports per policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::catalog::SharedCatalog;
use crate::constants::guide::{DEFAULT_RARITY, DUO_RANGE, HAMMER_RANGE, MOBILITY_GOD};
use crate::guide::ConstraintBundle;
use crate::types::{BoonRecommendation, BuildGuide, Result, Slot, ValidationError, ValidationErrorKind};

/// What to do when the generator alters or drops a pinned item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPolicy {
    /// Fail the generation with `ConstraintViolation`
    #[default]
    Reject,
    /// Overwrite the offending entries with the pinned values
    Restore,
    /// Accept the guide as returned
    Ignore,
}

/// What to do when a recommendation is not in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogPolicy {
    /// Log and keep the guide
    #[default]
    Warn,
    /// Fail the generation with `ConstraintViolation`
    Reject,
    /// Skip catalog checks
    Off,
}

impl fmt::Display for PinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Restore => write!(f, "restore"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

impl fmt::Display for CatalogPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Reject => write!(f, "reject"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Findings that did not fail the guide
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    /// Pinned entries written back into the guide
    pub restored: usize,
    /// Non-fatal issues (catalog misses, ignored pin drift, odd counts)
    pub issues: Vec<ValidationError>,
}

impl ConformanceReport {
    pub fn is_clean(&self) -> bool {
        self.restored == 0 && self.issues.is_empty()
    }
}

pub struct ConformanceChecker {
    catalog: SharedCatalog,
    pins: PinPolicy,
    catalog_policy: CatalogPolicy,
}

impl ConformanceChecker {
    pub fn new(catalog: SharedCatalog, pins: PinPolicy, catalog_policy: CatalogPolicy) -> Self {
        Self {
            catalog,
            pins,
            catalog_policy,
        }
    }

    /// Check `guide` against the pins in `bundle` and the catalog.
    ///
    /// `weapon_id` scopes the hammer lookup; hammers are not checked when
    /// it is unknown.
    pub fn check(
        &self,
        guide: &mut BuildGuide,
        bundle: &ConstraintBundle,
        weapon_id: Option<&str>,
    ) -> Result<ConformanceReport> {
        let mut report = ConformanceReport::default();

        settle_default_rarity(guide, bundle);
        let drift = pin_drift(guide, bundle);
        if !drift.is_empty() {
            match self.pins {
                PinPolicy::Reject => {
                    for issue in &drift {
                        warn!("{}", issue);
                    }
                    return Err(drift.into_iter().next().map(Into::into).unwrap_or_else(
                        || ValidationError::new(ValidationErrorKind::PinnedItem, "pin drift").into(),
                    ));
                }
                PinPolicy::Restore => {
                    report.restored = restore_pins(guide, bundle);
                    warn!(
                        "Generator altered {} pinned item(s); restored {}",
                        drift.len(),
                        report.restored
                    );
                }
                PinPolicy::Ignore => {
                    debug!("Ignoring {} pinned item mismatch(es)", drift.len());
                    report.issues.extend(drift);
                }
            }
        }

        if self.catalog_policy != CatalogPolicy::Off {
            let misses = self.catalog_misses(guide, bundle, weapon_id);
            if self.catalog_policy == CatalogPolicy::Reject
                && let Some(first) = misses.first()
            {
                return Err(first.clone().into());
            }
            for miss in &misses {
                warn!("{}", miss);
            }
            report.issues.extend(misses);
        }

        report.issues.extend(count_issues(guide));
        Ok(report)
    }

    fn catalog_misses(
        &self,
        guide: &BuildGuide,
        bundle: &ConstraintBundle,
        weapon_id: Option<&str>,
    ) -> Vec<ValidationError> {
        let mut misses = Vec::new();

        // Pinned items were accepted earlier; re-flagging them would make a
        // pinned guide impossible to refine under the reject policy.
        for (slot, boon) in guide.boons.iter() {
            if bundle.pinned_boons.contains_key(&slot) {
                continue;
            }
            if !self.catalog.has_boon(&boon.god, &boon.boon_name) {
                misses.push(
                    ValidationError::new(
                        ValidationErrorKind::Catalog,
                        format!("{} has no boon named '{}'", boon.god, boon.boon_name),
                    )
                    .with_field(format!("boons.{}", slot)),
                );
            }
            if slot == Slot::Sprint && boon.god == MOBILITY_GOD {
                misses.push(
                    ValidationError::new(
                        ValidationErrorKind::Catalog,
                        format!("{} boons are not allowed in the sprint slot", MOBILITY_GOD),
                    )
                    .with_field("boons.sprint"),
                );
            }
        }

        if let Some(weapon_id) = weapon_id {
            for hammer in &guide.hammers {
                if bundle.pinned_hammers.iter().any(|h| h.name == hammer.name) {
                    continue;
                }
                if !self.catalog.has_hammer(weapon_id, &hammer.name) {
                    misses.push(
                        ValidationError::new(
                            ValidationErrorKind::Catalog,
                            format!("'{}' is not a {} hammer", hammer.name, weapon_id),
                        )
                        .with_field("hammers"),
                    );
                }
            }
        }

        for duo in &guide.duos {
            if bundle.pinned_duos.iter().any(|d| d.boon_name == duo.boon_name) {
                continue;
            }
            if !self.catalog.has_synergy(&duo.boon_name) {
                misses.push(
                    ValidationError::new(
                        ValidationErrorKind::Catalog,
                        format!("Unknown synergy '{}'", duo.boon_name),
                    )
                    .with_field("duos"),
                );
            }
        }

        misses
    }
}

/// A pinned boon with no rarity is kept when the generator echoes it back
/// with the default rarity. The pinned value is written back so the slot
/// stays byte-identical.
fn settle_default_rarity(guide: &mut BuildGuide, bundle: &ConstraintBundle) {
    for (slot, pinned) in &bundle.pinned_boons {
        if pinned.rarity.is_some() {
            continue;
        }
        let current = guide.boons.get_mut(*slot);
        if current.rarity.as_deref() == Some(DEFAULT_RARITY)
            && (BoonRecommendation {
                rarity: None,
                ..current.clone()
            }) == *pinned
        {
            debug!("Pinned {} boon came back with default rarity", slot);
            *current = pinned.clone();
        }
    }
}

/// Every pinned entry that is missing or differs in the guide
fn pin_drift(guide: &BuildGuide, bundle: &ConstraintBundle) -> Vec<ValidationError> {
    let mut drift = Vec::new();

    for (slot, pinned) in &bundle.pinned_boons {
        if guide.boons.get(*slot) != pinned {
            drift.push(
                ValidationError::new(
                    ValidationErrorKind::PinnedItem,
                    format!("pinned boon '{}' was not kept", pinned.boon_name),
                )
                .with_field(format!("boons.{}", slot)),
            );
        }
    }

    for pinned in &bundle.pinned_hammers {
        if !guide.hammers.contains(pinned) {
            drift.push(
                ValidationError::new(
                    ValidationErrorKind::PinnedItem,
                    format!("pinned hammer '{}' was not kept", pinned.name),
                )
                .with_field("hammers"),
            );
        }
    }

    for pinned in &bundle.pinned_duos {
        if !guide.duos.contains(pinned) {
            drift.push(
                ValidationError::new(
                    ValidationErrorKind::PinnedItem,
                    format!("pinned duo '{}' was not kept", pinned.boon_name),
                )
                .with_field("duos"),
            );
        }
    }

    drift
}

/// Write pinned values back; returns how many entries changed
fn restore_pins(guide: &mut BuildGuide, bundle: &ConstraintBundle) -> usize {
    let mut restored = 0;

    for (slot, pinned) in &bundle.pinned_boons {
        let current = guide.boons.get_mut(*slot);
        if current != pinned {
            *current = pinned.clone();
            restored += 1;
        }
    }

    for pinned in &bundle.pinned_hammers {
        if guide.hammers.contains(pinned) {
            continue;
        }
        match guide.hammers.iter_mut().find(|h| h.name == pinned.name) {
            Some(existing) => *existing = pinned.clone(),
            None => guide.hammers.push(pinned.clone()),
        }
        restored += 1;
    }

    for pinned in &bundle.pinned_duos {
        if guide.duos.contains(pinned) {
            continue;
        }
        match guide
            .duos
            .iter_mut()
            .find(|d| d.boon_name == pinned.boon_name)
        {
            Some(existing) => *existing = pinned.clone(),
            None => guide.duos.push(pinned.clone()),
        }
        restored += 1;
    }

    restored
}

/// Hammer and duo counts outside the requested ranges
fn count_issues(guide: &BuildGuide) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    let checks = [
        ("hammers", guide.hammers.len(), HAMMER_RANGE),
        ("duos", guide.duos.len(), DUO_RANGE),
    ];
    for (field, count, (min, max)) in checks {
        if !(min..=max).contains(&count) {
            debug!("Guide has {} {} (expected {}-{})", count, field, min, max);
            issues.push(
                ValidationError::new(
                    ValidationErrorKind::Catalog,
                    format!("expected {}-{} entries, got {}", min, max, count),
                )
                .with_field(field),
            );
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::guide::aggregate;
    use crate::types::testing::{boon, sample_guide};
    use crate::types::{ForgeError, PinSet};

    fn checker(pins: PinPolicy, catalog_policy: CatalogPolicy) -> ConformanceChecker {
        ConformanceChecker::new(
            StaticCatalog::embedded().unwrap().into_shared(),
            pins,
            catalog_policy,
        )
    }

    fn pinned_bundle() -> (BuildGuide, ConstraintBundle) {
        let guide = sample_guide();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);
        pins.toggle_hammer("Vortex Strike");
        pins.toggle_duo("Sun Worshipper");
        let bundle = aggregate(Some(&guide), &pins);
        (guide, bundle)
    }

    fn drifted(guide: &BuildGuide) -> BuildGuide {
        let mut next = guide.clone();
        next.boons.attack = boon(Slot::Attack, "Aphrodite", "Flutter Strike");
        next.hammers.retain(|h| h.name != "Vortex Strike");
        next.duos[0].explanation = "rewritten".to_string();
        next
    }

    #[test]
    fn test_clean_guide_passes() {
        let (guide, bundle) = pinned_bundle();
        let mut next = guide.clone();
        let report = checker(PinPolicy::Reject, CatalogPolicy::Reject)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap();
        assert!(report.is_clean(), "{:?}", report.issues);
        assert_eq!(next, guide);
    }

    #[test]
    fn test_reject_pin_drift() {
        let (guide, bundle) = pinned_bundle();
        let mut next = drifted(&guide);
        let err = checker(PinPolicy::Reject, CatalogPolicy::Off)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap_err();
        match err {
            ForgeError::ConstraintViolation(e) => {
                assert_eq!(e.kind, ValidationErrorKind::PinnedItem);
                assert_eq!(e.field.as_deref(), Some("boons.attack"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_restore_pin_drift() {
        let (guide, bundle) = pinned_bundle();
        let mut next = drifted(&guide);
        let report = checker(PinPolicy::Restore, CatalogPolicy::Off)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap();
        assert_eq!(report.restored, 3);
        assert_eq!(next.boons.attack, guide.boons.attack);
        assert!(next.hammers.contains(&guide.hammers[0]));
        assert_eq!(next.duos, guide.duos);
    }

    #[test]
    fn test_ignore_pin_drift_reports() {
        let (guide, bundle) = pinned_bundle();
        let mut next = drifted(&guide);
        let report = checker(PinPolicy::Ignore, CatalogPolicy::Off)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap();
        assert_eq!(report.restored, 0);
        let drift = report
            .issues
            .iter()
            .filter(|issue| issue.kind == ValidationErrorKind::PinnedItem)
            .count();
        assert_eq!(drift, 3);
        assert_ne!(next.boons.attack, guide.boons.attack);
    }

    #[test]
    fn test_unset_rarity_matches_default() {
        let mut guide = sample_guide();
        guide.boons.attack.rarity = None;
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);
        let bundle = aggregate(Some(&guide), &pins);

        let mut next = guide.clone();
        next.boons.attack.rarity = Some(DEFAULT_RARITY.to_string());
        let report = checker(PinPolicy::Reject, CatalogPolicy::Off)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap();
        assert_eq!(report.restored, 0);
        assert_eq!(next.boons.attack, guide.boons.attack);

        let mut next = guide.clone();
        next.boons.attack.rarity = Some("Epic".to_string());
        let err = checker(PinPolicy::Reject, CatalogPolicy::Off)
            .check(&mut next, &bundle, Some("staff"))
            .unwrap_err();
        assert!(matches!(err, ForgeError::ConstraintViolation(_)));
    }

    #[test]
    fn test_catalog_warn_keeps_guide() {
        let mut guide = sample_guide();
        guide.boons.special = boon(Slot::Special, "Zeus", "Made Up Flourish");
        let report = checker(PinPolicy::Reject, CatalogPolicy::Warn)
            .check(&mut guide, &ConstraintBundle::default(), Some("staff"))
            .unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field.as_deref(), Some("boons.special"));
    }

    #[test]
    fn test_catalog_reject_hermes_sprint() {
        let mut guide = sample_guide();
        guide.boons.sprint = boon(Slot::Sprint, "Hermes", "Nimble Sprint");
        let err = checker(PinPolicy::Reject, CatalogPolicy::Reject)
            .check(&mut guide, &ConstraintBundle::default(), Some("staff"))
            .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::ConstraintViolation(ValidationError {
                kind: ValidationErrorKind::Catalog,
                ..
            })
        ));
    }

    #[test]
    fn test_hammers_scoped_to_weapon() {
        let mut guide = sample_guide();
        let report = checker(PinPolicy::Reject, CatalogPolicy::Warn)
            .check(&mut guide, &ConstraintBundle::default(), Some("axe"))
            .unwrap();
        assert_eq!(report.issues.len(), 2);

        let report = checker(PinPolicy::Reject, CatalogPolicy::Warn)
            .check(&mut guide, &ConstraintBundle::default(), None)
            .unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_count_issues() {
        let mut guide = sample_guide();
        guide.duos.clear();
        let issues = count_issues(&guide);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field.as_deref(), Some("duos"));
    }

    #[test]
    fn test_policy_serde() {
        let policy: PinPolicy = serde_json::from_str("\"restore\"").unwrap();
        assert_eq!(policy, PinPolicy::Restore);
        assert_eq!(CatalogPolicy::default().to_string(), "warn");
    }
}
