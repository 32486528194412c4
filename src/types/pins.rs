//! Caller-pinned selections carried across refine cycles.
//!
//! Hammers and duos are keyed by display name; two distinct catalog entries
//! sharing a name cannot be told apart.

use std::collections::{BTreeMap, BTreeSet};

use super::guide::{BoonRecommendation, BuildGuide, Slot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    pub boons: BTreeMap<Slot, BoonRecommendation>,
    pub hammers: BTreeSet<String>,
    pub duos: BTreeSet<String>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.boons.is_empty() && self.hammers.is_empty() && self.duos.is_empty()
    }

    pub fn clear(&mut self) {
        self.boons.clear();
        self.hammers.clear();
        self.duos.clear();
    }

    /// Pin the guide's boon for `slot`, or unpin it if already pinned.
    ///
    /// Returns whether the slot is pinned afterwards.
    pub fn toggle_boon(&mut self, guide: &BuildGuide, slot: Slot) -> bool {
        if self.boons.remove(&slot).is_some() {
            return false;
        }
        self.boons.insert(slot, guide.boons.get(slot).clone());
        true
    }

    /// Returns whether the hammer is pinned afterwards.
    pub fn toggle_hammer(&mut self, name: impl Into<String>) -> bool {
        toggle(&mut self.hammers, name.into())
    }

    /// Returns whether the duo is pinned afterwards.
    pub fn toggle_duo(&mut self, boon_name: impl Into<String>) -> bool {
        toggle(&mut self.duos, boon_name.into())
    }

    pub fn is_boon_pinned(&self, slot: Slot) -> bool {
        self.boons.contains_key(&slot)
    }

    pub fn is_hammer_pinned(&self, name: &str) -> bool {
        self.hammers.contains(name)
    }

    pub fn is_duo_pinned(&self, boon_name: &str) -> bool {
        self.duos.contains(boon_name)
    }
}

fn toggle(set: &mut BTreeSet<String>, key: String) -> bool {
    if set.remove(&key) {
        false
    } else {
        set.insert(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::testing::sample_guide;

    #[test]
    fn test_toggle_boon_round_trip() {
        let guide = sample_guide();
        let mut pins = PinSet::new();

        assert!(pins.toggle_boon(&guide, Slot::Attack));
        assert_eq!(pins.boons[&Slot::Attack], guide.boons.attack);
        assert!(!pins.toggle_boon(&guide, Slot::Attack));
        assert!(pins.is_empty());
    }

    #[test]
    fn test_toggle_names() {
        let mut pins = PinSet::new();
        assert!(pins.toggle_hammer("Vortex Strike"));
        assert!(pins.toggle_duo("Sworn Strike"));
        assert!(pins.is_hammer_pinned("Vortex Strike"));
        assert!(!pins.toggle_hammer("Vortex Strike"));
        assert!(!pins.is_hammer_pinned("Vortex Strike"));
        assert!(!pins.is_empty());

        pins.clear();
        assert!(pins.is_empty());
    }
}
