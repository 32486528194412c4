//! Build guide data model
//!
//! Field names serialize in camelCase to match the JSON contract the
//! generation service is instructed to honor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::citation;

/// Boon assignment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Attack,
    Special,
    Cast,
    Sprint,
    Magick,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Attack,
        Slot::Special,
        Slot::Cast,
        Slot::Sprint,
        Slot::Magick,
    ];

    /// JSON key used in the `boons` object
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Attack => "attack",
            Slot::Special => "special",
            Slot::Cast => "cast",
            Slot::Sprint => "sprint",
            Slot::Magick => "magick",
        }
    }

    /// Display label the generator writes into `slot`
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Attack => "Attack",
            Slot::Special => "Special",
            Slot::Cast => "Cast",
            Slot::Sprint => "Sprint",
            Slot::Magick => "Magick Gain",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attack" => Ok(Slot::Attack),
            "special" => Ok(Slot::Special),
            "cast" => Ok(Slot::Cast),
            "sprint" => Ok(Slot::Sprint),
            "magick" | "magick gain" => Ok(Slot::Magick),
            _ => Err(format!(
                "Unknown slot: {}. Valid values: attack, special, cast, sprint, magick",
                s
            )),
        }
    }
}

/// A boon chosen for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoonRecommendation {
    #[serde(default)]
    pub slot: String,
    pub god: String,
    pub boon_name: String,
    /// In-game effect text and stats
    #[serde(default)]
    pub description: String,
    /// Strategic reasoning
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
}

/// Exactly one boon per slot.
///
/// Unknown slot keys are rejected so a guide can never carry a sixth slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotBoons {
    pub attack: BoonRecommendation,
    pub special: BoonRecommendation,
    pub cast: BoonRecommendation,
    pub sprint: BoonRecommendation,
    pub magick: BoonRecommendation,
}

impl SlotBoons {
    pub fn get(&self, slot: Slot) -> &BoonRecommendation {
        match slot {
            Slot::Attack => &self.attack,
            Slot::Special => &self.special,
            Slot::Cast => &self.cast,
            Slot::Sprint => &self.sprint,
            Slot::Magick => &self.magick,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut BoonRecommendation {
        match slot {
            Slot::Attack => &mut self.attack,
            Slot::Special => &mut self.special,
            Slot::Cast => &mut self.cast,
            Slot::Sprint => &mut self.sprint,
            Slot::Magick => &mut self.magick,
        }
    }

    /// Iterate in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &BoonRecommendation)> {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HammerRecommendation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Why this hammer fits the build
    #[serde(default)]
    pub synergy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuoRecommendation {
    pub boon_name: String,
    #[serde(default)]
    pub gods: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub explanation: String,
}

/// Citation attached to a guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    /// The local reference database every guide is attributed to
    pub fn local_database() -> Self {
        Self {
            title: citation::TITLE.to_string(),
            uri: citation::URI.to_string(),
        }
    }
}

/// Complete build guide for one weapon aspect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildGuide {
    pub aspect_name: String,
    pub playstyle: String,
    pub boons: SlotBoons,
    pub hammers: Vec<HammerRecommendation>,
    pub duos: Vec<DuoRecommendation>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl BuildGuide {
    pub fn hammer(&self, name: &str) -> Option<&HammerRecommendation> {
        self.hammers.iter().find(|h| h.name == name)
    }

    pub fn duo(&self, boon_name: &str) -> Option<&DuoRecommendation> {
        self.duos.iter().find(|d| d.boon_name == boon_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parsing() {
        assert_eq!("Attack".parse::<Slot>().unwrap(), Slot::Attack);
        assert_eq!("Magick Gain".parse::<Slot>().unwrap(), Slot::Magick);
        assert!("dash".parse::<Slot>().is_err());
    }

    #[test]
    fn test_slot_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Slot::Sprint).unwrap(), "\"sprint\"");
    }

    #[test]
    fn test_boon_recommendation_camel_case() {
        let rec = BoonRecommendation {
            slot: "Attack".to_string(),
            god: "Zeus".to_string(),
            boon_name: "Heaven Strike".to_string(),
            description: String::new(),
            explanation: String::new(),
            rarity: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["boonName"], "Heaven Strike");
        assert!(json.get("rarity").is_none());
    }

    #[test]
    fn test_slot_boons_rejects_extra_slot() {
        let boon = serde_json::json!({"god": "Zeus", "boonName": "X"});
        let value = serde_json::json!({
            "attack": boon, "special": boon, "cast": boon,
            "sprint": boon, "magick": boon, "dash": boon
        });
        assert!(serde_json::from_value::<SlotBoons>(value).is_err());
    }

    #[test]
    fn test_slot_boons_iter_order() {
        let boon = serde_json::json!({"god": "Zeus", "boonName": "X"});
        let value = serde_json::json!({
            "attack": boon, "special": boon, "cast": boon,
            "sprint": boon, "magick": boon
        });
        let boons: SlotBoons = serde_json::from_value(value).unwrap();
        let slots: Vec<Slot> = boons.iter().map(|(s, _)| s).collect();
        assert_eq!(slots, Slot::ALL.to_vec());
    }
}
