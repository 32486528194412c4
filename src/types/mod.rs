pub mod error;
pub mod guide;
pub mod pins;

pub use error::{
    ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result, ValidationError,
    ValidationErrorKind,
};
pub use guide::{
    BoonRecommendation, BuildGuide, DuoRecommendation, HammerRecommendation, Slot, SlotBoons,
    Source,
};
pub use pins::PinSet;

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for session IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random session id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::generate()
    }
}

/// Shared fixtures for unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn boon(slot: Slot, god: &str, name: &str) -> BoonRecommendation {
        BoonRecommendation {
            slot: slot.label().to_string(),
            god: god.to_string(),
            boon_name: name.to_string(),
            description: format!("{} effect", name),
            explanation: format!("{} fits the aspect", name),
            rarity: Some("Rare".to_string()),
        }
    }

    pub fn sample_guide() -> BuildGuide {
        BuildGuide {
            aspect_name: "Aspect of Circe".to_string(),
            playstyle: "Omega-heavy ranged control".to_string(),
            boons: SlotBoons {
                attack: boon(Slot::Attack, "Zeus", "Heaven Strike"),
                special: boon(Slot::Special, "Apollo", "Nova Flourish"),
                cast: boon(Slot::Cast, "Hestia", "Smolder Ring"),
                sprint: boon(Slot::Sprint, "Poseidon", "Breaker Sprint"),
                magick: boon(Slot::Magick, "Demeter", "Tranquil Gain"),
            },
            hammers: vec![
                HammerRecommendation {
                    name: "Vortex Strike".to_string(),
                    description: "Omega Attack spins".to_string(),
                    synergy: "Pairs with Heaven Strike".to_string(),
                },
                HammerRecommendation {
                    name: "Double Flourish".to_string(),
                    description: "Special fires twice".to_string(),
                    synergy: "Doubles Nova procs".to_string(),
                },
            ],
            duos: vec![DuoRecommendation {
                boon_name: "Sun Worshipper".to_string(),
                gods: vec!["Apollo".to_string(), "Hestia".to_string()],
                description: "Burn and Daze interact".to_string(),
                explanation: "Both slots apply status".to_string(),
            }],
            sources: vec![Source::local_database()],
        }
    }

    /// Guide JSON as a generator would emit it (arbitrary `sources`)
    pub fn sample_guide_json() -> String {
        let mut value = serde_json::to_value(sample_guide()).expect("serializable guide");
        value["sources"] = serde_json::json!([{"title": "Some Forum", "uri": "https://example.com"}]);
        serde_json::to_string_pretty(&value).expect("serializable value")
    }
}
