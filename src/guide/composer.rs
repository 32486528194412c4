//! Prompt Composer
//!
//! Pure function from (selection, catalog slice, constraints, prior guide)
//! to the instruction text sent to the generation service.

use serde::Serialize;

use super::ConstraintBundle;
use crate::ai::PromptBuilder;
use crate::catalog::{Catalog, find_weapon};
use crate::constants::guide::{DUO_RANGE, HAMMER_RANGE, MOBILITY_GOD, SPRINT_GODS};
use crate::types::{BuildGuide, DuoRecommendation, HammerRecommendation, Slot};

/// Weapon and aspect chosen by the user, by display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub weapon: String,
    pub aspect: String,
}

impl Selection {
    pub fn new(weapon: impl Into<String>, aspect: impl Into<String>) -> Self {
        Self {
            weapon: weapon.into(),
            aspect: aspect.into(),
        }
    }

    /// Catalog id of the weapon, if the display name is known
    pub fn weapon_id(&self) -> Option<&'static str> {
        find_weapon(&self.weapon).map(|w| w.id)
    }
}

const OUTPUT_SCHEMA: &str = r#"{
  "aspectName": "string",
  "playstyle": "string",
  "boons": {
    "attack": { "slot": "Attack", "god": "string", "boonName": "string", "description": "string", "explanation": "string", "rarity": "Common" },
    "special": { "slot": "Special", "god": "string", "boonName": "string", "description": "string", "explanation": "string", "rarity": "Common" },
    "cast": { "slot": "Cast", "god": "string", "boonName": "string", "description": "string", "explanation": "string", "rarity": "Common" },
    "sprint": { "slot": "Sprint", "god": "string", "boonName": "string", "description": "string", "explanation": "string", "rarity": "Common" },
    "magick": { "slot": "Magick Gain", "god": "string", "boonName": "string", "description": "string", "explanation": "string", "rarity": "Common" }
  },
  "hammers": [
    { "name": "string", "description": "string", "synergy": "string (why this hammer is chosen)" }
  ],
  "duos": [
    { "boonName": "string", "gods": ["string", "string"], "description": "string (the in-game effect)", "explanation": "string (strategic reasoning)" }
  ],
  "sources": []
}"#;

/// Compose the generation prompt.
///
/// Hammers are filtered to the selected weapon; an unknown weapon name
/// yields an empty hammer list rather than an error.
pub fn compose(
    catalog: &dyn Catalog,
    selection: &Selection,
    constraints: &ConstraintBundle,
    prior: Option<&BuildGuide>,
) -> String {
    let hammers = selection
        .weapon_id()
        .map(|id| catalog.hammers_by_weapon(id))
        .unwrap_or_default();

    let mut builder = PromptBuilder::new()
        .role("Hades II buildcrafter", "synergistic boon builds")
        .context_item("Weapon", &selection.weapon)
        .context_item("Aspect", &selection.aspect)
        .text(&format!(
            "The user has selected the weapon \"{}\" with the \"{}\".",
            selection.weapon, selection.aspect
        ))
        .section("SOURCE OF TRUTH (OLYMPIAN BOONS)", "")
        .code("json", &to_json(catalog.boon_table()))
        .section("SOURCE OF TRUTH (DUO BOONS)", "")
        .code("json", &to_json(catalog.duos()))
        .section(
            &format!("SOURCE OF TRUTH (DAEDALUS HAMMERS for {})", selection.weapon),
            "",
        )
        .code("json", &to_json(hammers));

    if !constraints.is_empty() {
        builder = builder.section("CRITICAL CONSTRAINT - LOCKED ITEMS", &locked_block(constraints));
    }

    if let Some(prior) = prior {
        builder = builder.section(
            "CONTEXT - PREVIOUS RECOMMENDATION",
            &format!(
                "Previous Style: {}\nThe user requested a \"New Strategy\". Create a DIFFERENT build strategy (except for the locked items above).",
                prior.playstyle
            ),
        );
    }

    builder
        .section(
            "YOUR TASK",
            "Create a highly synergistic build guide for this aspect using ONLY the boons and hammers listed in the SOURCES OF TRUTH above.\nDo not invent boons or hammers.",
        )
        .rules("CRITICAL INSTRUCTIONS:", rules(&selection.aspect))
        .section(
            "OUTPUT FORMAT",
            "Return ONLY a valid JSON object matching this structure, and nothing else:",
        )
        .code("json", OUTPUT_SCHEMA)
        .build()
}

fn rules(aspect: &str) -> Vec<String> {
    let slots: Vec<&str> = Slot::ALL.iter().map(Slot::key).collect();
    vec![
        format!(
            "STRICT SELECTION: Select exactly one boon per slot ({}) from the OLYMPIAN BOONS database.",
            slots.join(", ")
        ),
        format!(
            "SPRINT SLOT: Do NOT recommend {} boons for the Sprint slot. Use a core Olympian ({}, etc.) that applies a status effect or damage.",
            MOBILITY_GOD,
            SPRINT_GODS.join(", ")
        ),
        format!(
            "HAMMERS: Select {}-{} Daedalus Hammer upgrades exclusively from the DAEDALUS HAMMERS list above.",
            HAMMER_RANGE.0, HAMMER_RANGE.1
        ),
        format!(
            "DUOS: Recommend {}-{} Duo or Passive boons from the database, each with 'boonName', 'gods' (array of god names), 'description', and 'explanation'.",
            DUO_RANGE.0, DUO_RANGE.1
        ),
        "STATS: Use the effect description from the database in the 'description' field."
            .to_string(),
        format!(
            "EXPLANATIONS: Every 'explanation' must give strategic reasoning: why it works with the {}, and how it synergizes with the other picks. Avoid generic descriptions.",
            aspect
        ),
    ]
}

fn locked_block(constraints: &ConstraintBundle) -> String {
    let mut block = String::from(
        "The user has explicitly pinned the following items. You MUST include these EXACT recommendations in the final JSON, copied field-for-field.\n",
    );

    if !constraints.pinned_boons.is_empty() {
        block.push_str("\nLOCKED BOONS (Must be in their specific slots):\n");
        for (slot, boon) in &constraints.pinned_boons {
            match &boon.rarity {
                Some(rarity) => block.push_str(&format!(
                    "- {}: {} - {} ({})\n",
                    slot, boon.god, boon.boon_name, rarity
                )),
                None => block.push_str(&format!("- {}: {} - {}\n", slot, boon.god, boon.boon_name)),
            }
        }
    }

    if !constraints.pinned_hammers.is_empty() {
        block.push_str("\nLOCKED HAMMERS (Must be included in the \"hammers\" array):\n");
        for hammer in &constraints.pinned_hammers {
            block.push_str(&format!("- {}\n", hammer.name));
        }
    }

    if !constraints.pinned_duos.is_empty() {
        block.push_str("\nLOCKED SYNERGIES (Must be included in the \"duos\" array):\n");
        for duo in &constraints.pinned_duos {
            block.push_str(&format!("- {}\n", duo.boon_name));
        }
    }

    block.push_str("\nExact values of the locked items:\n");
    block.push_str(&to_json_pretty(&LockedValues::from(constraints)));
    block
}

/// Locked items in output-schema shape
#[derive(Serialize)]
struct LockedValues {
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    boons: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hammers: Vec<HammerRecommendation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    duos: Vec<DuoRecommendation>,
}

impl From<&ConstraintBundle> for LockedValues {
    fn from(constraints: &ConstraintBundle) -> Self {
        let boons = constraints
            .pinned_boons
            .iter()
            .filter_map(|(slot, boon)| {
                let mut value = serde_json::to_value(boon).ok()?;
                // An unset rarity stays unset instead of taking the schema default
                if let Some(fields) = value.as_object_mut() {
                    fields.entry("rarity").or_insert(serde_json::Value::Null);
                }
                Some((slot.key().to_string(), value))
            })
            .collect();
        Self {
            boons,
            hammers: constraints.pinned_hammers.clone(),
            duos: constraints.pinned_duos.clone(),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::guide::aggregate;
    use crate::types::PinSet;
    use crate::types::testing::{boon, sample_guide};

    fn circe() -> Selection {
        Selection::new("Witch's Staff", "Aspect of Circe")
    }

    #[test]
    fn test_fresh_prompt_contract() {
        let catalog = StaticCatalog::embedded().unwrap();
        let prompt = compose(&catalog, &circe(), &ConstraintBundle::default(), None);

        assert!(prompt.contains("Witch's Staff"));
        assert!(prompt.contains("Aspect of Circe"));
        assert!(prompt.contains("Do NOT recommend Hermes boons for the Sprint slot"));
        assert!(prompt.contains("Return ONLY a valid JSON object"));
        assert!(prompt.contains("\"magick\": { \"slot\": \"Magick Gain\""));
        assert!(!prompt.contains("LOCKED ITEMS"));
        assert!(!prompt.contains("PREVIOUS RECOMMENDATION"));
    }

    #[test]
    fn test_hammers_filtered_to_weapon() {
        let catalog = StaticCatalog::embedded().unwrap();
        let prompt = compose(&catalog, &circe(), &ConstraintBundle::default(), None);

        assert!(prompt.contains("Vortex Strike"));
        assert!(!prompt.contains("Furious Whirl"));
    }

    #[test]
    fn test_unknown_weapon_gets_empty_hammers() {
        let catalog = StaticCatalog::embedded().unwrap();
        let selection = Selection::new("Stygian Blade", "Aspect of Zagreus");
        let prompt = compose(&catalog, &selection, &ConstraintBundle::default(), None);

        assert!(prompt.contains("DAEDALUS HAMMERS for Stygian Blade)\n\n```json\n[]\n```"));
    }

    #[test]
    fn test_locked_and_prior_sections() {
        let catalog = StaticCatalog::embedded().unwrap();
        let mut guide = sample_guide();
        guide.boons.attack = boon(Slot::Attack, "Zeus", "Electric Coating");
        guide.boons.attack.rarity = None;

        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);
        pins.toggle_hammer("Vortex Strike");
        pins.toggle_duo("Sun Worshipper");
        let bundle = aggregate(Some(&guide), &pins);

        let prompt = compose(&catalog, &circe(), &bundle, Some(&guide));
        assert!(prompt.contains("- attack: Zeus - Electric Coating\n"));
        assert!(!prompt.contains("Electric Coating (Common)"));
        assert!(prompt.contains("\"rarity\": null"));
        assert!(prompt.contains("LOCKED HAMMERS"));
        assert!(prompt.contains("- Vortex Strike"));
        assert!(prompt.contains("- Sun Worshipper"));
        assert!(prompt.contains("Previous Style: Omega-heavy ranged control"));
        assert!(prompt.contains("\"boonName\": \"Electric Coating\""));

        let locked = prompt.find("LOCKED ITEMS").unwrap();
        let previous = prompt.find("PREVIOUS RECOMMENDATION").unwrap();
        assert!(locked < previous);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let catalog = StaticCatalog::embedded().unwrap();
        let guide = sample_guide();
        let bundle = ConstraintBundle::default();
        assert_eq!(
            compose(&catalog, &circe(), &bundle, Some(&guide)),
            compose(&catalog, &circe(), &bundle, Some(&guide))
        );
    }

    #[test]
    fn test_selection_weapon_id() {
        assert_eq!(circe().weapon_id(), Some("staff"));
        assert_eq!(Selection::new("Nope", "x").weapon_id(), None);
    }
}
