//! Reference Catalog
//!
//! Immutable lookup tables the generator is constrained to draw from:
//! boons per god, duo boons, and hammer upgrades per weapon.
//!
//! The tables are loaded once and shared read-only (`Arc<dyn Catalog>`),
//! so no locking is needed across sessions or threads.

mod weapons;

pub use weapons::{ASPECTS, Aspect, WEAPONS, Weapon, aspects_for, find_aspect, find_weapon};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::types::{ForgeError, Result};

const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Numeric values per rarity tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rare: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heroic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticBoon {
    pub name: String,
    pub slot: String,
    pub effect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<RarityStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDuo {
    pub name: String,
    pub gods: Vec<String>,
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticHammer {
    pub name: String,
    pub effect: String,
}

/// Read-only catalog lookups.
///
/// All lookups are total: an unknown key yields an empty slice.
pub trait Catalog: Send + Sync {
    fn boons_by_god(&self, god: &str) -> &[StaticBoon];

    fn hammers_by_weapon(&self, weapon_id: &str) -> &[StaticHammer];

    fn duos(&self) -> &[StaticDuo];

    /// Full god → boons table
    fn boon_table(&self) -> &BTreeMap<String, Vec<StaticBoon>>;

    fn has_boon(&self, god: &str, boon_name: &str) -> bool {
        self.boons_by_god(god).iter().any(|b| b.name == boon_name)
    }

    fn has_hammer(&self, weapon_id: &str, name: &str) -> bool {
        self.hammers_by_weapon(weapon_id)
            .iter()
            .any(|h| h.name == name)
    }

    /// Duo boon or any god's boon with this name
    fn has_synergy(&self, boon_name: &str) -> bool {
        self.duos().iter().any(|d| d.name == boon_name)
            || self
                .boon_table()
                .values()
                .flatten()
                .any(|b| b.name == boon_name)
    }
}

pub type SharedCatalog = Arc<dyn Catalog>;

/// Catalog backed by in-memory tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    boons: BTreeMap<String, Vec<StaticBoon>>,
    #[serde(default)]
    duos: Vec<StaticDuo>,
    #[serde(default)]
    hammers: BTreeMap<String, Vec<StaticHammer>>,
}

impl StaticCatalog {
    /// Catalog compiled into the binary
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(EMBEDDED_CATALOG)
            .map_err(|e| ForgeError::Catalog(format!("Embedded catalog is malformed: {}", e)))
    }

    /// Catalog from a JSON file with `boons`, `duos`, and `hammers` tables
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading catalog from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ForgeError::Catalog(format!("Invalid catalog file {}: {}", path.display(), e))
        })
    }

    /// File catalog if a path is given, embedded otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(self)
    }
}

impl Catalog for StaticCatalog {
    fn boons_by_god(&self, god: &str) -> &[StaticBoon] {
        self.boons.get(god).map(Vec::as_slice).unwrap_or_default()
    }

    fn hammers_by_weapon(&self, weapon_id: &str) -> &[StaticHammer] {
        self.hammers
            .get(weapon_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn duos(&self) -> &[StaticDuo] {
        &self.duos
    }

    fn boon_table(&self) -> &BTreeMap<String, Vec<StaticBoon>> {
        &self.boons
    }
}
