//! Catalog Command
//!
//! Browse the reference tables the generator is constrained to.
//!
//! Usage:
//!   boonforge catalog weapons
//!   boonforge catalog aspects -w staff [--all]
//!   boonforge catalog boons --god Zeus
//!   boonforge catalog hammers -w "Witch's Staff"
//!   boonforge catalog duos

use console::style;
use serde::Serialize;

use crate::catalog::{Catalog, StaticCatalog, WEAPONS, aspects_for, find_weapon};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{ForgeError, Result};

/// Which table to list
#[derive(Debug, Clone)]
pub enum CatalogQuery {
    Weapons,
    Aspects { weapon: String, all: bool },
    Boons { god: Option<String> },
    Hammers { weapon: String },
    Duos,
}

pub fn run(query: CatalogQuery, format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    let catalog = StaticCatalog::load(config.catalog.path.as_deref())?;
    let as_json = format == "json";

    match query {
        CatalogQuery::Weapons => emit(WEAPONS, as_json, |out| {
            out.section("Weapons");
            for weapon in WEAPONS {
                println!("  {:<8} {}", style(weapon.id).dim(), style(weapon.name).bold());
                println!("           {}", weapon.description);
            }
        }),
        CatalogQuery::Aspects { weapon, all } => {
            let weapon = find_weapon(&weapon)
                .ok_or_else(|| ForgeError::UnknownSelection(format!("weapon '{}'", weapon)))?;
            let aspects: Vec<_> = aspects_for(weapon.id).filter(|a| all || !a.hidden).collect();
            emit(&aspects, as_json, |out| {
                out.section(&format!("Aspects of {}", weapon.name));
                for aspect in &aspects {
                    println!("  {}", style(aspect.name).bold());
                    println!("    {}", aspect.description);
                }
            })
        }
        CatalogQuery::Boons { god } => {
            let table = catalog.boon_table();
            match god {
                Some(god) => {
                    let boons = catalog.boons_by_god(&god);
                    if boons.is_empty() {
                        return Err(ForgeError::Catalog(format!("No boons for '{}'", god)));
                    }
                    emit(boons, as_json, |out| {
                        out.section(&format!("{} boons", god));
                        for boon in boons {
                            println!("  {:<10} {}", style(&boon.slot).dim(), style(&boon.name).bold());
                            println!("             {}", boon.effect);
                        }
                    })
                }
                None => emit(table, as_json, |out| {
                    out.section("Gods");
                    for (god, boons) in table {
                        println!("  {:<12} {} boon(s)", style(god).bold(), boons.len());
                    }
                }),
            }
        }
        CatalogQuery::Hammers { weapon } => {
            let weapon = find_weapon(&weapon)
                .ok_or_else(|| ForgeError::UnknownSelection(format!("weapon '{}'", weapon)))?;
            let hammers = catalog.hammers_by_weapon(weapon.id);
            emit(hammers, as_json, |out| {
                out.section(&format!("Hammers for {}", weapon.name));
                for hammer in hammers {
                    println!("  {}", style(&hammer.name).bold());
                    println!("    {}", hammer.effect);
                }
            })
        }
        CatalogQuery::Duos => {
            let duos = catalog.duos();
            emit(duos, as_json, |out| {
                out.section("Duo boons");
                for duo in duos {
                    println!(
                        "  {} {}",
                        style(&duo.name).bold(),
                        style(format!("({})", duo.gods.join(" + "))).magenta()
                    );
                    println!("    {}", duo.effect);
                }
            })
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T, as_json: bool, text: impl FnOnce(&Output)) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(&Output::new());
    }
    Ok(())
}
