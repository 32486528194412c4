use console::style;

use crate::ai::ConformanceReport;
use crate::types::{BuildGuide, PinSet};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Print a guide, marking pinned entries with 📌
    pub fn guide(&self, guide: &BuildGuide, pins: &PinSet) {
        self.header(&guide.aspect_name);
        println!("{}", style(&guide.playstyle).italic());

        self.section("Core Boons");
        for (slot, boon) in guide.boons.iter() {
            let marker = pin_marker(pins.is_boon_pinned(slot));
            let rarity = boon
                .rarity
                .as_deref()
                .map(|r| format!(" [{}]", r))
                .unwrap_or_default();
            println!(
                "{}{:<12} {} {}{}",
                marker,
                slot.label(),
                style(&boon.god).cyan(),
                style(&boon.boon_name).bold(),
                style(rarity).dim()
            );
            if !boon.description.is_empty() {
                println!("    {}", boon.description);
            }
            if !boon.explanation.is_empty() {
                println!("    {}", style(&boon.explanation).dim());
            }
        }

        if !guide.hammers.is_empty() {
            self.section("Daedalus Hammers");
            for hammer in &guide.hammers {
                let marker = pin_marker(pins.is_hammer_pinned(&hammer.name));
                println!("{}{}", marker, style(&hammer.name).bold());
                if !hammer.description.is_empty() {
                    println!("    {}", hammer.description);
                }
                if !hammer.synergy.is_empty() {
                    println!("    {}", style(&hammer.synergy).dim());
                }
            }
        }

        if !guide.duos.is_empty() {
            self.section("Synergies");
            for duo in &guide.duos {
                let marker = pin_marker(pins.is_duo_pinned(&duo.boon_name));
                println!(
                    "{}{} {}",
                    marker,
                    style(&duo.boon_name).bold(),
                    style(format!("({})", duo.gods.join(" + "))).magenta()
                );
                if !duo.description.is_empty() {
                    println!("    {}", duo.description);
                }
                if !duo.explanation.is_empty() {
                    println!("    {}", style(&duo.explanation).dim());
                }
            }
        }

        if !guide.sources.is_empty() {
            println!();
            for source in &guide.sources {
                println!("{} {} <{}>", style("Source:").dim(), source.title, source.uri);
            }
        }
    }

    /// Print non-fatal conformance findings
    pub fn report(&self, report: &ConformanceReport) {
        if report.is_clean() {
            self.success("Every pick matches the catalog and your pins");
            return;
        }
        if report.restored > 0 {
            self.warning(&format!(
                "Restored {} pinned item(s) the generator changed",
                report.restored
            ));
        }
        for issue in &report.issues {
            self.warning(&issue.to_string());
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn pin_marker(pinned: bool) -> &'static str {
    if pinned { "📌 " } else { "   " }
}
