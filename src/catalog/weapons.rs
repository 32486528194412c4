//! Weapon and aspect selection tables

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Weapon {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Aspect {
    pub id: &'static str,
    pub weapon_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Unlocked late; hidden from the default selector
    pub hidden: bool,
}

pub const WEAPONS: &[Weapon] = &[
    Weapon {
        id: "staff",
        name: "Witch's Staff",
        description: "Descura. Fast strikes, ranged specials. Good for Omega moves and reliable damage.",
    },
    Weapon {
        id: "blades",
        name: "Sister Blades",
        description: "Lim and Oros. Rapid close-range attacks, backstab bonuses, and spread-fire specials.",
    },
    Weapon {
        id: "axe",
        name: "Moonstone Axe",
        description: "Zorephet. Heavy, high-damage strikes, blocking moves, and powerful whirlwind attacks.",
    },
    Weapon {
        id: "flames",
        name: "Umbral Flames",
        description: "Ygnium. Ranged orbiting projectiles. Supports evasive kiting playstyles.",
    },
    Weapon {
        id: "skull",
        name: "Argent Skull",
        description: "Revaal. Explosive shells that must be retrieved. Hybrid melee/ranged playstyle.",
    },
    Weapon {
        id: "coat",
        name: "Black Coat",
        description: "Xinth. Defensive armament. Powerful counters, blocking, and homing missiles.",
    },
];

const fn aspect(
    id: &'static str,
    weapon_id: &'static str,
    name: &'static str,
    description: &'static str,
    hidden: bool,
) -> Aspect {
    Aspect {
        id,
        weapon_id,
        name,
        description,
        hidden,
    }
}

pub const ASPECTS: &[Aspect] = &[
    aspect("melinoe_staff", "staff", "Aspect of Melinoë", "Faster channel speed. Specials deal more damage.", false),
    aspect("circe", "staff", "Aspect of Circe", "Gain Serenity after hits to restore Magick and speed up Omega moves.", false),
    aspect("momus", "staff", "Aspect of Momus", "Omega Moves fire automatically in place up to 3 times.", false),
    aspect("anubis", "staff", "Aspect of Anubis", "Attacks place Fields, Specials drag foes. Lone Shades aid you.", true),
    aspect("melinoe_blades", "blades", "Aspect of Melinoë", "Backstab damage increased significantly.", false),
    aspect("artemis", "blades", "Aspect of Artemis", "Omega Attack Parries and Ripostes for critical damage.", false),
    aspect("pan", "blades", "Aspect of Pan", "Specials seek foes inside your Cast effects. Fires more shots.", false),
    aspect("morrigan", "blades", "Aspect of the Morrigan", "Attacks hit 3 times. Special fires repeatedly. Blood Triad combo.", true),
    aspect("melinoe_axe", "axe", "Aspect of Melinoë", "Increases Attack Power and Max Life.", false),
    aspect("charon", "axe", "Aspect of Charon", "Cast erupts like Omega Cast if struck by Omega Special.", false),
    aspect("thanatos", "axe", "Aspect of Thanatos", "Attacks are faster. Grants Mortality (Crit Chance) on hit.", false),
    aspect("nergal", "axe", "Aspect of Nergal", "Rock Lion Mace. Berserk state increases speed and heals on hit.", true),
    aspect("melinoe_flames", "flames", "Aspect of Melinoë", "Attacks and Specials can deal Critical Damage.", false),
    aspect("moros", "flames", "Aspect of Moros", "Attacks linger and explode when struck by Specials.", false),
    aspect("eos", "flames", "Aspect of Eos", "Omega Attack fires a Daybreaker that copies Specials and pulses damage.", false),
    aspect("supay", "flames", "Aspect of Supay", "Devil Sparks. Auto-fire Attacks/Specials. Enhances Rush Boons.", true),
    aspect("melinoe_skull", "skull", "Aspect of Melinoë", "Attacks have more Power for each unretrieved Shell.", false),
    aspect("medea", "skull", "Aspect of Medea", "Attack stays close/charges. Explodes on Special or timeout.", false),
    aspect("persephone", "skull", "Aspect of Persephone", "Omega Special is Sprouted (longer duration/control). Glory mechanic.", false),
    aspect("hel", "skull", "Aspect of Hel", "Frost Mane. Burst fire Attacks. Specials seek foes. Valkyrie form.", true),
    aspect("melinoe_coat", "coat", "Aspect of Melinoë", "Attacks, Sprint, and Move Speed are faster.", false),
    aspect("selene", "coat", "Aspect of Selene", "Gain Sky Fall Hex. Dash-Strikes trigger Hex effects.", false),
    aspect("nyx", "coat", "Aspect of Nyx", "Omega Sprint creates a Nightspawn decoy that attacks.", false),
    aspect("shiva", "coat", "Aspect of Shiva", "Purifying Grace. Omega Attack hurtles forward. Destructive meter.", true),
];

/// Look up a weapon by its display name (case-insensitive)
pub fn find_weapon(name: &str) -> Option<&'static Weapon> {
    WEAPONS
        .iter()
        .find(|w| w.name.eq_ignore_ascii_case(name.trim()) || w.id == name.trim())
}

/// Aspects belonging to a weapon id
pub fn aspects_for(weapon_id: &str) -> impl Iterator<Item = &'static Aspect> {
    ASPECTS.iter().filter(move |a| a.weapon_id == weapon_id)
}

/// Look up an aspect of a weapon by display name (case-insensitive)
pub fn find_aspect(weapon_id: &str, name: &str) -> Option<&'static Aspect> {
    aspects_for(weapon_id).find(|a| a.name.eq_ignore_ascii_case(name.trim()))
}
