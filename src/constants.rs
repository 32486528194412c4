//! Global Constants
//!
//! Centralized constants for generation, validation, and networking.

/// Guide generation constants
pub mod guide {
    /// God whose boons govern dashes; never recommended for the sprint slot
    pub const MOBILITY_GOD: &str = "Hermes";

    /// Core gods suggested for the sprint slot instead
    pub const SPRINT_GODS: &[&str] = &["Apollo", "Hestia", "Poseidon", "Zeus", "Demeter"];

    /// Hammer upgrades to request (inclusive range)
    pub const HAMMER_RANGE: (usize, usize) = (2, 3);

    /// Duo/passive synergies to request (inclusive range)
    pub const DUO_RANGE: (usize, usize) = (1, 3);

    /// Rarity assumed for pinned boons without one
    pub const DEFAULT_RARITY: &str = "Common";
}

/// Provenance stamped onto every validated guide
pub mod citation {
    pub const TITLE: &str = "Hades II Wiki (Local DB)";
    pub const URI: &str = "https://hades.fandom.com/wiki/Hades_II";
}

/// User-facing failure messages
pub mod messages {
    pub const GENERATION_FAILED: &str = "Failed to generate guide. Please try again.";
    pub const PARSE_FAILED: &str = "Failed to parse build guide data.";
    pub const BUSY: &str = "A guide is already being generated. Please wait.";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Caller-side retry policy constants
pub mod retry {
    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;
}
