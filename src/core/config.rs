//! Engagement configuration with documented constants
//!
//! All ruleset numbers the engine relies on are collected here. The defaults
//! reproduce the standard ruleset; a TOML file can override any of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SkirmishError};

/// Longest engagement the ruleset allows
pub const MAX_TURNS: u32 = 4;

/// Configuration for a single engagement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    // === TURN STRUCTURE ===
    /// Number of turns after which the engagement ends regardless of outcome
    ///
    /// Shorter caps are allowed; `validate` rejects anything above `MAX_TURNS`.
    pub max_turns: u32,

    // === MOVEMENT ===
    /// Inches a unit moves when it advances (and may still shoot)
    pub advance_range: u32,

    /// Inches a unit moves when it charges or rushes
    ///
    /// Always twice the advance range in the standard ruleset.
    pub charge_range: u32,

    /// Extra advance inches for Fast units
    ///
    /// The charge bonus is twice this value, so the default of 2 gives
    /// Fast units 8" advance and 16" charge.
    pub fast_bonus: u32,

    /// Advance inches lost by Slow units (charge loses twice this value)
    pub slow_penalty: u32,

    // === MORALE ===
    /// Target for the Fearless re-roll after a failed morale test
    pub fearless_threshold: u8,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            max_turns: 4,
            advance_range: 6,
            charge_range: 12,
            fast_bonus: 2,
            slow_penalty: 2,
            fearless_threshold: 4,
        }
    }
}

impl EngagementConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys fall back to defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: EngagementConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TURNS).contains(&self.max_turns) {
            return Err(SkirmishError::InvalidConfig(format!(
                "max_turns ({}) must be between 1 and {}",
                self.max_turns, MAX_TURNS
            )));
        }

        if self.slow_penalty > self.advance_range {
            return Err(SkirmishError::InvalidConfig(format!(
                "slow_penalty ({}) exceeds advance_range ({})",
                self.slow_penalty, self.advance_range
            )));
        }

        if self.slow_penalty.saturating_mul(2) > self.charge_range {
            return Err(SkirmishError::InvalidConfig(format!(
                "slow charge penalty ({}) exceeds charge_range ({})",
                self.slow_penalty.saturating_mul(2),
                self.charge_range
            )));
        }

        if !(2..=6).contains(&self.fearless_threshold) {
            return Err(SkirmishError::InvalidConfig(format!(
                "fearless_threshold ({}) must be between 2 and 6",
                self.fearless_threshold
            )));
        }

        Ok(())
    }
}
