//! Units - immutable stat-block profiles and their per-engagement state
//!
//! A `UnitProfile` is what the parser produces and is never touched by the
//! engine. Each engagement clones profiles into `UnitState`s, which carry
//! casualties and the turn-scoped flags.

pub mod weapon;

pub use weapon::WeaponProfile;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::EngagementConfig;

/// Special rules a unit can carry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialRule {
    Fast,
    Slow,
    Fearless,
    /// Wounds needed to remove one model
    Tough(u32),
    /// Any rule the engine does not model, kept verbatim
    Other(String),
}

impl SpecialRule {
    /// Interpret a rule token from a stat block
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        match token {
            "Fast" => SpecialRule::Fast,
            "Slow" => SpecialRule::Slow,
            "Fearless" => SpecialRule::Fearless,
            _ => token
                .strip_prefix("Tough(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.trim().parse().ok())
                .map(SpecialRule::Tough)
                .unwrap_or_else(|| SpecialRule::Other(token.to_string())),
        }
    }
}

impl fmt::Display for SpecialRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecialRule::Fast => write!(f, "Fast"),
            SpecialRule::Slow => write!(f, "Slow"),
            SpecialRule::Fearless => write!(f, "Fearless"),
            SpecialRule::Tough(n) => write!(f, "Tough({})", n),
            SpecialRule::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A unit as described by its stat block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub name: String,
    pub models: u32,
    /// To-hit target (lower is better)
    pub quality: u8,
    /// Save target (lower is better)
    pub defense: u8,
    /// Wounds needed to remove one model
    pub toughness: u32,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub rules: Vec<SpecialRule>,
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,
}

impl UnitProfile {
    pub fn new(name: impl Into<String>, models: u32, quality: u8, defense: u8) -> Self {
        Self {
            name: name.into(),
            models,
            quality,
            defense,
            toughness: 1,
            points: None,
            rules: Vec::new(),
            weapons: Vec::new(),
        }
    }

    pub fn with_weapon(mut self, weapon: WeaponProfile) -> Self {
        self.weapons.push(weapon);
        self
    }

    /// Add a rule; `Tough(n)` also sets toughness
    pub fn with_rule(mut self, rule: SpecialRule) -> Self {
        if let SpecialRule::Tough(n) = rule {
            self.toughness = n.max(1);
        }
        self.rules.push(rule);
        self
    }

    pub fn has_rule(&self, rule: &SpecialRule) -> bool {
        self.rules.contains(rule)
    }

    /// (advance, charge) allowances in inches
    pub fn movement(&self, config: &EngagementConfig) -> (u32, u32) {
        let mut advance = config.advance_range;
        let mut charge = config.charge_range;
        if self.has_rule(&SpecialRule::Fast) {
            advance = advance.saturating_add(config.fast_bonus);
            charge = charge.saturating_add(config.fast_bonus.saturating_mul(2));
        }
        if self.has_rule(&SpecialRule::Slow) {
            advance = advance.saturating_sub(config.slow_penalty);
            charge = charge.saturating_sub(config.slow_penalty.saturating_mul(2));
        }
        (advance, charge)
    }
}

/// Mutable combat copy of a unit for one engagement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    pub name: String,
    pub models: u32,
    /// Model count at engagement start; reference for the half-strength test
    original_models: u32,
    pub quality: u8,
    pub defense: u8,
    pub toughness: u32,
    pub rules: Vec<SpecialRule>,
    pub weapons: Vec<WeaponProfile>,
    pub advance_range: u32,
    pub charge_range: u32,
    /// Skips its next action, then recovers
    pub shaken: bool,
    /// Already fought in melee this turn (fatigued)
    pub fought_this_turn: bool,
}

impl UnitState {
    /// Clone a profile into fresh combat state
    pub fn from_profile(profile: &UnitProfile, config: &EngagementConfig) -> Self {
        let (advance_range, charge_range) = profile.movement(config);
        Self {
            name: profile.name.clone(),
            models: profile.models,
            original_models: profile.models,
            quality: profile.quality,
            defense: profile.defense,
            toughness: profile.toughness.max(1),
            rules: profile.rules.clone(),
            weapons: profile.weapons.clone(),
            advance_range,
            charge_range,
            shaken: false,
            fought_this_turn: false,
        }
    }

    pub fn original_models(&self) -> u32 {
        self.original_models
    }

    pub fn is_destroyed(&self) -> bool {
        self.models == 0
    }

    pub fn has_rule(&self, rule: &SpecialRule) -> bool {
        self.rules.contains(rule)
    }

    /// At or above half of the starting model count
    pub fn at_half_strength_or_more(&self) -> bool {
        self.models * 2 >= self.original_models
    }

    /// First melee weapon, or the baseline hand weapon if there is none
    pub fn melee_weapon(&self) -> WeaponProfile {
        self.weapons
            .iter()
            .find(|w| w.is_melee())
            .cloned()
            .unwrap_or_else(|| WeaponProfile::default_melee(self.original_models))
    }

    pub fn ranged_weapons(&self) -> impl Iterator<Item = &WeaponProfile> {
        self.weapons.iter().filter(|w| w.is_ranged())
    }

    /// Longest-range weapon that can reach `distance`
    pub fn best_weapon_for(&self, distance: u32) -> Option<&WeaponProfile> {
        self.ranged_weapons()
            .filter(|w| w.reaches(distance))
            .max_by_key(|w| w.range)
    }

    /// Convert wounds into removed models; returns models killed
    pub fn apply_wounds(&mut self, wounds: u32) -> u32 {
        let killed = (wounds / self.toughness).min(self.models);
        self.models -= killed;
        killed
    }

    /// Remove every remaining model
    pub fn destroy(&mut self) -> u32 {
        std::mem::take(&mut self.models)
    }
}
