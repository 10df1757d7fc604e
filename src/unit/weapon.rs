//! Weapon profiles as read from a stat block

use serde::{Deserialize, Serialize};

/// A weapon carried by some number of models in a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    /// Models carrying this weapon
    pub models: u32,
    /// Range in inches; 0 means melee only
    pub range: u32,
    /// Attacks per model
    pub attacks: u32,
    /// Armor penetration, added to the defender's save target
    #[serde(default)]
    pub ap: u8,
    /// Natural 6s to hit count one extra hit
    #[serde(default)]
    pub furious: bool,
    /// Natural 6s to hit grant extra attack dice
    #[serde(default)]
    pub predator: bool,
    /// Multiplier applied to unsaved wounds
    #[serde(default)]
    pub deadly: Option<u32>,
}

impl WeaponProfile {
    pub fn new(name: impl Into<String>, models: u32, range: u32, attacks: u32) -> Self {
        Self {
            name: name.into(),
            models,
            range,
            attacks,
            ap: 0,
            furious: false,
            predator: false,
            deadly: None,
        }
    }

    /// Baseline weapon every model can swing: 1 attack, no AP
    pub fn default_melee(models: u32) -> Self {
        Self::new("Hand Weapon", models, 0, 1)
    }

    pub fn with_ap(mut self, ap: u8) -> Self {
        self.ap = ap;
        self
    }

    pub fn with_furious(mut self) -> Self {
        self.furious = true;
        self
    }

    pub fn with_predator(mut self) -> Self {
        self.predator = true;
        self
    }

    pub fn with_deadly(mut self, multiplier: u32) -> Self {
        self.deadly = Some(multiplier);
        self
    }

    pub fn is_melee(&self) -> bool {
        self.range == 0
    }

    pub fn is_ranged(&self) -> bool {
        self.range > 0
    }

    pub fn deadly_multiplier(&self) -> u32 {
        self.deadly.unwrap_or(1)
    }

    /// Can this weapon shoot at a target `distance` inches away?
    pub fn reaches(&self, distance: u32) -> bool {
        self.is_ranged() && distance <= self.range
    }

    /// Models still able to use this weapon after casualties
    pub fn armed_models(&self, surviving: u32) -> u32 {
        self.models.min(surviving)
    }

    /// Attack dice this weapon rolls for the given survivors
    pub fn attack_dice(&self, surviving: u32) -> u32 {
        self.armed_models(surviving).saturating_mul(self.attacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_weapon_has_no_reach() {
        let blade = WeaponProfile::new("Blade", 5, 0, 2);
        assert!(blade.is_melee());
        assert!(!blade.reaches(0));
    }

    #[test]
    fn test_ranged_reach_inclusive() {
        let rifle = WeaponProfile::new("Rifle", 5, 24, 1);
        assert!(rifle.reaches(24));
        assert!(rifle.reaches(0));
        assert!(!rifle.reaches(25));
    }

    #[test]
    fn test_attack_dice_capped_by_survivors() {
        let rifle = WeaponProfile::new("Rifle", 5, 24, 2);
        assert_eq!(rifle.attack_dice(5), 10);
        assert_eq!(rifle.attack_dice(3), 6);
        assert_eq!(rifle.attack_dice(8), 10);
    }

    #[test]
    fn test_attack_dice_saturates() {
        let gun = WeaponProfile::new("Gun", 5, 24, u32::MAX / 2);
        assert_eq!(gun.attack_dice(5), u32::MAX);
        assert_eq!(gun.attack_dice(0), 0);
    }

    #[test]
    fn test_deadly_defaults_to_one() {
        let rifle = WeaponProfile::new("Rifle", 5, 24, 1);
        assert_eq!(rifle.deadly_multiplier(), 1);
        assert_eq!(rifle.with_deadly(3).deadly_multiplier(), 3);
    }
}
