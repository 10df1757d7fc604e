//! Hit, save and wound resolution shared by ranged and melee exchanges
//!
//! Pipeline: attack dice vs quality -> hits (+Furious/Predator bonus)
//! -> save dice vs defense + AP -> unsaved wounds x Deadly.

use serde::{Deserialize, Serialize};

use crate::dice::{roll_batch, DieRoller};
use crate::unit::WeaponProfile;

/// Hits produced by one weapon activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    pub dice: u32,
    pub hits: u32,
    /// Natural 6s on the initial attack dice
    pub sixes: u32,
    /// Extra hits from Furious and Predator (included in `hits`)
    pub bonus_hits: u32,
    pub ap: u8,
}

/// Outcome of the defender's saves against a batch of hits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundResult {
    pub hits: u32,
    pub saves: u32,
    /// Unsaved hits after the Deadly multiplier
    pub wounds: u32,
}

/// Roll a weapon's attack dice against the attacker's quality
pub fn resolve_hits<D: DieRoller + ?Sized>(
    weapon: &WeaponProfile,
    quality: u8,
    models: u32,
    dice: &mut D,
) -> HitResult {
    let count = weapon.attack_dice(models);
    let roll = roll_batch(dice, count, quality);

    let mut bonus_hits = 0;
    if weapon.furious {
        bonus_hits += roll.sixes;
    }
    // Predator dice are rolled once; their own 6s grant nothing further
    if weapon.predator && roll.sixes > 0 {
        bonus_hits += roll_batch(dice, roll.sixes, quality).successes;
    }

    let result = HitResult {
        dice: count,
        hits: roll.successes.saturating_add(bonus_hits),
        sixes: roll.sixes,
        bonus_hits,
        ap: weapon.ap,
    };
    tracing::debug!(
        weapon = %weapon.name,
        dice = result.dice,
        hits = result.hits,
        bonus = result.bonus_hits,
        "resolved hits"
    );
    result
}

/// Roll saves for `hits` against `defense + ap`; returns successful saves
pub fn resolve_saves<D: DieRoller + ?Sized>(hits: u32, defense: u8, ap: u8, dice: &mut D) -> u32 {
    roll_batch(dice, hits, defense.saturating_add(ap)).successes
}

/// Saves then Deadly scaling for a weapon's hits
pub fn resolve_wounds<D: DieRoller + ?Sized>(
    hits: &HitResult,
    defense: u8,
    weapon: &WeaponProfile,
    dice: &mut D,
) -> WoundResult {
    let saves = resolve_saves(hits.hits, defense, hits.ap, dice);
    let wounds = (hits.hits - saves).saturating_mul(weapon.deadly_multiplier());
    WoundResult {
        hits: hits.hits,
        saves,
        wounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{ScriptedDice, WORST_QUALITY};

    #[test]
    fn test_plain_hits() {
        let rifle = WeaponProfile::new("Rifle", 5, 24, 1);
        let mut dice = ScriptedDice::new(vec![4, 3, 6, 1, 5]);
        let result = resolve_hits(&rifle, 4, 5, &mut dice);
        assert_eq!(result.dice, 5);
        assert_eq!(result.hits, 3);
        assert_eq!(result.bonus_hits, 0);
    }

    #[test]
    fn test_furious_sixes_count_twice() {
        let claws = WeaponProfile::new("Claws", 4, 0, 1).with_furious();
        let mut dice = ScriptedDice::new(vec![6, 6, 2, 4]);
        let result = resolve_hits(&claws, 4, 4, &mut dice);
        // 3 normal successes + 2 Furious bonus
        assert_eq!(result.hits, 5);
        assert_eq!(result.bonus_hits, 2);
    }

    #[test]
    fn test_predator_rolls_extra_dice_once() {
        let talons = WeaponProfile::new("Talons", 3, 0, 1).with_predator();
        // Initial: 6, 6, 2 -> 2 hits, 2 sixes. Predator dice: 6, 3 -> 1 hit.
        let mut dice = ScriptedDice::new(vec![6, 6, 2, 6, 3]);
        let result = resolve_hits(&talons, 4, 3, &mut dice);
        assert_eq!(result.hits, 3);
        assert_eq!(result.bonus_hits, 1);
        assert_eq!(dice.rolled(), 5);
    }

    #[test]
    fn test_predator_without_sixes_rolls_nothing_extra() {
        let talons = WeaponProfile::new("Talons", 2, 0, 1).with_predator();
        let mut dice = ScriptedDice::new(vec![5, 4]);
        let result = resolve_hits(&talons, 4, 2, &mut dice);
        assert_eq!(result.hits, 2);
        assert_eq!(dice.rolled(), 2);
    }

    #[test]
    fn test_fatigued_quality_hits_only_on_six() {
        let blade = WeaponProfile::new("Blade", 4, 0, 1);
        let mut dice = ScriptedDice::new(vec![5, 5, 6, 2]);
        let result = resolve_hits(&blade, WORST_QUALITY, 4, &mut dice);
        assert_eq!(result.hits, 1);
    }

    #[test]
    fn test_ap_worsens_saves() {
        // Defense 4 + AP 1 -> saves on 5+
        let mut dice = ScriptedDice::new(vec![4, 5, 6]);
        assert_eq!(resolve_saves(3, 4, 1, &mut dice), 2);
    }

    #[test]
    fn test_deadly_multiplies_unsaved_wounds() {
        let lance = WeaponProfile::new("Lance", 5, 0, 1).with_deadly(2);
        let hits = HitResult {
            dice: 5,
            hits: 5,
            sixes: 0,
            bonus_hits: 0,
            ap: 0,
        };
        // Saves on 5+: 5, 6 saved; 1, 2, 3 fail -> 3 unsaved
        let mut dice = ScriptedDice::new(vec![5, 6, 1, 2, 3]);
        let result = resolve_wounds(&hits, 5, &lance, &mut dice);
        assert_eq!(result.saves, 2);
        assert_eq!(result.wounds, 6);
    }
}
