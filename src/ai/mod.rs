//! Tactical decision making for a unit on its activation
//!
//! Pure and deterministic: the same battlefield state always yields the
//! same action. Randomness only enters when the action is resolved.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dice::success_chance;
use crate::unit::UnitState;

/// Action a unit takes on its activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacticalAction {
    /// Shaken: skip the activation and recover
    Idle,
    /// Already in melee: fight another round
    Fight,
    /// Move by the advance range, then shoot if possible.
    /// In melee this means falling back.
    Advance,
    /// Close to melee and fight; ends the turn for both sides
    Charge,
    /// Stay put and shoot
    Hold,
    /// Full move toward the enemy, no attack
    Rush,
}

impl fmt::Display for TacticalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TacticalAction::Idle => "idle",
            TacticalAction::Fight => "fight",
            TacticalAction::Advance => "advance",
            TacticalAction::Charge => "charge",
            TacticalAction::Hold => "hold",
            TacticalAction::Rush => "rush",
        };
        write!(f, "{}", name)
    }
}

/// Expected wounds `attacker` would deal `defender` in one melee round
///
/// Closed-form: dice x P(hit) x P(save fails).
pub fn expected_melee_wounds(attacker: &UnitState, defender: &UnitState) -> f64 {
    let weapon = attacker.melee_weapon();
    let dice = f64::from(weapon.attack_dice(attacker.models));
    let expected_hits = dice * success_chance(attacker.quality);
    let wound_chance = 1.0 - success_chance(defender.defense.saturating_add(weapon.ap));
    expected_hits * wound_chance
}

/// Choose an action for `unit` facing `opponent` at `distance` inches
pub fn decide_action(unit: &UnitState, opponent: &UnitState, distance: u32) -> TacticalAction {
    if unit.shaken {
        return TacticalAction::Idle;
    }

    if distance == 0 {
        let dealt = expected_melee_wounds(unit, opponent);
        let taken = expected_melee_wounds(opponent, unit);
        return if taken > dealt {
            TacticalAction::Advance
        } else {
            TacticalAction::Fight
        };
    }

    if distance <= unit.charge_range {
        TacticalAction::Charge
    } else if unit.ranged_weapons().any(|w| w.reaches(distance)) {
        TacticalAction::Hold
    } else if unit
        .ranged_weapons()
        .any(|w| w.range.saturating_add(unit.advance_range) >= distance)
    {
        TacticalAction::Advance
    } else {
        TacticalAction::Rush
    }
}
