//! Simultaneous melee between two units
//!
//! Both sides strike with their first melee weapon. A side that already
//! fought this turn is fatigued and only hits on natural 6s.

use serde::{Deserialize, Serialize};

use crate::combat::resolution::{resolve_hits, resolve_wounds, WoundResult};
use crate::dice::{DieRoller, WORST_QUALITY};
use crate::unit::UnitState;

/// Wounds each side inflicts in one melee round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeleeResult {
    /// Inflicted by the attacker on the defender
    pub attacker_strikes: WoundResult,
    /// Inflicted by the defender on the attacker
    pub defender_strikes: WoundResult,
}

impl MeleeResult {
    pub fn wounds_on_attacker(&self) -> u32 {
        self.defender_strikes.wounds
    }

    pub fn wounds_on_defender(&self) -> u32 {
        self.attacker_strikes.wounds
    }
}

/// Quality a unit fights at this round
pub fn effective_quality(unit: &UnitState) -> u8 {
    if unit.fought_this_turn {
        WORST_QUALITY
    } else {
        unit.quality
    }
}

/// Resolve one melee round. Does NOT mutate units.
pub fn melee_exchange<D: DieRoller + ?Sized>(
    attacker: &UnitState,
    defender: &UnitState,
    dice: &mut D,
) -> MeleeResult {
    let attacker_weapon = attacker.melee_weapon();
    let defender_weapon = defender.melee_weapon();

    let attacker_hits = resolve_hits(
        &attacker_weapon,
        effective_quality(attacker),
        attacker.models,
        dice,
    );
    let defender_hits = resolve_hits(
        &defender_weapon,
        effective_quality(defender),
        defender.models,
        dice,
    );

    let attacker_strikes = resolve_wounds(&attacker_hits, defender.defense, &attacker_weapon, dice);
    let defender_strikes = resolve_wounds(&defender_hits, attacker.defense, &defender_weapon, dice);

    MeleeResult {
        attacker_strikes,
        defender_strikes,
    }
}
