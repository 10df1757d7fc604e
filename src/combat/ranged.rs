//! Ranged fire from one unit at another

use serde::{Deserialize, Serialize};

use crate::combat::resolution::{resolve_hits, resolve_wounds, HitResult, WoundResult};
use crate::dice::DieRoller;
use crate::unit::{UnitState, WeaponProfile};

/// Result of one ranged volley
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangedResult {
    /// Target beyond the weapon's range; no dice rolled
    OutOfRange,
    Resolved { hits: HitResult, wounds: WoundResult },
}

impl RangedResult {
    pub fn wounds(&self) -> u32 {
        match self {
            RangedResult::OutOfRange => 0,
            RangedResult::Resolved { wounds, .. } => wounds.wounds,
        }
    }
}

/// Fire `weapon` from `attacker` at `defender` across `distance` inches
///
/// Does NOT mutate units - caller applies wounds.
pub fn ranged_exchange<D: DieRoller + ?Sized>(
    weapon: &WeaponProfile,
    attacker: &UnitState,
    defender: &UnitState,
    distance: u32,
    dice: &mut D,
) -> RangedResult {
    if !weapon.reaches(distance) {
        return RangedResult::OutOfRange;
    }

    let hits = resolve_hits(weapon, attacker.quality, attacker.models, dice);
    let wounds = resolve_wounds(&hits, defender.defense, weapon, dice);
    RangedResult::Resolved { hits, wounds }
}
