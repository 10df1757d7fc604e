//! Morale tests after losing a melee round
//!
//! Unlike attack rolls, the morale roll is a plain threshold comparison:
//! no natural 1 / natural 6 override.

use serde::{Deserialize, Serialize};

use crate::dice::DieRoller;
use crate::unit::{SpecialRule, UnitState};

/// Final state of a morale test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoraleOutcome {
    Passed,
    /// Failed at or above half strength; skips its next action
    Shaken,
    /// Failed below half strength; the unit is destroyed
    Routed,
}

/// Rolls made during a morale test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleCheckResult {
    pub roll: u8,
    /// Fearless re-roll, if one was taken
    pub fearless_roll: Option<u8>,
    pub outcome: MoraleOutcome,
}

/// Which side of a melee round has to test, if any
///
/// Only a side that received strictly more wounds than it dealt tests.
pub fn melee_loser(wounds_on_attacker: u32, wounds_on_defender: u32) -> Option<MeleeSide> {
    if wounds_on_attacker > wounds_on_defender {
        Some(MeleeSide::Attacker)
    } else if wounds_on_defender > wounds_on_attacker {
        Some(MeleeSide::Defender)
    } else {
        None
    }
}

/// Side of a melee round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeleeSide {
    Attacker,
    Defender,
}

/// Roll a morale test for `unit`. Does NOT mutate the unit.
pub fn check_morale<D: DieRoller + ?Sized>(
    unit: &UnitState,
    fearless_threshold: u8,
    dice: &mut D,
) -> MoraleCheckResult {
    let roll = dice.roll_d6();
    if roll >= unit.quality {
        return MoraleCheckResult {
            roll,
            fearless_roll: None,
            outcome: MoraleOutcome::Passed,
        };
    }

    let fearless_roll = if unit.has_rule(&SpecialRule::Fearless) {
        Some(dice.roll_d6())
    } else {
        None
    };

    let outcome = match fearless_roll {
        Some(reroll) if reroll >= fearless_threshold => MoraleOutcome::Passed,
        _ if unit.at_half_strength_or_more() => MoraleOutcome::Shaken,
        _ => MoraleOutcome::Routed,
    };

    MoraleCheckResult {
        roll,
        fearless_roll,
        outcome,
    }
}

/// Apply a morale outcome; returns models removed by a rout
pub fn apply_morale(unit: &mut UnitState, outcome: MoraleOutcome) -> u32 {
    match outcome {
        MoraleOutcome::Passed => 0,
        MoraleOutcome::Shaken => {
            unit.shaken = true;
            0
        }
        MoraleOutcome::Routed => unit.destroy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngagementConfig;
    use crate::dice::ScriptedDice;
    use crate::unit::UnitProfile;

    fn unit(models: u32, rules: &[SpecialRule]) -> UnitState {
        let mut profile = UnitProfile::new("Grunts", 6, 4, 5);
        for rule in rules {
            profile = profile.with_rule(rule.clone());
        }
        let mut state = UnitState::from_profile(&profile, &EngagementConfig::default());
        state.models = models;
        state
    }

    #[test]
    fn test_pass_on_quality() {
        let mut dice = ScriptedDice::new(vec![4]);
        let result = check_morale(&unit(6, &[]), 4, &mut dice);
        assert_eq!(result.outcome, MoraleOutcome::Passed);
    }

    #[test]
    fn test_no_natural_six_override() {
        // Quality 7 cannot be passed even on a 6
        let mut grunts = unit(6, &[]);
        grunts.quality = 7;
        let mut dice = ScriptedDice::new(vec![6]);
        let result = check_morale(&grunts, 4, &mut dice);
        assert_eq!(result.outcome, MoraleOutcome::Shaken);
    }

    #[test]
    fn test_fail_at_half_strength_is_shaken() {
        let mut dice = ScriptedDice::new(vec![3]);
        let result = check_morale(&unit(3, &[]), 4, &mut dice);
        assert_eq!(result.outcome, MoraleOutcome::Shaken);
        assert_eq!(result.fearless_roll, None);
    }

    #[test]
    fn test_fail_below_half_routs() {
        let mut dice = ScriptedDice::new(vec![3]);
        let result = check_morale(&unit(2, &[]), 4, &mut dice);
        assert_eq!(result.outcome, MoraleOutcome::Routed);
    }

    #[test]
    fn test_fearless_reroll_can_pass() {
        let mut dice = ScriptedDice::new(vec![2, 4]);
        let result = check_morale(&unit(2, &[SpecialRule::Fearless]), 4, &mut dice);
        assert_eq!(result.fearless_roll, Some(4));
        assert_eq!(result.outcome, MoraleOutcome::Passed);
    }

    #[test]
    fn test_fearless_reroll_failure_still_routs() {
        let mut dice = ScriptedDice::new(vec![2, 3]);
        let result = check_morale(&unit(2, &[SpecialRule::Fearless]), 4, &mut dice);
        assert_eq!(result.fearless_roll, Some(3));
        assert_eq!(result.outcome, MoraleOutcome::Routed);
    }

    #[test]
    fn test_apply_rout_destroys_unit() {
        let mut grunts = unit(2, &[]);
        assert_eq!(apply_morale(&mut grunts, MoraleOutcome::Routed), 2);
        assert!(grunts.is_destroyed());
    }

    #[test]
    fn test_apply_shaken_sets_flag() {
        let mut grunts = unit(5, &[]);
        apply_morale(&mut grunts, MoraleOutcome::Shaken);
        assert!(grunts.shaken);
        assert_eq!(grunts.models, 5);
    }

    #[test]
    fn test_draw_triggers_no_test() {
        assert_eq!(melee_loser(2, 2), None);
        assert_eq!(melee_loser(3, 1), Some(MeleeSide::Attacker));
        assert_eq!(melee_loser(0, 1), Some(MeleeSide::Defender));
    }
}
