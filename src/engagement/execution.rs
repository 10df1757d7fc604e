//! Engagement execution - the turn loop
//!
//! Each turn: clear fatigue, then activate the units in order. A charge ends
//! the turn for both sides. The engagement stops as soon as a unit is wiped
//! out or the turn cap is reached.

use serde::{Deserialize, Serialize};

use crate::ai::{decide_action, TacticalAction};
use crate::combat::{
    apply_morale, check_morale, melee_exchange, melee_loser, ranged_exchange, MeleeSide,
    MoraleOutcome, RangedResult,
};
use crate::core::config::EngagementConfig;
use crate::dice::DieRoller;
use crate::engagement::events::{EngagementEvent, EngagementEventKind, EngagementLog, UnitSide};
use crate::unit::{UnitProfile, UnitState};

/// Inputs for one engagement; the profiles are only ever read
#[derive(Debug, Clone, Copy)]
pub struct EngagementSetup<'a> {
    pub unit_a: &'a UnitProfile,
    pub unit_b: &'a UnitProfile,
    pub starting_distance: u32,
    /// Unit A activates first each turn
    pub attacker_first: bool,
}

/// Final tally of an engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementResult {
    pub turns_elapsed: u32,
    pub final_distance: u32,
    pub surviving_a: u32,
    pub surviving_b: u32,
    pub log: Vec<String>,
    pub events: Vec<EngagementEvent>,
}

impl EngagementResult {
    /// The only side with models left, if exactly one has
    pub fn winner(&self) -> Option<UnitSide> {
        match (self.surviving_a, self.surviving_b) {
            (a, 0) if a > 0 => Some(UnitSide::A),
            (0, b) if b > 0 => Some(UnitSide::B),
            _ => None,
        }
    }
}

/// Live state of an engagement
#[derive(Debug, Clone)]
pub struct Engagement {
    units: [UnitState; 2],
    distance: u32,
    turn: u32,
    attacker_first: bool,
    config: EngagementConfig,
    log: EngagementLog,
}

impl Engagement {
    /// Clone both profiles into fresh combat state
    pub fn new(setup: &EngagementSetup<'_>, config: &EngagementConfig) -> Self {
        let units = [
            UnitState::from_profile(setup.unit_a, config),
            UnitState::from_profile(setup.unit_b, config),
        ];
        let mut log = EngagementLog::new();
        log.push(
            0,
            None,
            EngagementEventKind::EngagementStarted,
            format!(
                "{} ({} models) vs {} ({} models) at {}\"",
                units[0].name,
                units[0].models,
                units[1].name,
                units[1].models,
                setup.starting_distance
            ),
        );

        Self {
            units,
            distance: setup.starting_distance,
            turn: 0,
            attacker_first: setup.attacker_first,
            config: config.clone(),
            log,
        }
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn unit(&self, side: UnitSide) -> &UnitState {
        &self.units[side.index()]
    }

    pub fn log(&self) -> &EngagementLog {
        &self.log
    }

    pub fn is_finished(&self) -> bool {
        self.units.iter().any(UnitState::is_destroyed) || self.turn >= self.config.max_turns
    }

    /// Play the next turn. Returns false if the engagement was already over.
    pub fn step<D: DieRoller + ?Sized>(&mut self, dice: &mut D) -> bool {
        if self.is_finished() {
            return false;
        }

        self.turn += 1;
        for unit in &mut self.units {
            unit.fought_this_turn = false;
        }
        self.log.push(
            self.turn,
            None,
            EngagementEventKind::TurnStarted,
            format!("--- Turn {} ({}\" apart) ---", self.turn, self.distance),
        );

        for side in self.activation_order() {
            let action = self.activate(side, dice);
            if self.units.iter().any(UnitState::is_destroyed) {
                break;
            }
            if action == TacticalAction::Charge {
                break;
            }
        }
        true
    }

    /// Run to completion
    pub fn run<D: DieRoller + ?Sized>(mut self, dice: &mut D) -> EngagementResult {
        tracing::info!(
            unit_a = %self.units[0].name,
            unit_b = %self.units[1].name,
            distance = self.distance,
            "engagement started"
        );

        while self.step(dice) {}

        self.log.push(
            self.turn,
            None,
            EngagementEventKind::EngagementEnded,
            format!(
                "Engagement over after {} turn(s): {} {} remaining, {} {} remaining",
                self.turn,
                self.units[0].name,
                self.units[0].models,
                self.units[1].name,
                self.units[1].models
            ),
        );

        tracing::info!(
            turns = self.turn,
            surviving_a = self.units[0].models,
            surviving_b = self.units[1].models,
            "engagement finished"
        );

        EngagementResult {
            turns_elapsed: self.turn,
            final_distance: self.distance,
            surviving_a: self.units[0].models,
            surviving_b: self.units[1].models,
            log: self.log.lines(),
            events: self.log.events,
        }
    }

    fn activation_order(&self) -> [UnitSide; 2] {
        if self.attacker_first {
            [UnitSide::A, UnitSide::B]
        } else {
            [UnitSide::B, UnitSide::A]
        }
    }

    fn pair(&self, side: UnitSide) -> (&UnitState, &UnitState) {
        (&self.units[side.index()], &self.units[side.other().index()])
    }

    fn pair_mut(&mut self, side: UnitSide) -> (&mut UnitState, &mut UnitState) {
        let [a, b] = &mut self.units;
        match side {
            UnitSide::A => (a, b),
            UnitSide::B => (b, a),
        }
    }

    fn activate<D: DieRoller + ?Sized>(&mut self, side: UnitSide, dice: &mut D) -> TacticalAction {
        let (unit, opponent) = self.pair(side);
        let action = decide_action(unit, opponent, self.distance);
        let name = unit.name.clone();
        self.log.push(
            self.turn,
            Some(side),
            EngagementEventKind::Decision { action },
            format!("{} chooses to {}", name, action),
        );

        match action {
            TacticalAction::Idle => {
                self.units[side.index()].shaken = false;
                self.log.push(
                    self.turn,
                    Some(side),
                    EngagementEventKind::Recovered,
                    format!("{} is shaken, sits out the activation and recovers", name),
                );
            }
            TacticalAction::Charge => {
                self.distance = 0;
                self.log.push(
                    self.turn,
                    Some(side),
                    EngagementEventKind::Movement { distance: 0 },
                    format!("{} charges into melee", name),
                );
                self.resolve_melee(side, dice);
            }
            TacticalAction::Fight => self.resolve_melee(side, dice),
            TacticalAction::Hold => self.resolve_shooting(side, dice),
            TacticalAction::Advance => {
                let advance = self.units[side.index()].advance_range;
                let description = if self.distance == 0 {
                    self.distance = advance;
                    format!("{} falls back {}\" (now {}\" apart)", name, advance, self.distance)
                } else {
                    self.distance = self.distance.saturating_sub(advance);
                    format!("{} advances {}\" (now {}\" apart)", name, advance, self.distance)
                };
                self.log.push(
                    self.turn,
                    Some(side),
                    EngagementEventKind::Movement {
                        distance: self.distance,
                    },
                    description,
                );
                self.resolve_shooting(side, dice);
            }
            TacticalAction::Rush => {
                let charge = self.units[side.index()].charge_range;
                self.distance = self.distance.saturating_sub(charge);
                self.log.push(
                    self.turn,
                    Some(side),
                    EngagementEventKind::Movement {
                        distance: self.distance,
                    },
                    format!("{} rushes {}\" (now {}\" apart)", name, charge, self.distance),
                );
            }
        }

        action
    }

    fn resolve_shooting<D: DieRoller + ?Sized>(&mut self, side: UnitSide, dice: &mut D) {
        let distance = self.distance;
        let (shooter, target) = self.pair(side);
        let Some(weapon) = shooter.best_weapon_for(distance).cloned() else {
            let description = format!("{} has no weapon in range", shooter.name);
            self.log
                .push(self.turn, Some(side), EngagementEventKind::NoTarget, description);
            return;
        };

        let result = ranged_exchange(&weapon, shooter, target, distance, dice);
        let shooter_name = shooter.name.clone();
        let (_, target) = self.pair_mut(side);
        let wounds = result.wounds();
        let killed = target.apply_wounds(wounds);

        let detail = match result {
            RangedResult::OutOfRange => "out of range".to_string(),
            RangedResult::Resolved { hits, wounds } => format!(
                "{} hits, {} saved, {} wounds",
                hits.hits, wounds.saves, wounds.wounds
            ),
        };
        let description = format!(
            "{} fires {} at {}: {}; {} killed ({} left)",
            shooter_name, weapon.name, target.name, detail, killed, target.models
        );
        self.log.push(
            self.turn,
            Some(side),
            EngagementEventKind::RangedFire { wounds, killed },
            description,
        );
        self.log_if_destroyed(side.other());
    }

    fn resolve_melee<D: DieRoller + ?Sized>(&mut self, side: UnitSide, dice: &mut D) {
        let (attacker, defender) = self.pair(side);
        let result = melee_exchange(attacker, defender, dice);

        let (attacker, defender) = self.pair_mut(side);
        attacker.fought_this_turn = true;
        defender.fought_this_turn = true;

        let wounds_dealt = result.wounds_on_defender();
        let wounds_taken = result.wounds_on_attacker();
        let defender_killed = defender.apply_wounds(wounds_dealt);
        let attacker_killed = attacker.apply_wounds(wounds_taken);

        let description = format!(
            "Melee: {} deals {} wounds ({} killed, {} left); {} deals {} wounds ({} killed, {} left)",
            attacker.name,
            wounds_dealt,
            defender_killed,
            defender.models,
            defender.name,
            wounds_taken,
            attacker_killed,
            attacker.models
        );
        self.log.push(
            self.turn,
            Some(side),
            EngagementEventKind::Melee {
                wounds_dealt,
                wounds_taken,
            },
            description,
        );

        if let Some(loser) = melee_loser(wounds_taken, wounds_dealt) {
            let loser = match loser {
                MeleeSide::Attacker => side,
                MeleeSide::Defender => side.other(),
            };
            self.resolve_morale(loser, dice);
        }

        self.log_if_destroyed(side);
        self.log_if_destroyed(side.other());
    }

    fn resolve_morale<D: DieRoller + ?Sized>(&mut self, side: UnitSide, dice: &mut D) {
        let unit = &self.units[side.index()];
        if unit.is_destroyed() {
            return;
        }

        let check = check_morale(unit, self.config.fearless_threshold, dice);
        let unit = &mut self.units[side.index()];
        apply_morale(unit, check.outcome);

        let rolls = match check.fearless_roll {
            Some(reroll) => format!("rolled {}, Fearless re-roll {}", check.roll, reroll),
            None => format!("rolled {}", check.roll),
        };
        let verdict = match check.outcome {
            MoraleOutcome::Passed => "holds",
            MoraleOutcome::Shaken => "is shaken",
            MoraleOutcome::Routed => "routs and is destroyed",
        };
        let description = format!("{} tests morale ({}) and {}", unit.name, rolls, verdict);
        self.log.push(
            self.turn,
            Some(side),
            EngagementEventKind::Morale {
                outcome: check.outcome,
            },
            description,
        );
    }

    fn log_if_destroyed(&mut self, side: UnitSide) {
        let unit = &self.units[side.index()];
        if !unit.is_destroyed() {
            return;
        }
        let already_logged = self.log.events.iter().any(|e| {
            e.actor == Some(side) && matches!(e.kind, EngagementEventKind::Destroyed)
        });
        if already_logged {
            return;
        }
        let description = format!("{} is destroyed", unit.name);
        self.log
            .push(self.turn, Some(side), EngagementEventKind::Destroyed, description);
    }
}

/// Run one engagement from the caller's profiles
pub fn simulate<D: DieRoller + ?Sized>(
    setup: &EngagementSetup<'_>,
    config: &EngagementConfig,
    dice: &mut D,
) -> EngagementResult {
    Engagement::new(setup, config).run(dice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{ScriptedDice, SeededDice};
    use crate::unit::{SpecialRule, WeaponProfile};

    fn grunts(name: &str) -> UnitProfile {
        UnitProfile::new(name, 5, 4, 5)
            .with_weapon(WeaponProfile::new("Rifle", 5, 24, 1))
            .with_weapon(WeaponProfile::new("CombatBlade", 5, 0, 1))
    }

    fn setup<'a>(a: &'a UnitProfile, b: &'a UnitProfile, distance: u32) -> EngagementSetup<'a> {
        EngagementSetup {
            unit_a: a,
            unit_b: b,
            starting_distance: distance,
            attacker_first: true,
        }
    }

    #[test]
    fn test_turn_cap() {
        let a = grunts("A");
        let b = grunts("B");
        // All 1s: nothing ever hits, so the cap ends it
        let mut dice = ScriptedDice::new(vec![1]);
        let result = simulate(&setup(&a, &b, 40), &EngagementConfig::default(), &mut dice);

        assert_eq!(result.turns_elapsed, 4);
        assert_eq!(result.surviving_a, 5);
        assert_eq!(result.surviving_b, 5);
        assert_eq!(result.winner(), None);
    }

    #[test]
    fn test_charge_ends_turn() {
        let a = grunts("A");
        let b = grunts("B");
        let mut engagement = Engagement::new(&setup(&a, &b, 10), &EngagementConfig::default());
        let mut dice = ScriptedDice::new(vec![1]);

        engagement.step(&mut dice);

        let decisions: Vec<_> = engagement
            .log()
            .turn_events(1)
            .filter(|e| matches!(e.kind, EngagementEventKind::Decision { .. }))
            .collect();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].actor, Some(UnitSide::A));
        assert_eq!(engagement.distance(), 0);
    }

    #[test]
    fn test_second_actor_can_charge_after_first_acts() {
        let a = grunts("A");
        let b = UnitProfile::new("Brawlers", 5, 4, 5)
            .with_weapon(WeaponProfile::new("Blade", 5, 0, 2));
        let engagement_setup = EngagementSetup {
            attacker_first: false,
            ..setup(&a, &b, 20)
        };
        let mut engagement = Engagement::new(&engagement_setup, &EngagementConfig::default());
        let mut dice = ScriptedDice::new(vec![1]);

        engagement.step(&mut dice);

        // B rushes to 8", then A charges
        let actors: Vec<_> = engagement
            .log()
            .turn_events(1)
            .filter_map(|e| match e.kind {
                EngagementEventKind::Decision { action } => Some((e.actor, action)),
                _ => None,
            })
            .collect();
        assert_eq!(
            actors,
            vec![
                (Some(UnitSide::B), TacticalAction::Rush),
                (Some(UnitSide::A), TacticalAction::Charge)
            ]
        );
    }

    #[test]
    fn test_rush_closes_distance() {
        let a = UnitProfile::new("Brawlers", 5, 4, 5)
            .with_weapon(WeaponProfile::new("Blade", 5, 0, 2));
        let b = grunts("B");
        let mut engagement = Engagement::new(&setup(&a, &b, 40), &EngagementConfig::default());
        let mut dice = ScriptedDice::new(vec![1]);

        engagement.step(&mut dice);

        // A rushes 12" to 28", B advances 6" to 22" and fires
        assert_eq!(engagement.distance(), 22);
    }

    #[test]
    fn test_shaken_unit_idles_and_recovers() {
        let a = grunts("A");
        let b = grunts("B");
        let mut engagement = Engagement::new(&setup(&a, &b, 0), &EngagementConfig::default());
        engagement.units[0].shaken = true;
        let mut dice = ScriptedDice::new(vec![1]);

        engagement.step(&mut dice);

        assert!(!engagement.unit(UnitSide::A).shaken);
        assert!(engagement
            .log()
            .turn_events(1)
            .any(|e| e.kind == EngagementEventKind::Recovered));
    }

    #[test]
    fn test_outmatched_unit_falls_back_and_fires() {
        let a = grunts("A");
        let b = UnitProfile::new("Elites", 5, 3, 3)
            .with_weapon(WeaponProfile::new("Great Blade", 5, 0, 3).with_ap(2));
        let config = EngagementConfig::default();
        let mut engagement = Engagement::new(&setup(&a, &b, 0), &config);
        // Keeps B from charging straight back in
        engagement.units[1].shaken = true;
        let mut dice = ScriptedDice::new(vec![1]);

        engagement.step(&mut dice);

        let a_events: Vec<_> = engagement
            .log()
            .turn_events(1)
            .filter(|e| e.actor == Some(UnitSide::A))
            .map(|e| e.kind.clone())
            .collect();
        assert_eq!(
            a_events[0],
            EngagementEventKind::Decision {
                action: TacticalAction::Advance
            }
        );
        assert_eq!(
            a_events[1],
            EngagementEventKind::Movement {
                distance: config.advance_range
            }
        );
        assert!(matches!(
            a_events[2],
            EngagementEventKind::RangedFire { .. } | EngagementEventKind::NoTarget
        ));
        assert_eq!(engagement.distance(), engagement.unit(UnitSide::A).advance_range);
        assert_eq!(engagement.distance(), 6);
    }

    #[test]
    fn test_rout_ends_engagement() {
        let a = UnitProfile::new("Elites", 5, 2, 2)
            .with_weapon(WeaponProfile::new("Great Blade", 5, 0, 2).with_ap(4));
        let b = grunts("B");
        let mut dice = SeededDice::new(3);
        let result = simulate(&setup(&a, &b, 10), &EngagementConfig::default(), &mut dice);

        assert!(result.turns_elapsed <= 4);
        assert!(result.surviving_b <= 5);
        if result.surviving_b == 0 {
            assert_eq!(result.winner(), Some(UnitSide::A));
            assert!(result
                .events
                .iter()
                .any(|e| e.kind == EngagementEventKind::Destroyed));
        }
    }

    #[test]
    fn test_destroyed_unit_skips_morale() {
        let a = grunts("A");
        let b = grunts("B");
        let mut engagement = Engagement::new(&setup(&a, &b, 5), &EngagementConfig::default());
        // A hits: 4 x5 -> 5. B hits: 1 x5 -> 0. B saves: 1 x5 -> 5 wounds.
        let mut dice = ScriptedDice::new(vec![4, 4, 4, 4, 4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);

        engagement.step(&mut dice);

        assert!(engagement.unit(UnitSide::B).is_destroyed());
        assert!(!engagement
            .log()
            .events
            .iter()
            .any(|e| matches!(e.kind, EngagementEventKind::Morale { .. })));
    }

    #[test]
    fn test_fearless_reroll_after_losing_melee() {
        let a = grunts("A");
        let b = grunts("B").with_rule(SpecialRule::Fearless);
        let mut engagement = Engagement::new(&setup(&a, &b, 5), &EngagementConfig::default());
        // A hits 2, B hits 0, B fails both saves (3 left),
        // morale roll 2 fails, Fearless re-roll 5 passes
        let mut dice = ScriptedDice::new(vec![4, 4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 5]);

        engagement.step(&mut dice);

        let morale = engagement
            .log()
            .events
            .iter()
            .find(|e| matches!(e.kind, EngagementEventKind::Morale { .. }))
            .expect("B should test morale");
        assert_eq!(morale.actor, Some(UnitSide::B));
        assert_eq!(
            morale.kind,
            EngagementEventKind::Morale {
                outcome: MoraleOutcome::Passed
            }
        );
        assert!(morale.description.contains("Fearless re-roll 5"));
        assert_eq!(engagement.unit(UnitSide::B).models, 3);
        assert!(!engagement.unit(UnitSide::B).shaken);
    }
}
