//! Static odds report for a unit
//!
//! Closed-form expectations only; nothing here rolls dice or touches an
//! engagement.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::EngagementConfig;
use crate::dice::{success_chance, DIE_FACES, MIN_TARGET};
use crate::unit::{UnitProfile, WeaponProfile};

/// Chance of rolling a natural 6 on one die
const NATURAL_SIX: f64 = 1.0 / 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponAnalysis {
    pub name: String,
    pub range: u32,
    pub dice: u32,
    pub hit_chance: f64,
    /// Including expected Furious and Predator bonus hits
    pub expected_hits: f64,
    /// (defense target, expected wounds) for each defense 2+..6+
    pub wounds_by_defense: Vec<(u8, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAnalysis {
    pub name: String,
    pub models: u32,
    pub quality: u8,
    pub defense: u8,
    pub toughness: u32,
    pub advance_range: u32,
    pub charge_range: u32,
    /// Chance to save a hit with no AP
    pub save_chance: f64,
    pub weapons: Vec<WeaponAnalysis>,
}

/// Expected hits from one full activation of `weapon`
pub fn expected_hits(weapon: &WeaponProfile, quality: u8) -> f64 {
    let dice = f64::from(weapon.attacks.saturating_mul(weapon.models));
    let p = success_chance(quality);
    let mut hits = dice * p;
    if weapon.furious {
        hits += dice * NATURAL_SIX;
    }
    if weapon.predator {
        hits += dice * NATURAL_SIX * p;
    }
    hits
}

pub fn analyze_weapon(weapon: &WeaponProfile, quality: u8) -> WeaponAnalysis {
    let hits = expected_hits(weapon, quality);
    let deadly = f64::from(weapon.deadly_multiplier());
    let wounds_by_defense = (MIN_TARGET..=DIE_FACES)
        .map(|defense| {
            let unsaved = 1.0 - success_chance(defense.saturating_add(weapon.ap));
            (defense, hits * unsaved * deadly)
        })
        .collect();

    WeaponAnalysis {
        name: weapon.name.clone(),
        range: weapon.range,
        dice: weapon.attacks.saturating_mul(weapon.models),
        hit_chance: success_chance(quality),
        expected_hits: hits,
        wounds_by_defense,
    }
}

pub fn analyze_unit(unit: &UnitProfile, config: &EngagementConfig) -> UnitAnalysis {
    let (advance_range, charge_range) = unit.movement(config);
    UnitAnalysis {
        name: unit.name.clone(),
        models: unit.models,
        quality: unit.quality,
        defense: unit.defense,
        toughness: unit.toughness,
        advance_range,
        charge_range,
        save_chance: success_chance(unit.defense),
        weapons: unit
            .weapons
            .iter()
            .map(|w| analyze_weapon(w, unit.quality))
            .collect(),
    }
}

impl fmt::Display for UnitAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [{}] Q{}+ D{}+ Tough {} | move {}\" / charge {}\" | save {:.0}%",
            self.name,
            self.models,
            self.quality,
            self.defense,
            self.toughness,
            self.advance_range,
            self.charge_range,
            self.save_chance * 100.0
        )?;
        write!(f, "  {:<16} {:>5} {:>5} {:>6} {:>6}", "weapon", "range", "dice", "hit%", "hits")?;
        for defense in MIN_TARGET..=DIE_FACES {
            write!(f, " {:>6}", format!("vs{}+", defense))?;
        }
        writeln!(f)?;

        for weapon in &self.weapons {
            let range = if weapon.range == 0 {
                "melee".to_string()
            } else {
                format!("{}\"", weapon.range)
            };
            write!(
                f,
                "  {:<16} {:>5} {:>5} {:>5.0}% {:>6.2}",
                weapon.name,
                range,
                weapon.dice,
                weapon.hit_chance * 100.0,
                weapon.expected_hits
            )?;
            for (_, wounds) in &weapon.wounds_by_defense {
                write!(f, " {:>6.2}", wounds)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plain_expected_hits() {
        let rifle = WeaponProfile::new("Rifle", 5, 24, 1);
        assert!(close(expected_hits(&rifle, 4), 2.5));
    }

    #[test]
    fn test_furious_and_predator_add_bonus() {
        let claws = WeaponProfile::new("Claws", 6, 0, 1).with_furious();
        assert!(close(expected_hits(&claws, 4), 3.0 + 1.0));

        let talons = WeaponProfile::new("Talons", 6, 0, 1).with_predator();
        assert!(close(expected_hits(&talons, 4), 3.0 + 0.5));
    }

    #[test]
    fn test_wounds_table_applies_ap_and_deadly() {
        let lance = WeaponProfile::new("Lance", 6, 0, 1).with_ap(1).with_deadly(2);
        let analysis = analyze_weapon(&lance, 4);
        assert_eq!(analysis.wounds_by_defense.len(), 5);

        // vs 6+ with AP1 -> only natural 6s save
        let (defense, wounds) = analysis.wounds_by_defense[4];
        assert_eq!(defense, 6);
        assert!(close(wounds, 3.0 * (5.0 / 6.0) * 2.0));
    }

    #[test]
    fn test_unit_report_includes_movement() {
        let unit = UnitProfile::new("Grunts", 5, 4, 5)
            .with_rule(crate::unit::SpecialRule::Fast)
            .with_weapon(WeaponProfile::new("Rifle", 5, 24, 1));
        let report = analyze_unit(&unit, &EngagementConfig::default());
        assert_eq!(report.advance_range, 8);
        assert_eq!(report.charge_range, 16);
        assert!(report.to_string().contains("Rifle"));
    }
}
