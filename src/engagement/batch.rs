//! Monte Carlo batches of seeded engagements
//!
//! Run `i` of a batch uses seed `base_seed + i`, so a batch is reproducible
//! and any single run can be replayed on its own.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::EngagementConfig;
use crate::dice::SeededDice;
use crate::engagement::events::UnitSide;
use crate::engagement::execution::{simulate, EngagementSetup};

/// Aggregate statistics over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: u32,
    pub a_wins: u32,
    pub b_wins: u32,
    /// Both sides standing (or both wiped out) at the end
    pub draws: u32,
    pub mean_surviving_a: f64,
    pub mean_surviving_b: f64,
    pub mean_turns: f64,
}

impl BatchSummary {
    pub fn win_rate(&self, side: UnitSide) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        let wins = match side {
            UnitSide::A => self.a_wins,
            UnitSide::B => self.b_wins,
        };
        f64::from(wins) / f64::from(self.runs)
    }
}

/// Run `runs` engagements in parallel
pub fn run_batch(
    setup: &EngagementSetup<'_>,
    config: &EngagementConfig,
    base_seed: u64,
    runs: u32,
) -> BatchSummary {
    let outcomes: Vec<(Option<UnitSide>, u32, u32, u32)> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut dice = SeededDice::new(base_seed.wrapping_add(u64::from(i)));
            let result = simulate(setup, config, &mut dice);
            (
                result.winner(),
                result.surviving_a,
                result.surviving_b,
                result.turns_elapsed,
            )
        })
        .collect();

    let mut summary = BatchSummary {
        runs,
        ..Default::default()
    };
    if runs == 0 {
        return summary;
    }

    let (mut total_a, mut total_b, mut total_turns) = (0u64, 0u64, 0u64);
    for (winner, surviving_a, surviving_b, turns) in outcomes {
        match winner {
            Some(UnitSide::A) => summary.a_wins += 1,
            Some(UnitSide::B) => summary.b_wins += 1,
            None => summary.draws += 1,
        }
        total_a += u64::from(surviving_a);
        total_b += u64::from(surviving_b);
        total_turns += u64::from(turns);
    }

    let n = f64::from(runs);
    summary.mean_surviving_a = total_a as f64 / n;
    summary.mean_surviving_b = total_b as f64 / n;
    summary.mean_turns = total_turns as f64 / n;

    tracing::info!(
        runs,
        a_wins = summary.a_wins,
        b_wins = summary.b_wins,
        draws = summary.draws,
        "batch complete"
    );
    summary
}
