//! Skirmish Sim - Entry Point
//!
//! Loads a roster of stat blocks, optionally prints the static odds report,
//! then plays out one engagement (or a seeded batch) between two units.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use skirmish_sim::analysis::analyze_unit;
use skirmish_sim::core::{EngagementConfig, Result, SkirmishError};
use skirmish_sim::dice::SeededDice;
use skirmish_sim::engagement::{
    run_batch, select_pair, simulate, BatchSummary, EngagementResult, EngagementSetup, UnitSide,
};
use skirmish_sim::parser::load_roster;
use skirmish_sim::unit::UnitProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Two-unit skirmish engagement simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish_sim")]
#[command(about = "Simulate an engagement between two units from a stat-block roster")]
struct Args {
    /// Roster file of two-line stat blocks
    roster: PathBuf,

    /// First unit, by name or 0-based index (defaults to the first unit)
    #[arg(long)]
    unit_a: Option<String>,

    /// Second unit, by name or 0-based index (defaults to the second unit)
    #[arg(long)]
    unit_b: Option<String>,

    /// Starting distance in inches
    #[arg(long, default_value_t = 24)]
    distance: u32,

    /// Let the second unit activate first each turn
    #[arg(long)]
    defender_first: bool,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of engagements to run; more than 1 prints batch statistics
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// TOML file overriding engagement rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the static odds report for both units first
    #[arg(long)]
    analyze: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Report<'a> {
    Single {
        seed: u64,
        unit_a: &'a str,
        unit_b: &'a str,
        result: &'a EngagementResult,
    },
    Batch {
        seed: u64,
        unit_a: &'a str,
        unit_b: &'a str,
        summary: &'a BatchSummary,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skirmish_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngagementConfig::from_toml_file(path)?,
        None => EngagementConfig::default(),
    };

    let roster = load_roster(&args.roster)?;
    tracing::info!(units = roster.len(), path = ?args.roster, "roster loaded");

    let (unit_a, unit_b) =
        match select_pair(&roster, args.unit_a.as_deref(), args.unit_b.as_deref()) {
            Ok(pair) => pair,
            Err(notice @ SkirmishError::InsufficientUnits { .. }) => {
                tracing::warn!("{}", notice);
                println!("{}; no engagement simulated.", notice);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

    if args.analyze {
        for unit in [unit_a, unit_b] {
            let analysis = analyze_unit(unit, &config);
            match args.format {
                OutputFormat::Text => println!("{}", analysis),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
            }
        }
    }

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let setup = EngagementSetup {
        unit_a,
        unit_b,
        starting_distance: args.distance,
        attacker_first: !args.defender_first,
    };

    if args.runs > 1 {
        let summary = run_batch(&setup, &config, seed, args.runs);
        match args.format {
            OutputFormat::Text => print_batch(unit_a, unit_b, seed, &summary),
            OutputFormat::Json => {
                let report = Report::Batch {
                    seed,
                    unit_a: &unit_a.name,
                    unit_b: &unit_b.name,
                    summary: &summary,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        return Ok(());
    }

    let mut dice = SeededDice::new(seed);
    let result = simulate(&setup, &config, &mut dice);
    match args.format {
        OutputFormat::Text => print_engagement(unit_a, unit_b, seed, &result),
        OutputFormat::Json => {
            let report = Report::Single {
                seed,
                unit_a: &unit_a.name,
                unit_b: &unit_b.name,
                result: &result,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_engagement(a: &UnitProfile, b: &UnitProfile, seed: u64, result: &EngagementResult) {
    println!("=== {} vs {} (seed {}) ===", a.name, b.name, seed);
    for line in &result.log {
        println!("{}", line);
    }
    println!();
    println!("Turns:          {}", result.turns_elapsed);
    println!("Final distance: {}\"", result.final_distance);
    println!("{:<15} {}/{}", format!("{}:", a.name), result.surviving_a, a.models);
    println!("{:<15} {}/{}", format!("{}:", b.name), result.surviving_b, b.models);
    match result.winner() {
        Some(UnitSide::A) => println!("Winner: {}", a.name),
        Some(UnitSide::B) => println!("Winner: {}", b.name),
        None => println!("No decisive winner"),
    }
}

fn print_batch(a: &UnitProfile, b: &UnitProfile, seed: u64, summary: &BatchSummary) {
    println!(
        "=== {} vs {}: {} runs from seed {} ===",
        a.name, b.name, summary.runs, seed
    );
    println!(
        "{} wins: {} ({:.1}%)",
        a.name,
        summary.a_wins,
        summary.win_rate(UnitSide::A) * 100.0
    );
    println!(
        "{} wins: {} ({:.1}%)",
        b.name,
        summary.b_wins,
        summary.win_rate(UnitSide::B) * 100.0
    );
    println!("Draws: {}", summary.draws);
    println!(
        "Mean survivors: {} {:.2}/{}, {} {:.2}/{}",
        a.name, summary.mean_surviving_a, a.models, b.name, summary.mean_surviving_b, b.models
    );
    println!("Mean turns: {:.2}", summary.mean_turns);
}
