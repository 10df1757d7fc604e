//! Skirmish Sim - two-unit tabletop engagement simulator
//!
//! Parse stat blocks, report static odds, and play out seeded engagements
//! between two units.

pub mod ai;
pub mod analysis;
pub mod combat;
pub mod core;
pub mod dice;
pub mod engagement;
pub mod parser;
pub mod unit;
