//! Combat resolution - dice pipelines for shooting, melee and morale

pub mod melee;
pub mod morale;
pub mod ranged;
pub mod resolution;

pub use melee::{effective_quality, melee_exchange, MeleeResult};
pub use morale::{
    apply_morale, check_morale, melee_loser, MeleeSide, MoraleCheckResult, MoraleOutcome,
};
pub use ranged::{ranged_exchange, RangedResult};
pub use resolution::{resolve_hits, resolve_saves, resolve_wounds, HitResult, WoundResult};
