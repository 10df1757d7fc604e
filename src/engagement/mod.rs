//! Engagements - two units fighting it out over a few turns

pub mod batch;
pub mod events;
pub mod execution;
pub mod selection;

pub use batch::{run_batch, BatchSummary};
pub use events::{EngagementEvent, EngagementEventKind, EngagementLog, UnitSide};
pub use execution::{simulate, Engagement, EngagementResult, EngagementSetup};
pub use selection::select_pair;
