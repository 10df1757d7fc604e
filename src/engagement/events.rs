//! Narrative log of an engagement

use serde::{Deserialize, Serialize};

use crate::ai::TacticalAction;
use crate::combat::MoraleOutcome;

/// One of the two units in an engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitSide {
    A,
    B,
}

impl UnitSide {
    pub fn index(self) -> usize {
        match self {
            UnitSide::A => 0,
            UnitSide::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            UnitSide::A => UnitSide::B,
            UnitSide::B => UnitSide::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngagementEventKind {
    EngagementStarted,
    TurnStarted,
    Decision { action: TacticalAction },
    Recovered,
    Movement { distance: u32 },
    RangedFire { wounds: u32, killed: u32 },
    NoTarget,
    Melee { wounds_dealt: u32, wounds_taken: u32 },
    Morale { outcome: MoraleOutcome },
    Destroyed,
    EngagementEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub turn: u32,
    /// Unit the event is about, if any
    pub actor: Option<UnitSide>,
    pub kind: EngagementEventKind,
    pub description: String,
}

/// Ordered events of one engagement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementLog {
    pub events: Vec<EngagementEvent>,
}

impl EngagementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        turn: u32,
        actor: Option<UnitSide>,
        kind: EngagementEventKind,
        description: String,
    ) {
        tracing::debug!(turn, ?actor, "{}", description);
        self.events.push(EngagementEvent {
            turn,
            actor,
            kind,
            description,
        });
    }

    /// Events recorded during `turn`
    pub fn turn_events(&self, turn: u32) -> impl Iterator<Item = &EngagementEvent> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.description.clone()).collect()
    }
}
