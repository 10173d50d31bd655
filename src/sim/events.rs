//! Outbound game events
//!
//! The core pushes typed events during `update`; the host drains them after
//! each call and feeds its UI/audio/persistence collaborators. Keeping the
//! queue typed makes event sequences unit-testable.

use serde::{Deserialize, Serialize};

use super::weather::WeatherKind;
use crate::records::RunSummary;

/// Everything the core reports to the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected {
        x: f32,
        y: f32,
        /// Final awarded value (base value, coin multiplier and combo applied)
        value: u64,
        combo: u32,
        multiplier: u32,
    },
    CheckpointReached {
        x: f32,
        y: f32,
        bonus: u64,
    },
    /// Fired on every tick the height record strictly increases
    HeightRecord {
        height: f32,
    },
    RopeAttached {
        x: f32,
        y: f32,
    },
    /// Throw attempt found no anchor; hosts typically play a small shake
    RopeMissed,
    WeatherChanged {
        kind: WeatherKind,
    },
    /// Fired exactly once, after the death delay
    GameOver {
        summary: RunSummary,
    },
}
