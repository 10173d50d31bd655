//! Lifetime records across runs
//!
//! The core produces a `RunSummary` at the end of each run; a persistence
//! collaborator folds it into `Records` and snapshots that wherever it likes.
//! No storage I/O happens here.

use serde::{Deserialize, Serialize};

/// The raw numbers one finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Peak height climbed (world units above the start)
    pub height: f32,
    /// Currency banked this run (coin values with multipliers applied)
    pub coins_banked: u64,
    /// Number of coins picked up
    pub coins_collected: u32,
    pub checkpoints_reached: u32,
    pub best_combo: u32,
    /// Simulated seconds the run lasted
    pub duration: f64,
}

/// Aggregated lifetime records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Records {
    pub best_height: f32,
    pub lifetime_coins: u64,
    pub checkpoints_reached: u64,
    pub games_played: u32,
    pub best_combo: u32,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished run in. Returns true when the run set a height record.
    pub fn record(&mut self, summary: &RunSummary) -> bool {
        self.games_played += 1;
        self.lifetime_coins += summary.coins_banked;
        self.checkpoints_reached += summary.checkpoints_reached as u64;
        self.best_combo = self.best_combo.max(summary.best_combo);

        let new_best = summary.height > self.best_height;
        if new_best {
            self.best_height = summary.height;
        }
        new_best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(height: f32, coins: u64, combo: u32) -> RunSummary {
        RunSummary {
            height,
            coins_banked: coins,
            coins_collected: coins as u32,
            checkpoints_reached: 2,
            best_combo: combo,
            duration: 60.0,
        }
    }

    #[test]
    fn test_record_aggregates() {
        let mut records = Records::new();
        assert!(records.record(&summary(1200.0, 30, 6)));
        assert!(!records.record(&summary(800.0, 10, 9)));

        assert_eq!(records.games_played, 2);
        assert_eq!(records.lifetime_coins, 40);
        assert_eq!(records.checkpoints_reached, 4);
        assert_eq!(records.best_combo, 9);
        assert_eq!(records.best_height, 1200.0);
    }

    #[test]
    fn test_best_height_only_increases() {
        let mut records = Records::new();
        records.record(&summary(500.0, 0, 0));
        records.record(&summary(499.0, 0, 0));
        assert_eq!(records.best_height, 500.0);
        assert!(records.record(&summary(500.5, 0, 0)));
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut records = Records::new();
        records.record(&summary(321.0, 7, 3));
        let json = serde_json::to_string(&records).unwrap();
        let back: Records = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }
}
