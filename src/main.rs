//! Cragline entry point
//!
//! Headless demo loop: runs a seeded session with a simple autopilot feeding
//! pointer input, drains events, and prints the final run summary as JSON.
//! Useful for soak-testing the core without a renderer attached.
//!
//! Usage: `cragline [seed] [max_ticks]`

use cragline::consts::*;
use cragline::sim::{GameEvent, GameState, Rope};
use cragline::{Phase, Records};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC1_1FF);
    // Default: three simulated minutes
    let max_ticks: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3 * 60 * 60);

    let mut state = GameState::new(seed);
    let mut records = Records::new();

    for tick in 0..max_ticks {
        autopilot(&mut state, tick);
        state.update(SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::CoinCollected { value, combo, .. } => {
                    log::debug!("coin +{value} (combo {combo})")
                }
                GameEvent::CheckpointReached { bonus, .. } => log::info!("checkpoint +{bonus}"),
                GameEvent::HeightRecord { height } => log::trace!("height {height:.0}"),
                GameEvent::WeatherChanged { kind } => log::info!("weather: {kind:?}"),
                GameEvent::RopeAttached { .. } | GameEvent::RopeMissed => {}
                GameEvent::GameOver { summary } => {
                    records.record(&summary);
                    log::info!("run over after {:.1}s simulated", summary.duration);
                }
            }
        }

        if state.phase == Phase::GameOver {
            break;
        }
    }

    let summary = state.run_summary();
    log::info!(
        "final: height {:.0}, {} coins banked, best combo {}",
        summary.height,
        summary.coins_banked,
        summary.best_combo
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("summary serializes")
    );
}

/// Minimal autopilot in the spirit of an idle/demo mode: while idle,
/// periodically tap at a point up and across to throw, alternating sides for
/// a zig-zag climb; while swinging, let go on upward momentum.
fn autopilot(state: &mut GameState, tick: u64) {
    match state.rope {
        Rope::Idle => {
            if tick % 30 == 0 {
                let side = if (tick / 30) % 2 == 0 { -90.0 } else { 90.0 };
                let x = VIEW_WIDTH / 2.0 + side;
                let y = VIEW_HEIGHT * 0.2;
                state.pointer_down(x, y);
                state.pointer_up(x, y);
            }
        }
        Rope::Attached { .. } => {
            if state.player.vel.y < -140.0 && tick % 7 == 0 {
                let x = VIEW_WIDTH / 2.0;
                state.pointer_down(x, 0.0);
                state.pointer_up(x, 0.0);
            }
        }
        Rope::Throwing { .. } => {}
    }
}
