//! Cragline - an endless grappling-rope mountain climber
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain generation, rope physics,
//!   collisions, scoring)
//! - `records`: Lifetime records aggregated across runs
//!
//! Rendering, audio and storage belong to host collaborators. The core
//! consumes buffered pointer input and exposes viewport queries plus an
//! outbound event queue drained after each `update` call.

pub mod records;
pub mod sim;

pub use records::{Records, RunSummary};
pub use sim::{GameEvent, GameState, Phase};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed demo/test timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest dt accepted by `update` (prevents spiral of death)
    pub const MAX_DT: f32 = 0.1;

    /// Viewport the core assumes for screen/world conversion
    pub const VIEW_WIDTH: f32 = 480.0;
    pub const VIEW_HEIGHT: f32 = 800.0;

    /// World-bottom reference; height climbed = `WORLD_BOTTOM - player.y`
    pub const WORLD_BOTTOM: f32 = 0.0;
    /// Falling this far below the bottom ends the run
    pub const DEATH_MARGIN: f32 = 300.0;
    /// Seconds between death and the game-over event
    pub const DEATH_DELAY: f32 = 0.9;

    /// Gravity (world units / s², +y is down)
    pub const GRAVITY: f32 = 900.0;
    /// Absolute cap on downward speed
    pub const MAX_FALL_SPEED: f32 = 700.0;
    /// Base overall speed cap, scaled by the speed stat
    pub const BASE_MAX_SPEED: f32 = 820.0;
    pub const PLAYER_RADIUS: f32 = 12.0;
    /// Grace window after leaving ground (seconds)
    pub const COYOTE_TIME: f32 = 0.12;

    /// Terrain rows are sampled every `ROW_STEP` units of descent
    pub const ROW_STEP: f32 = 30.0;
    /// Rows per generation chunk
    pub const CHUNK_ROWS: u32 = 11;
    /// Vertical extent of one chunk
    pub const CHUNK_HEIGHT: f32 = ROW_STEP * CHUNK_ROWS as f32;
    pub const CORRIDOR_CENTER: f32 = VIEW_WIDTH / 2.0;
    /// Corridor half-width at the bottom of the world
    pub const MAX_HALF_WIDTH: f32 = 208.0;
    /// Narrowest the corridor ever gets
    pub const MIN_HALF_WIDTH: f32 = 92.0;
    /// Half-width lost per unit of altitude (mountain taper)
    pub const WALL_TAPER: f32 = 0.0035;
    /// Per-row noise displacement of each wall
    pub const WALL_JITTER: f32 = 34.0;
    /// Walls never leave `[WALL_MARGIN, VIEW_WIDTH - WALL_MARGIN]`
    pub const WALL_MARGIN: f32 = 16.0;
    pub const LEDGE_CHANCE: f32 = 0.42;
    pub const ICY_LEDGE_CHANCE: f32 = 0.18;
    pub const ROCK_CHANCE: f32 = 0.26;
    pub const LEDGE_MIN_WIDTH: f32 = 64.0;
    pub const LEDGE_MAX_WIDTH: f32 = 150.0;
    pub const ROCK_RADIUS: f32 = 14.0;

    /// Generate ahead once the frontier is within this margin of the player
    pub const GENERATION_MARGIN: f32 = VIEW_HEIGHT * 1.5;
    /// Chunks whose top edge is this far below the camera are evicted
    pub const EVICTION_MARGIN: f32 = VIEW_HEIGHT * 2.0;

    /// Coin placement band height inside a chunk
    pub const COIN_BAND_HEIGHT: f32 = 110.0;
    pub const COIN_RADIUS: f32 = 7.0;
    pub const COIN_VALUE: u64 = 1;
    pub const RARE_COIN_VALUE: u64 = 5;
    pub const RARE_COIN_CHANCE: f32 = 0.08;
    pub const CHECKPOINT_RADIUS: f32 = 22.0;
    pub const CHECKPOINT_BASE_BONUS: u64 = 25;
    /// Vertical spacing of the first checkpoint interval
    pub const CHECKPOINT_BASE_SPACING: f32 = 650.0;
    /// Spacing growth per checkpoint placed
    pub const CHECKPOINT_SPACING_GROWTH: f32 = 25.0;
    pub const CHECKPOINT_MAX_SPACING: f32 = 1300.0;
    /// Checkpoints keep this distance from both walls
    pub const CHECKPOINT_WALL_MARGIN: f32 = 40.0;

    /// Base max rope length, scaled by the rope-length stat
    pub const BASE_ROPE_LENGTH: f32 = 260.0;
    /// Base anchor search radius, scaled by the hook-range stat
    pub const BASE_HOOK_RANGE: f32 = 330.0;
    /// Throw progress advanced per second (full throw in ~1/6 s)
    pub const THROW_RATE: f32 = 6.0;
    /// Height of the visual arc the rope tip follows mid-throw
    pub const THROW_ARC_HEIGHT: f32 = 36.0;
    /// Anchors may sit this far below the player (wall swings)
    pub const HOOK_DOWN_TOLERANCE: f32 = 24.0;
    /// Widened tolerance when the ghost-rope upgrade is active
    pub const GHOST_HOOK_DOWN_TOLERANCE: f32 = 120.0;
    /// Energy retained when the rope constraint clamps the player
    pub const ROPE_DAMPING: f32 = 0.98;
    /// Continuous radial-velocity bleed while attached (per second)
    pub const PENDULUM_BIAS: f32 = 2.5;
    /// Release once the player rises this far above the anchor
    pub const OVER_TOP_MARGIN: f32 = 6.0;
    /// Backswing stall: within this band of the anchor...
    pub const STALL_TOLERANCE: f32 = 10.0;
    /// ...and falling faster than this
    pub const STALL_FALL_SPEED: f32 = 60.0;
    /// Minimum upward speed granted on release (cloud-step upgrade)
    pub const CLOUD_STEP_LIFT: f32 = 240.0;
    /// Slingshot impulse on taut release (elastic-rope upgrade)
    pub const ELASTIC_IMPULSE: f32 = 260.0;
    /// Rope counts as taut above this fraction of its length
    pub const TAUT_FRACTION: f32 = 0.96;

    /// Horizontal pointer offset that saturates the steering force
    pub const STEER_RANGE: f32 = 160.0;
    pub const SWING_STEER_ACCEL: f32 = 540.0;
    pub const AIR_STEER_ACCEL: f32 = 260.0;

    /// Ledge catch band: this far above the surface...
    pub const LEDGE_SNAP_ABOVE: f32 = 4.0;
    /// ...to this far below it, while falling
    pub const LEDGE_SNAP_BELOW: f32 = 14.0;
    /// Horizontal forgiveness at ledge ends
    pub const LEDGE_END_MARGIN: f32 = 6.0;
    pub const LEDGE_RESTITUTION: f32 = 0.28;
    pub const WALL_RESTITUTION: f32 = 0.35;
    pub const ROCK_DAMPING: f32 = 0.4;
    /// Bounce speeds below this are zeroed
    pub const VELOCITY_FLOOR: f32 = 26.0;
    /// Ground friction decay rate (per second)
    pub const LEDGE_FRICTION: f32 = 9.0;
    /// Friction rate on icy (or rained-on) ledges
    pub const ICY_FRICTION: f32 = 1.6;
    /// Vertical tolerance band for wall-point collisions
    pub const WALL_BAND: f32 = ROW_STEP * 0.6;

    /// Base coin magnet radius, scaled by the magnet stat
    pub const BASE_MAGNET_RADIUS: f32 = 70.0;
    /// Peak magnet pull speed at contact range
    pub const MAGNET_PULL_SPEED: f32 = 430.0;
    /// Seconds without a pickup before the combo resets
    pub const COMBO_WINDOW: f32 = 4.0;
    /// Pickups per combo multiplier step
    pub const COMBO_STEP: u32 = 3;
    pub const COMBO_MULT_CAP: u32 = 5;

    /// Camera aims this far above the player
    pub const CAMERA_LEAD: f32 = 120.0;
    /// Exponential follow rate (per second)
    pub const CAMERA_SMOOTHING: f32 = 5.0;
    /// Extra world units around the viewport in visibility queries
    pub const VIEW_QUERY_MARGIN: f32 = 60.0;

    /// Weather spell duration range (seconds)
    pub const WEATHER_MIN_SPELL: f32 = 18.0;
    pub const WEATHER_MAX_SPELL: f32 = 45.0;
    /// Peak horizontal wind acceleration
    pub const MAX_WIND: f32 = 46.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move `from` toward `to` by at most `max_step`, without overshoot
#[inline]
pub fn move_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist < f32::EPSILON {
        to
    } else {
        from + delta * (max_step / dist)
    }
}

/// Framerate-independent exponential decay factor for a per-second rate
#[inline]
pub fn damp(rate: f32, dt: f32) -> f32 {
    (-rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(-4.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn test_move_toward_no_overshoot() {
        let p = move_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 3.0);
        assert!((p.x - 3.0).abs() < 1e-6);

        // Within range snaps exactly
        let p = move_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 3.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_damp_bounds() {
        let f = damp(9.0, 1.0 / 60.0);
        assert!(f > 0.0 && f < 1.0);
        // Higher rate decays harder
        assert!(damp(20.0, 0.016) < damp(5.0, 0.016));
    }
}
