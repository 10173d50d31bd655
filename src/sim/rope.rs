//! Rope/hook state machine and swing constraint
//!
//! `Idle -> Throwing -> Attached -> Idle`. The tagged variants make illegal
//! combinations (throwing and attached at once) unrepresentable. The length
//! recorded at attachment never grows afterwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::stats::PlayerStats;
use super::terrain::TerrainPoint;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rope {
    Idle,
    Throwing {
        /// 0..1, advanced at THROW_RATE per second
        progress: f32,
        from: Vec2,
        to: Vec2,
    },
    Attached {
        anchor: Vec2,
        /// Fixed at attachment: min(player-anchor distance, stats max)
        length: f32,
        taut: bool,
    },
}

impl Rope {
    pub fn is_idle(&self) -> bool {
        matches!(self, Rope::Idle)
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Rope::Attached { .. })
    }

    /// Rope-tip position mid-throw: lerp from hand to target plus an upward
    /// parabolic arc. Purely visual; queried by the renderer.
    pub fn tip(&self) -> Option<Vec2> {
        match *self {
            Rope::Throwing { progress, from, to } => {
                let p = progress.clamp(0.0, 1.0);
                let mut tip = from.lerp(to, p);
                tip.y -= (std::f32::consts::PI * p).sin() * THROW_ARC_HEIGHT;
                Some(tip)
            }
            _ => None,
        }
    }
}

/// Pick the anchor for a throw aimed at `target`: hookable points within the
/// stats-scaled search radius of the player, at or above the player (small
/// downward tolerance, widened by ghost rope), nearest to the aim point.
/// Returns None when nothing qualifies.
pub fn find_anchor<'a>(
    points: impl Iterator<Item = &'a TerrainPoint>,
    player_pos: Vec2,
    target: Vec2,
    stats: &PlayerStats,
) -> Option<Vec2> {
    let radius = stats.hook_search_radius();
    let down_tolerance = stats.hook_down_tolerance();

    let mut best: Option<(f32, Vec2)> = None;
    for point in points {
        if !point.hookable {
            continue;
        }
        if point.pos.y > player_pos.y + down_tolerance {
            continue;
        }
        if player_pos.distance(point.pos) > radius {
            continue;
        }
        let score = target.distance_squared(point.pos);
        if best.is_none_or(|(s, _)| score < s) {
            best = Some((score, point.pos));
        }
    }
    best.map(|(_, pos)| pos)
}

/// Advance a throw; on completion the rope attaches with its length fixed.
/// Returns the anchor if attachment happened this tick.
pub fn advance_throw(rope: &mut Rope, player_pos: Vec2, stats: &PlayerStats, dt: f32) -> Option<Vec2> {
    if let Rope::Throwing { progress, to, .. } = rope {
        *progress += THROW_RATE * dt;
        if *progress >= 1.0 {
            let anchor = *to;
            let length = player_pos.distance(anchor).min(stats.max_rope_length());
            *rope = Rope::Attached {
                anchor,
                length,
                taut: false,
            };
            return Some(anchor);
        }
    }
    None
}

/// Enforce the rope-length constraint and the pendulum bias correction.
///
/// When the player leaves the constraint circle they are clamped back onto
/// it, the outward radial velocity is removed and a small energy loss is
/// applied. The radial bleed runs continuously, not only at the clamp, which
/// keeps the swing visually smooth.
pub fn apply_constraint(rope: &mut Rope, pos: &mut Vec2, vel: &mut Vec2, dt: f32) {
    let Rope::Attached { anchor, length, taut } = rope else {
        return;
    };

    let to_player = *pos - *anchor;
    let dist = to_player.length();
    if dist < f32::EPSILON {
        // Degenerate: player on the anchor, nothing to constrain
        *taut = false;
        return;
    }
    let normal = to_player / dist;

    // Continuous pendulum bias: bleed a fraction of the radial component
    let radial = vel.dot(normal);
    *vel -= normal * radial * (PENDULUM_BIAS * dt).min(1.0);

    if dist > *length {
        *pos = *anchor + normal * *length;
        let outward = vel.dot(normal);
        if outward > 0.0 {
            *vel -= normal * outward;
            *vel *= ROPE_DAMPING;
        }
    }
    *taut = pos.distance(*anchor) >= *length * TAUT_FRACTION;
}

/// Automatic release conditions: swinging over the top of the anchor, or
/// stalling on the backswing (at/above the anchor while falling hard).
pub fn should_auto_release(rope: &Rope, pos: Vec2, vel: Vec2) -> bool {
    let Rope::Attached { anchor, taut, .. } = rope else {
        return false;
    };
    let over_top = pos.y < anchor.y - OVER_TOP_MARGIN && vel.y < 0.0;
    let stalled = *taut && pos.y < anchor.y + STALL_TOLERANCE && vel.y > STALL_FALL_SPEED;
    over_top || stalled
}

/// Detach the rope, applying upgrade-gated release bonuses.
pub fn release(rope: &mut Rope, pos: Vec2, vel: &mut Vec2, stats: &PlayerStats) {
    if let Rope::Attached { anchor, taut, .. } = *rope {
        if stats.elastic_rope && taut {
            let toward_anchor = (anchor - pos).normalize_or_zero();
            *vel += toward_anchor * ELASTIC_IMPULSE;
        }
        if stats.cloud_step && vel.y > -CLOUD_STEP_LIFT {
            vel.y = -CLOUD_STEP_LIFT;
        }
    }
    *rope = Rope::Idle;
}
