//! Terrain collision resolution
//!
//! One pass over nearby terrain points, each resolved independently. Overlap
//! combinations resolve in iteration order, which can jitter for a frame but
//! never leaves the player inside terrain: every branch clamps to a surface.

use glam::Vec2;

use super::state::{Player, Side};
use super::stats::PlayerStats;
use super::terrain::{TerrainKind, TerrainPoint};
use crate::consts::*;
use crate::damp;

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve the player against a single terrain point
pub fn resolve_point(
    player: &mut Player,
    point: &TerrainPoint,
    stats: &PlayerStats,
    slippery: bool,
    dt: f32,
) {
    match point.kind {
        TerrainKind::Ledge => resolve_ledge(player, point, stats, slippery, dt),
        TerrainKind::WallLeft => resolve_wall(player, point, Side::Left, stats, slippery, dt),
        TerrainKind::WallRight => resolve_wall(player, point, Side::Right, stats, slippery, dt),
        TerrainKind::Rock => resolve_rock(player, point),
    }
}

/// Snap onto a horizontal surface: bounce with fall-resistance-scaled
/// restitution, zero tiny bounces, ground the player, apply friction.
fn land(player: &mut Player, surface_y: f32, stats: &PlayerStats, friction_rate: f32, dt: f32) {
    player.pos.y = surface_y - player.radius;
    let restitution = (LEDGE_RESTITUTION * stats.fall_resistance).min(0.9);
    player.vel.y = -player.vel.y * restitution;
    if player.vel.y.abs() < VELOCITY_FLOOR {
        player.vel.y = 0.0;
    }
    player.grounded = true;
    player.vel.x *= damp(friction_rate, dt);
}

fn resolve_ledge(
    player: &mut Player,
    point: &TerrainPoint,
    stats: &PlayerStats,
    slippery: bool,
    dt: f32,
) {
    let Some(end_x) = point.end_x else {
        return;
    };
    // Ledges only catch a falling player
    if player.vel.y < 0.0 {
        return;
    }
    if player.pos.x < point.pos.x - LEDGE_END_MARGIN || player.pos.x > end_x + LEDGE_END_MARGIN {
        return;
    }
    let foot = player.pos.y + player.radius;
    if foot >= point.pos.y - LEDGE_SNAP_ABOVE && foot <= point.pos.y + LEDGE_SNAP_BELOW {
        let rate = if point.icy || slippery {
            ICY_FRICTION
        } else {
            LEDGE_FRICTION
        };
        land(player, point.pos.y, stats, rate, dt);
    }
}

fn resolve_wall(
    player: &mut Player,
    point: &TerrainPoint,
    side: Side,
    stats: &PlayerStats,
    slippery: bool,
    dt: f32,
) {
    // Landing directly atop a wall point counts as ground
    if player.vel.y >= 0.0 && (player.pos.x - point.pos.x).abs() <= player.radius {
        let foot = player.pos.y + player.radius;
        if foot >= point.pos.y - LEDGE_SNAP_ABOVE && foot <= point.pos.y + LEDGE_SNAP_BELOW {
            let rate = if slippery { ICY_FRICTION } else { LEDGE_FRICTION };
            land(player, point.pos.y, stats, rate, dt);
            return;
        }
    }

    if (player.pos.y - point.pos.y).abs() > WALL_BAND {
        return;
    }
    match side {
        Side::Left => {
            if player.pos.x - player.radius < point.pos.x {
                player.pos.x = point.pos.x + player.radius;
                if player.vel.x < 0.0 {
                    player.vel.x = -player.vel.x * WALL_RESTITUTION;
                }
                player.wall_touch = Some(Side::Left);
            }
        }
        Side::Right => {
            if player.pos.x + player.radius > point.pos.x {
                player.pos.x = point.pos.x - player.radius;
                if player.vel.x > 0.0 {
                    player.vel.x = -player.vel.x * WALL_RESTITUTION;
                }
                player.wall_touch = Some(Side::Right);
            }
        }
    }
}

/// Circular push-out along the separating normal with heavy damping
fn resolve_rock(player: &mut Player, point: &TerrainPoint) {
    let delta = player.pos - point.pos;
    let dist = delta.length();
    let min_dist = player.radius + ROCK_RADIUS;
    if dist >= min_dist {
        return;
    }
    // Coincident centers fall back to pushing straight up
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::NEG_Y
    };
    player.pos = point.pos + normal * min_dist;
    if player.vel.dot(normal) < 0.0 {
        player.vel = reflect_velocity(player.vel, normal) * ROCK_DAMPING;
    }
}

/// Broad-phase wall bounds: re-clamp inside the interpolated corridor at the
/// player's y. Catches tunneling between sparse wall samples.
pub fn clamp_to_bounds(player: &mut Player, left: f32, right: f32) {
    if player.pos.x - player.radius < left {
        player.pos.x = left + player.radius;
        if player.vel.x < 0.0 {
            player.vel.x = -player.vel.x * WALL_RESTITUTION;
        }
        player.wall_touch = Some(Side::Left);
    } else if player.pos.x + player.radius > right {
        player.pos.x = right - player.radius;
        if player.vel.x > 0.0 {
            player.vel.x = -player.vel.x * WALL_RESTITUTION;
        }
        player.wall_touch = Some(Side::Right);
    }
}
