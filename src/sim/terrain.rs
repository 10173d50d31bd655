//! Deterministic chunked terrain generation
//!
//! The shaft is generated in fixed-height chunks keyed by integer index.
//! Chunk content is a pure function of (seed, index): walls, ledges and rock
//! protrusions all come from a seeded hash noise, so an evicted chunk
//! regenerates bit-identical when the player falls back down. The frontier
//! index only ever grows (frontier y only ever decreases).

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{coins_for_chunk, Coin};
use crate::consts::*;
use crate::lerp;

/// What a terrain point is, for collision and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    WallLeft,
    WallRight,
    Ledge,
    Rock,
}

/// A single generated terrain feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPoint {
    pub pos: Vec2,
    pub kind: TerrainKind,
    /// Valid rope anchor
    pub hookable: bool,
    /// Right end of a ledge span (ledges only)
    pub end_x: Option<f32>,
    /// Reduced friction, not hookable
    pub icy: bool,
}

impl TerrainPoint {
    fn wall(x: f32, y: f32, kind: TerrainKind) -> Self {
        Self {
            pos: Vec2::new(x, y),
            kind,
            hookable: true,
            end_x: None,
            icy: false,
        }
    }
}

/// One fixed-height band of generated terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainChunk {
    pub index: u32,
    pub points: Vec<TerrainPoint>,
    pub coins: Vec<Coin>,
}

/// Deterministic hash noise in [0, 1) for (seed, row, channel)
///
/// Rows are global (row k sits at y = -k * ROW_STEP), so every consumer of a
/// row sees the same values regardless of which chunk asked.
pub fn noise(seed: u64, row: u32, channel: u32) -> f32 {
    let mut h = seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(row as u64)
        .wrapping_mul(0x2545_F491_4F6C_DD1D)
        .wrapping_add(channel as u64 * 7919);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h % 1_000_000) as f32 / 1_000_000.0
}

/// Wall x-positions for a sampled row: corridor narrows with altitude, each
/// wall jittered inward by noise, clamped to screen-relative bounds.
pub fn walls_at_row(seed: u64, row: u32) -> (f32, f32) {
    let altitude = row as f32 * ROW_STEP;
    let base_half = (MAX_HALF_WIDTH - altitude * WALL_TAPER).max(MIN_HALF_WIDTH);

    let left = (CORRIDOR_CENTER - base_half + noise(seed, row, 0) * WALL_JITTER)
        .clamp(WALL_MARGIN, CORRIDOR_CENTER - MIN_HALF_WIDTH);
    let right = (CORRIDOR_CENTER + base_half - noise(seed, row, 1) * WALL_JITTER)
        .clamp(CORRIDOR_CENTER + MIN_HALF_WIDTH, VIEW_WIDTH - WALL_MARGIN);
    (left, right)
}

/// Chunk index containing world y (y <= 0; anything at/below the bottom is 0)
pub fn chunk_index_for(y: f32) -> u32 {
    if y >= 0.0 {
        0
    } else {
        (-y / CHUNK_HEIGHT) as u32
    }
}

/// Build chunk `index` from scratch. Pure: same (seed, index) in, same
/// geometry out.
pub fn build_chunk(seed: u64, index: u32) -> TerrainChunk {
    let mut points = Vec::new();

    for row in index * CHUNK_ROWS..(index + 1) * CHUNK_ROWS {
        let y = -(row as f32) * ROW_STEP;
        let (left, right) = walls_at_row(seed, row);

        points.push(TerrainPoint::wall(left, y, TerrainKind::WallLeft));
        points.push(TerrainPoint::wall(right, y, TerrainKind::WallRight));

        if row == 0 {
            // Guaranteed start platform spanning the corridor
            points.push(TerrainPoint {
                pos: Vec2::new(left + 8.0, y),
                kind: TerrainKind::Ledge,
                hookable: true,
                end_x: Some(right - 8.0),
                icy: false,
            });
            continue;
        }

        // Floating ledge
        if noise(seed, row, 2) < LEDGE_CHANCE {
            let width = lerp(LEDGE_MIN_WIDTH, LEDGE_MAX_WIDTH, noise(seed, row, 3));
            let span = right - left - width - 24.0;
            if span > 0.0 {
                let x = left + 12.0 + noise(seed, row, 4) * span;
                let icy = noise(seed, row, 5) < ICY_LEDGE_CHANCE;
                let ly = y - noise(seed, row, 6) * (ROW_STEP - 8.0);
                points.push(TerrainPoint {
                    pos: Vec2::new(x, ly),
                    kind: TerrainKind::Ledge,
                    hookable: !icy,
                    end_x: Some(x + width),
                    icy,
                });
            }
        }

        // Isolated hookable rock
        if noise(seed, row, 7) < ROCK_CHANCE {
            let span = right - left - 2.0 * ROCK_RADIUS - 16.0;
            if span > 0.0 {
                let x = left + ROCK_RADIUS + 8.0 + noise(seed, row, 8) * span;
                let ry = y - noise(seed, row, 9) * (ROW_STEP - 8.0);
                points.push(TerrainPoint {
                    pos: Vec2::new(x, ry),
                    kind: TerrainKind::Rock,
                    hookable: true,
                    end_x: None,
                    icy: false,
                });
            }
        }
    }

    let coins = coins_for_chunk(seed, index);
    TerrainChunk {
        index,
        points,
        coins,
    }
}

/// The chunked terrain store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    seed: u64,
    chunks: BTreeMap<u32, TerrainChunk>,
    /// Number of chunks ever generated; only grows
    frontier_index: u32,
}

impl Terrain {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            chunks: BTreeMap::new(),
            frontier_index: 0,
        }
    }

    /// Lowest y terrain has been generated to (monotonically decreasing)
    pub fn frontier_y(&self) -> f32 {
        -(self.frontier_index as f32) * CHUNK_HEIGHT
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Extend the frontier until it passes `y`. Latched coin ids in
    /// `collected` stay collected.
    pub fn generate_to(&mut self, y: f32, collected: &HashSet<u64>) {
        while self.frontier_y() > y {
            let index = self.frontier_index;
            self.materialize(index, collected);
            self.frontier_index += 1;
            log::debug!("terrain frontier -> chunk {index} (y {})", self.frontier_y());
        }
    }

    /// Regenerate any evicted chunks overlapping `[min_y, max_y]`. Never
    /// advances the frontier.
    pub fn ensure_range(&mut self, min_y: f32, max_y: f32, collected: &HashSet<u64>) {
        let lo = chunk_index_for(max_y);
        let hi = chunk_index_for(min_y).min(self.frontier_index.saturating_sub(1));
        for index in lo..=hi {
            if index < self.frontier_index && !self.chunks.contains_key(&index) {
                self.materialize(index, collected);
            }
        }
    }

    fn materialize(&mut self, index: u32, collected: &HashSet<u64>) {
        let mut chunk = build_chunk(self.seed, index);
        for coin in &mut chunk.coins {
            if collected.contains(&coin.id) {
                coin.collected = true;
            }
        }
        self.chunks.insert(index, chunk);
    }

    /// Drop chunks entirely below `camera_y + EVICTION_MARGIN`
    pub fn evict_below(&mut self, camera_y: f32) {
        let cutoff = camera_y + EVICTION_MARGIN;
        self.chunks
            .retain(|&index, _| -((index + 1) as f32) * CHUNK_HEIGHT <= cutoff);
    }

    /// Terrain points whose chunk overlaps `[min_y, max_y]`
    pub fn points_in(&self, min_y: f32, max_y: f32) -> impl Iterator<Item = &TerrainPoint> {
        let lo = chunk_index_for(max_y);
        let hi = chunk_index_for(min_y);
        self.chunks
            .range(lo..=hi)
            .flat_map(|(_, chunk)| chunk.points.iter())
    }

    /// Mutable access to coins whose chunk overlaps `[min_y, max_y]`
    pub fn coins_in_mut(&mut self, min_y: f32, max_y: f32) -> impl Iterator<Item = &mut Coin> {
        let lo = chunk_index_for(max_y);
        let hi = chunk_index_for(min_y);
        self.chunks
            .range_mut(lo..=hi)
            .flat_map(|(_, chunk)| chunk.coins.iter_mut())
    }

    /// Coins whose chunk overlaps `[min_y, max_y]`
    pub fn coins_in(&self, min_y: f32, max_y: f32) -> impl Iterator<Item = &Coin> {
        let lo = chunk_index_for(max_y);
        let hi = chunk_index_for(min_y);
        self.chunks
            .range(lo..=hi)
            .flat_map(|(_, chunk)| chunk.coins.iter())
    }

    /// Interpolated wall bounds at an arbitrary y. Pure function of the seed,
    /// so it works even where chunks are evicted.
    pub fn wall_bounds_at(&self, y: f32) -> (f32, f32) {
        let exact = (-y / ROW_STEP).max(0.0);
        let row = exact as u32;
        let t = exact - row as f32;
        let (l0, r0) = walls_at_row(self.seed, row);
        let (l1, r1) = walls_at_row(self.seed, row + 1);
        (lerp(l0, l1, t), lerp(r0, r1, t))
    }
}
