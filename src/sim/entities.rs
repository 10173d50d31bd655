//! Collectible entities: coins and checkpoints
//!
//! Both generators draw from a Pcg32 stream derived from (world seed, index),
//! so placement is reproducible chunk by chunk.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::walls_at_row;
use crate::consts::*;

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Stable across chunk regeneration: (chunk index, slot)
    pub id: u64,
    pub pos: Vec2,
    pub radius: f32,
    pub value: u64,
    pub rare: bool,
    /// One-way latch
    pub collected: bool,
    /// Bobbing animation offset for the renderer
    pub phase: f32,
}

/// A run checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// One-way latch
    pub reached: bool,
    pub phase: f32,
}

/// Derive an independent RNG stream for (seed, tag, index)
fn stream_seed(seed: u64, tag: u64, index: u64) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(tag)
        .wrapping_mul(0x2545_F491_4F6C_DD1D)
        .wrapping_add(index)
}

const COIN_STREAM: u64 = 0xC01;
const CHECKPOINT_STREAM: u64 = 0xCCC;

/// Generate the coins for chunk `index`. Each `COIN_BAND_HEIGHT` band drops
/// either a horizontal line of 3-7 coins or a scattered cluster; a fixed
/// fraction come up rare.
pub fn coins_for_chunk(seed: u64, index: u32) -> Vec<Coin> {
    let mut rng = Pcg32::seed_from_u64(stream_seed(seed, COIN_STREAM, index as u64));
    let mut coins = Vec::new();
    let top = -((index + 1) as f32) * CHUNK_HEIGHT;
    let bands = (CHUNK_HEIGHT / COIN_BAND_HEIGHT) as u32;
    let mut slot: u64 = 0;

    for band in 0..bands {
        let band_top = top + band as f32 * COIN_BAND_HEIGHT;
        let band_mid = band_top + COIN_BAND_HEIGHT * 0.5;
        // Leave the start platform clear
        if band_mid > -ROW_STEP {
            continue;
        }

        let row = (-band_mid / ROW_STEP) as u32;
        let (left, right) = walls_at_row(seed, row);

        let push = |coins: &mut Vec<Coin>, pos: Vec2, rng: &mut Pcg32, slot: &mut u64| {
            let rare = rng.random::<f32>() < RARE_COIN_CHANCE;
            coins.push(Coin {
                id: ((index as u64) << 16) | *slot,
                pos,
                radius: COIN_RADIUS,
                value: if rare { RARE_COIN_VALUE } else { COIN_VALUE },
                rare,
                collected: false,
                phase: rng.random_range(0.0..std::f32::consts::TAU),
            });
            *slot += 1;
        };

        if rng.random_bool(0.6) {
            // Horizontal line of 3-7 coins
            let count = rng.random_range(3..=7u32);
            let spacing = 26.0;
            let span = right - left - 40.0 - spacing * (count - 1) as f32;
            if span <= 0.0 {
                continue;
            }
            let base_x = left + 20.0 + rng.random_range(0.0..span);
            let y = band_mid + rng.random_range(-20.0..20.0);
            for i in 0..count {
                push(
                    &mut coins,
                    Vec2::new(base_x + i as f32 * spacing, y),
                    &mut rng,
                    &mut slot,
                );
            }
        } else {
            // Scattered cluster
            let count = rng.random_range(3..=6u32);
            for _ in 0..count {
                let x = rng.random_range(left + 20.0..right - 20.0);
                let y = band_top + rng.random_range(8.0..COIN_BAND_HEIGHT - 8.0);
                push(&mut coins, Vec2::new(x, y), &mut rng, &mut slot);
            }
        }
    }

    coins
}

/// Checkpoint placement: one per growing vertical interval, kept strictly
/// between the local walls so none embed in rock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoints {
    seed: u64,
    pub items: Vec<Checkpoint>,
    next_index: u32,
    next_y: f32,
}

impl Checkpoints {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            items: Vec::new(),
            next_index: 0,
            next_y: -CHECKPOINT_BASE_SPACING,
        }
    }

    /// Place checkpoints down to the terrain frontier
    pub fn generate_to(&mut self, frontier_y: f32, walls: impl Fn(f32) -> (f32, f32)) {
        while self.next_y >= frontier_y {
            let mut rng = Pcg32::seed_from_u64(stream_seed(
                self.seed,
                CHECKPOINT_STREAM,
                self.next_index as u64,
            ));
            let (left, right) = walls(self.next_y);
            let lo = left + CHECKPOINT_WALL_MARGIN;
            let hi = right - CHECKPOINT_WALL_MARGIN;
            let x = if hi > lo {
                rng.random_range(lo..hi)
            } else {
                (left + right) * 0.5
            };

            self.items.push(Checkpoint {
                id: self.next_index,
                pos: Vec2::new(x, self.next_y),
                radius: CHECKPOINT_RADIUS,
                reached: false,
                phase: rng.random_range(0.0..std::f32::consts::TAU),
            });

            let spacing = (CHECKPOINT_BASE_SPACING
                + self.next_index as f32 * CHECKPOINT_SPACING_GROWTH)
                .min(CHECKPOINT_MAX_SPACING);
            self.next_y -= spacing;
            self.next_index += 1;
        }
    }

    /// Checkpoints within `[min_y, max_y]`
    pub fn in_range(&self, min_y: f32, max_y: f32) -> impl Iterator<Item = &Checkpoint> {
        self.items
            .iter()
            .filter(move |c| c.pos.y >= min_y && c.pos.y <= max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coins_deterministic() {
        let a = coins_for_chunk(42, 2);
        let b = coins_for_chunk(42, 2);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_coin_ids_unique_and_chunk_scoped() {
        let coins = coins_for_chunk(9, 5);
        let mut ids: Vec<_> = coins.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), coins.len());
        for id in ids {
            assert_eq!(id >> 16, 5);
        }
    }

    #[test]
    fn test_rare_fraction_sane() {
        let mut total = 0usize;
        let mut rare = 0usize;
        for index in 0..200 {
            for coin in coins_for_chunk(77, index) {
                total += 1;
                if coin.rare {
                    rare += 1;
                    assert_eq!(coin.value, RARE_COIN_VALUE);
                } else {
                    assert_eq!(coin.value, COIN_VALUE);
                }
            }
        }
        let fraction = rare as f32 / total as f32;
        assert!(fraction > 0.02 && fraction < 0.2, "rare fraction {fraction}");
    }

    #[test]
    fn test_checkpoint_spacing_grows_to_cap() {
        let mut cps = Checkpoints::new(3);
        cps.generate_to(-40_000.0, |_| (40.0, 440.0));
        assert!(cps.items.len() > 20);

        let mut last_gap = 0.0;
        for pair in cps.items.windows(2) {
            let gap = pair[0].pos.y - pair[1].pos.y;
            assert!(gap >= last_gap - 1e-3, "spacing never shrinks");
            assert!(gap <= CHECKPOINT_MAX_SPACING + 1e-3);
            last_gap = gap;
        }
        assert!((cps.items[0].pos.y - -CHECKPOINT_BASE_SPACING).abs() < 1e-3);
    }

    #[test]
    fn test_checkpoints_idempotent() {
        let mut a = Checkpoints::new(11);
        a.generate_to(-5000.0, |_| (40.0, 440.0));
        let count = a.items.len();
        // Re-running with the same frontier adds nothing
        a.generate_to(-5000.0, |_| (40.0, 440.0));
        assert_eq!(a.items.len(), count);
    }

    proptest! {
        #[test]
        fn prop_checkpoints_between_walls(seed in any::<u64>()) {
            let mut cps = Checkpoints::new(seed);
            let walls = |_y: f32| (60.0f32, 420.0f32);
            cps.generate_to(-10_000.0, walls);
            for cp in &cps.items {
                prop_assert!(cp.pos.x > 60.0 + CHECKPOINT_WALL_MARGIN - 1e-3);
                prop_assert!(cp.pos.x < 420.0 - CHECKPOINT_WALL_MARGIN + 1e-3);
            }
        }
    }
}
