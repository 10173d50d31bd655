//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded generation only, no wall-clock time
//! - Chunk content is a pure function of (seed, index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entities;
pub mod events;
pub mod rope;
pub mod state;
pub mod stats;
pub mod terrain;
pub mod tick;
pub mod weather;

pub use entities::{Checkpoint, Checkpoints, Coin};
pub use events::GameEvent;
pub use rope::Rope;
pub use state::{AimPreview, GameState, Phase, Player, Side};
pub use stats::{PlayerStats, Upgrade, UpgradeInfo, UpgradeRarity, CATALOG};
pub use terrain::{Terrain, TerrainKind, TerrainPoint};
pub use tick::combo_multiplier;
pub use weather::{Weather, WeatherKind};
