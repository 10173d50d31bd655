//! Player stats and upgrades
//!
//! Stats are a multiplier bag read by the physics/rope/scoring code. Upgrades
//! are pure transforms `fn(PlayerStats) -> PlayerStats`; the game records the
//! metadata of every applied upgrade but never interprets rarity or color.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Multipliers and feature flags granted by upgrades. Never reset mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Max rope length multiplier
    pub rope_length: f32,
    /// Steering strength while swinging
    pub swing_power: f32,
    /// Coin magnet radius multiplier
    pub magnet_radius: f32,
    /// Coin value multiplier
    pub coin_multiplier: f32,
    /// Steering strength in the air
    pub air_control: f32,
    /// Scales landing restitution; lower is softer
    pub fall_resistance: f32,
    /// Anchor search radius multiplier
    pub hook_range: f32,
    /// Overall speed cap multiplier
    pub speed: f32,
    /// Flat bonus added to every checkpoint award
    pub checkpoint_bonus: u64,
    /// Added to the combo multiplier from the first pickup
    pub combo_start_bonus: u32,
    /// Anchor search tolerates anchors well below the player
    pub ghost_rope: bool,
    /// Minimum upward velocity on rope release
    pub cloud_step: bool,
    /// Slingshot impulse on taut release
    pub elastic_rope: bool,
    /// Player collision radius multiplier
    pub player_scale: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            rope_length: 1.0,
            swing_power: 1.0,
            magnet_radius: 1.0,
            coin_multiplier: 1.0,
            air_control: 1.0,
            fall_resistance: 1.0,
            hook_range: 1.0,
            speed: 1.0,
            checkpoint_bonus: 0,
            combo_start_bonus: 0,
            ghost_rope: false,
            cloud_step: false,
            elastic_rope: false,
            player_scale: 1.0,
        }
    }
}

impl PlayerStats {
    pub fn max_rope_length(&self) -> f32 {
        BASE_ROPE_LENGTH * self.rope_length
    }

    pub fn hook_search_radius(&self) -> f32 {
        BASE_HOOK_RANGE * self.hook_range
    }

    pub fn magnet_range(&self) -> f32 {
        BASE_MAGNET_RADIUS * self.magnet_radius
    }

    pub fn speed_cap(&self) -> f32 {
        BASE_MAX_SPEED * self.speed
    }

    pub fn hook_down_tolerance(&self) -> f32 {
        if self.ghost_rope {
            GHOST_HOOK_DOWN_TOLERANCE
        } else {
            HOOK_DOWN_TOLERANCE
        }
    }

    pub fn player_radius(&self) -> f32 {
        PLAYER_RADIUS * self.player_scale
    }
}

/// Display rarity; recorded, never interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeRarity {
    Common,
    Rare,
    Epic,
}

/// An upgrade card: a pure stats transform plus display metadata
#[derive(Debug, Clone, Copy)]
pub struct Upgrade {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub rarity: UpgradeRarity,
    pub apply: fn(PlayerStats) -> PlayerStats,
}

/// Metadata snapshot kept in the session upgrade history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeInfo {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub rarity: UpgradeRarity,
}

impl From<&Upgrade> for UpgradeInfo {
    fn from(upgrade: &Upgrade) -> Self {
        Self {
            name: upgrade.name.to_string(),
            icon: upgrade.icon.to_string(),
            color: upgrade.color.to_string(),
            rarity: upgrade.rarity,
        }
    }
}

/// The standard upgrade deck a picker UI draws cards from
pub const CATALOG: &[Upgrade] = &[
    Upgrade {
        name: "Longer Rope",
        icon: "rope",
        color: "#c9a227",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            rope_length: s.rope_length * 1.2,
            ..s
        },
    },
    Upgrade {
        name: "Strong Arms",
        icon: "arm",
        color: "#d8632f",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            swing_power: s.swing_power * 1.2,
            ..s
        },
    },
    Upgrade {
        name: "Coin Magnet",
        icon: "magnet",
        color: "#4f8edc",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            magnet_radius: s.magnet_radius * 1.4,
            ..s
        },
    },
    Upgrade {
        name: "Golden Touch",
        icon: "coin",
        color: "#e8c547",
        rarity: UpgradeRarity::Rare,
        apply: |s| PlayerStats {
            coin_multiplier: s.coin_multiplier * 1.25,
            ..s
        },
    },
    Upgrade {
        name: "Feather Fall",
        icon: "feather",
        color: "#9ad1c8",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            fall_resistance: s.fall_resistance * 0.7,
            ..s
        },
    },
    Upgrade {
        name: "Air Brakes",
        icon: "wing",
        color: "#8fa3bf",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            air_control: s.air_control * 1.3,
            ..s
        },
    },
    Upgrade {
        name: "Eagle Eye",
        icon: "eye",
        color: "#b07bd1",
        rarity: UpgradeRarity::Rare,
        apply: |s| PlayerStats {
            hook_range: s.hook_range * 1.25,
            ..s
        },
    },
    Upgrade {
        name: "Surveyor",
        icon: "flag",
        color: "#6fbf62",
        rarity: UpgradeRarity::Common,
        apply: |s| PlayerStats {
            checkpoint_bonus: s.checkpoint_bonus + 25,
            ..s
        },
    },
    Upgrade {
        name: "Head Start",
        icon: "spark",
        color: "#e08fae",
        rarity: UpgradeRarity::Rare,
        apply: |s| PlayerStats {
            combo_start_bonus: s.combo_start_bonus + 1,
            ..s
        },
    },
    Upgrade {
        name: "Ghost Rope",
        icon: "ghost",
        color: "#d5d9e0",
        rarity: UpgradeRarity::Epic,
        apply: |s| PlayerStats {
            ghost_rope: true,
            ..s
        },
    },
    Upgrade {
        name: "Cloud Step",
        icon: "cloud",
        color: "#eef3f8",
        rarity: UpgradeRarity::Epic,
        apply: |s| PlayerStats {
            cloud_step: true,
            ..s
        },
    },
    Upgrade {
        name: "Elastic Rope",
        icon: "spring",
        color: "#f2b134",
        rarity: UpgradeRarity::Epic,
        apply: |s| PlayerStats {
            elastic_rope: true,
            ..s
        },
    },
    Upgrade {
        name: "Tiny Climber",
        icon: "shrink",
        color: "#86c5da",
        rarity: UpgradeRarity::Rare,
        apply: |s| PlayerStats {
            player_scale: s.player_scale * 0.85,
            ..s
        },
    },
];
