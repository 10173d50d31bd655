//! Game state and core simulation types
//!
//! All state that must survive a snapshot lives here. Transient per-tick
//! plumbing (the event queue, buffered pointer input) is skipped during
//! serialization.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Checkpoint, Checkpoints, Coin};
use super::events::GameEvent;
use super::rope::{find_anchor, Rope};
use super::stats::{PlayerStats, Upgrade, UpgradeInfo};
use super::terrain::{Terrain, TerrainPoint};
use super::weather::Weather;
use crate::consts::*;
use crate::records::RunSummary;

/// Which wall the player is pressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The climber
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub grounded: bool,
    pub wall_touch: Option<Side>,
    /// Remaining coyote time (seconds); refreshed while grounded
    pub coyote: f32,
}

impl Player {
    /// Grounded, or within the coyote grace window
    pub fn effectively_grounded(&self) -> bool {
        self.grounded || self.coyote > 0.0
    }
}

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    Paused,
    /// Death animation window before the game-over event fires
    Dying { timer: f32 },
    GameOver,
}

/// Buffered pointer input, consumed at the next tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    /// Last known pointer position (screen coordinates)
    pub screen: Option<Vec2>,
    /// Finger/button currently down
    pub holding: bool,
    /// Unconsumed tap position (screen coordinates)
    pub tap: Option<Vec2>,
}

/// Aim-line data for the renderer during a pointer hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimPreview {
    pub from: Vec2,
    pub target: Vec2,
    /// The anchor a throw right now would pick
    pub anchor: Option<Vec2>,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: Phase,
    pub player: Player,
    pub stats: PlayerStats,
    pub rope: Rope,
    pub terrain: Terrain,
    pub checkpoints: Checkpoints,
    pub weather: Weather,
    /// Camera center in world coordinates
    pub camera: Vec2,
    /// Consecutive pickups inside the combo window
    pub combo: u32,
    /// Seconds since the last pickup
    pub combo_timer: f32,
    pub best_combo: u32,
    /// Currency banked this run
    pub coins_banked: u64,
    pub coins_collected: u32,
    pub checkpoints_reached: u32,
    /// Height record; only increases
    pub highest: f32,
    /// Simulated seconds elapsed
    pub time: f64,
    /// Metadata of every upgrade applied this session, in order
    pub upgrade_history: Vec<UpgradeInfo>,
    /// Latched coin ids; survives chunk eviction
    pub(crate) collected_coins: HashSet<u64>,
    /// Outbound events since the last drain
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
    /// Buffered pointer input
    #[serde(skip)]
    pub(crate) pointer: PointerState,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(seed: u64) -> Self {
        let stats = PlayerStats::default();
        let collected = HashSet::new();

        let mut terrain = Terrain::new(seed);
        terrain.generate_to(-2.0 * VIEW_HEIGHT, &collected);
        let mut checkpoints = Checkpoints::new(seed);
        checkpoints.generate_to(terrain.frontier_y(), |y| terrain.wall_bounds_at(y));

        let player = Player {
            pos: Vec2::new(CORRIDOR_CENTER, -stats.player_radius()),
            vel: Vec2::ZERO,
            radius: stats.player_radius(),
            grounded: true,
            wall_touch: None,
            coyote: COYOTE_TIME,
        };

        log::info!("new run, seed {seed}");
        Self {
            seed,
            phase: Phase::Running,
            camera: Vec2::new(CORRIDOR_CENTER, player.pos.y - CAMERA_LEAD),
            player,
            stats,
            rope: Rope::Idle,
            terrain,
            checkpoints,
            weather: Weather::new(seed),
            combo: 0,
            combo_timer: 0.0,
            best_combo: 0,
            coins_banked: 0,
            coins_collected: 0,
            checkpoints_reached: 0,
            // Spawn height; records only count climbing above it
            highest: WORLD_BOTTOM - player.pos.y,
            time: 0.0,
            upgrade_history: Vec::new(),
            collected_coins: collected,
            events: Vec::new(),
            pointer: PointerState::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Pause/unpause. Ignored once the run is over.
    pub fn set_paused(&mut self, paused: bool) {
        match (self.phase, paused) {
            (Phase::Running, true) => self.phase = Phase::Paused,
            (Phase::Paused, false) => self.phase = Phase::Running,
            _ => {}
        }
    }

    // --- Input (screen coordinates; buffered until the next tick) ---

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let p = Vec2::new(x, y);
        self.pointer.screen = Some(p);
        self.pointer.holding = true;
        self.pointer.tap = Some(p);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.screen = Some(Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.pointer.screen = Some(Vec2::new(x, y));
        self.pointer.holding = false;
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera + screen - Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.camera + Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0)
    }

    // --- Upgrades ---

    /// Apply an upgrade's pure stats transform and record its metadata
    pub fn apply_upgrade(&mut self, upgrade: &Upgrade) {
        self.stats = (upgrade.apply)(self.stats);
        self.player.radius = self.stats.player_radius();
        self.upgrade_history.push(UpgradeInfo::from(upgrade));
        log::info!("upgrade applied: {}", upgrade.name);
    }

    // --- Queries for the renderer ---

    /// World y-range the renderer cares about
    fn view_range(&self) -> (f32, f32) {
        (
            self.camera.y - VIEW_HEIGHT / 2.0 - VIEW_QUERY_MARGIN,
            self.camera.y + VIEW_HEIGHT / 2.0 + VIEW_QUERY_MARGIN,
        )
    }

    pub fn visible_terrain(&self) -> Vec<&TerrainPoint> {
        let (lo, hi) = self.view_range();
        self.terrain
            .points_in(lo, hi)
            .filter(|p| p.pos.y >= lo && p.pos.y <= hi)
            .collect()
    }

    /// Uncollected coins in view
    pub fn visible_coins(&self) -> Vec<&Coin> {
        let (lo, hi) = self.view_range();
        self.terrain
            .coins_in(lo, hi)
            .filter(|c| !c.collected && c.pos.y >= lo && c.pos.y <= hi)
            .collect()
    }

    pub fn visible_checkpoints(&self) -> Vec<&Checkpoint> {
        let (lo, hi) = self.view_range();
        self.checkpoints.in_range(lo, hi).collect()
    }

    /// Rope-tip position while a throw is in flight
    pub fn rope_tip(&self) -> Option<Vec2> {
        self.rope.tip()
    }

    /// Aim line and anchor preview during a pointer hold (idle rope only)
    pub fn aim_preview(&self) -> Option<AimPreview> {
        if !self.pointer.holding || !self.rope.is_idle() {
            return None;
        }
        let target = self.screen_to_world(self.pointer.screen?);
        let lo = self.player.pos.y - self.stats.hook_search_radius();
        let hi = self.player.pos.y + self.stats.hook_down_tolerance();
        let anchor = find_anchor(
            self.terrain.points_in(lo, hi),
            self.player.pos,
            target,
            &self.stats,
        );
        Some(AimPreview {
            from: self.player.pos,
            target,
            anchor,
        })
    }

    /// Height climbed above the start
    pub fn height(&self) -> f32 {
        WORLD_BOTTOM - self.player.pos.y
    }

    /// The numbers a persistence collaborator snapshots at run end
    pub fn run_summary(&self) -> RunSummary {
        RunSummary {
            height: self.highest,
            coins_banked: self.coins_banked,
            coins_collected: self.coins_collected,
            checkpoints_reached: self.checkpoints_reached,
            best_combo: self.best_combo,
            duration: self.time,
        }
    }

    // --- Events ---

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_starts_grounded_on_platform() {
        let state = GameState::new(1);
        assert!(state.is_running());
        assert!(state.player.grounded);
        assert_eq!(state.player.pos.x, CORRIDOR_CENTER);
        assert!(state.terrain.frontier_y() <= -2.0 * VIEW_HEIGHT);
    }

    #[test]
    fn test_pause_toggles_only_from_running() {
        let mut state = GameState::new(1);
        state.set_paused(true);
        assert_eq!(state.phase, Phase::Paused);
        state.set_paused(false);
        assert_eq!(state.phase, Phase::Running);

        state.phase = Phase::GameOver;
        state.set_paused(true);
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_screen_world_round_trip() {
        let state = GameState::new(2);
        let screen = Vec2::new(123.0, 456.0);
        let back = state.world_to_screen(state.screen_to_world(screen));
        assert!((back - screen).length() < 1e-4);
    }

    #[test]
    fn test_pointer_buffering() {
        let mut state = GameState::new(3);
        state.pointer_down(10.0, 20.0);
        assert!(state.pointer.holding);
        assert_eq!(state.pointer.tap, Some(Vec2::new(10.0, 20.0)));

        state.pointer_move(30.0, 40.0);
        assert_eq!(state.pointer.screen, Some(Vec2::new(30.0, 40.0)));
        // Moving does not create a new tap
        assert_eq!(state.pointer.tap, Some(Vec2::new(10.0, 20.0)));

        state.pointer_up(30.0, 40.0);
        assert!(!state.pointer.holding);
    }

    #[test]
    fn test_apply_upgrade_records_history() {
        use crate::sim::stats::CATALOG;
        let mut state = GameState::new(4);
        let before = state.stats.max_rope_length();
        let rope = CATALOG.iter().find(|u| u.name == "Longer Rope").unwrap();
        state.apply_upgrade(rope);
        assert!(state.stats.max_rope_length() > before);
        assert_eq!(state.upgrade_history.len(), 1);
        assert_eq!(state.upgrade_history[0].name, "Longer Rope");
    }

    #[test]
    fn test_aim_preview_requires_hold_and_idle_rope() {
        let mut state = GameState::new(5);
        assert!(state.aim_preview().is_none());

        state.pointer_down(VIEW_WIDTH / 2.0, 100.0);
        let preview = state.aim_preview().expect("holding with idle rope");
        assert_eq!(preview.from, state.player.pos);

        state.rope = Rope::Attached {
            anchor: Vec2::ZERO,
            length: 100.0,
            taut: false,
        };
        assert!(state.aim_preview().is_none());
    }

    #[test]
    fn test_visible_queries_stay_in_view_band() {
        let state = GameState::new(6);
        let lo = state.camera.y - VIEW_HEIGHT / 2.0 - VIEW_QUERY_MARGIN;
        let hi = state.camera.y + VIEW_HEIGHT / 2.0 + VIEW_QUERY_MARGIN;
        assert!(!state.visible_terrain().is_empty());
        for p in state.visible_terrain() {
            assert!(p.pos.y >= lo && p.pos.y <= hi);
        }
        for c in state.visible_coins() {
            assert!(!c.collected);
            assert!(c.pos.y >= lo && c.pos.y <= hi);
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let state = GameState::new(7);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, state.seed);
        assert_eq!(back.player.pos, state.player.pos);
        assert_eq!(back.terrain.frontier_y(), state.terrain.frontier_y());
    }
}
