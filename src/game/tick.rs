//! Simulation Tick
//!
//! One call to [`tick`] advances the whole world by one frame:
//!
//! ```text
//!  InputFrame ──► tick ──► for slot in 0..capacity (ascending)
//!                   │        take object ─► SimContext ─► routine ─► restore
//!                   │
//!                   └──► sort events (tick, priority, slot) ──► TickResult
//! ```
//!
//! Everything here is deterministic: integer math only, fixed slot order,
//! no clocks. Two worlds fed the same inputs hash identically.

use serde::{Serialize, Deserialize};

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::FixedVec2;
use crate::game::context::{PositionHistory, SimContext, TickScratch};
use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, PlayerInputBuffer};
use crate::game::level::{LevelEnv, LevelId, LevelTransition};
use crate::game::player::run_player;
use crate::game::resources::SpriteResources;
use crate::game::state::{
    ObjectKind, ObjectState, ObjectTable, RenderDescriptor, OBJECT_SLOTS, PLAYER_SLOT,
};
use crate::game::terrain::TerrainSampler;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in processing order
    pub events: Vec<GameEvent>,
    /// Level change requested this tick
    pub transition: Option<LevelTransition>,
}

/// Simulation options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Restore normal speed constants when shoes expire even underwater
    pub legacy_shoes_restore: bool,
    /// Object table size
    pub object_slots: usize,
    /// Allow entering debug placement mode with B
    pub debug_cheat: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            legacy_shoes_restore: false,
            object_slots: OBJECT_SLOTS,
            debug_cheat: false,
        }
    }
}

impl SimConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let flag = |name: &str| {
            std::env::var(name)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false)
        };

        Self {
            legacy_shoes_restore: flag("HEDGEHOG_LEGACY_SHOES"),
            object_slots: std::env::var("HEDGEHOG_OBJECT_SLOTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > PLAYER_SLOT)
                .unwrap_or(OBJECT_SLOTS),
            debug_cheat: flag("HEDGEHOG_DEBUG_CHEAT"),
        }
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// Complete simulation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    /// Ticks simulated so far
    pub tick: u32,
    /// Object slots
    pub objects: ObjectTable,
    /// Level flags
    pub env: LevelEnv,
    /// Shared per-tick scratch
    pub scratch: TickScratch,
    /// Recent player positions
    pub history: PositionHistory,
}

impl World {
    /// Empty world for a level.
    pub fn new(level: LevelId, config: &SimConfig) -> Self {
        let mut env = LevelEnv::new(level);
        env.debug_cheat = config.debug_cheat;
        Self {
            tick: 0,
            objects: ObjectTable::new(config.object_slots),
            env,
            scratch: TickScratch::default(),
            history: PositionHistory::new(),
        }
    }

    /// Put a fresh player in the player slot.
    ///
    /// Hands the object back if the table has no player slot.
    pub fn spawn_player(&mut self, position: FixedVec2) -> Result<(), ObjectState> {
        self.objects
            .spawn_at(PLAYER_SLOT, ObjectState::player(position))
            .map(|_| ())
    }

    /// The player object, if spawned.
    pub fn player(&self) -> Option<&ObjectState> {
        self.objects.get(PLAYER_SLOT)
    }

    /// Tile bytes staged for an object since the last call.
    pub fn take_tile_upload(&mut self, slot: usize) -> Option<&[u8]> {
        self.objects
            .get_mut(slot)?
            .player_scratch_mut()?
            .gfx
            .take_changed()
    }

    /// What to draw this frame, in slot order.
    pub fn render_list(&self) -> Vec<RenderDescriptor> {
        self.objects
            .iter()
            .filter_map(|(_, obj)| obj.render_descriptor(self.env.camera))
            .collect()
    }

    /// Digest of everything that influences future ticks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |h| {
            h.update_u32(self.objects.capacity() as u32);
            for (slot, obj) in self.objects.iter() {
                h.update_u32(slot as u32);
                obj.hash_into(h);
            }

            self.env.hash_into(h);
            self.history.hash_into(h);
            h.update_u8(self.scratch.angle_buffer[0]);
            h.update_u8(self.scratch.angle_buffer[1]);
        })
    }
}

// =============================================================================
// TICK
// =============================================================================

/// Run one simulation tick.
///
/// Objects run in ascending slot order. The running object is lifted out of
/// the table, so it sees its own slot as empty and later objects see its
/// updated state.
pub fn tick(
    world: &mut World,
    input: InputFrame,
    terrain: &dyn TerrainSampler,
    resources: &SpriteResources,
    config: &SimConfig,
) -> TickResult {
    world.tick = world.tick.wrapping_add(1);
    let mut events = Vec::new();

    for slot in 0..world.objects.capacity() {
        let Some(mut obj) = world.objects.take(slot) else {
            continue;
        };

        let mut ctx = SimContext {
            tick: world.tick,
            slot,
            input,
            env: &mut world.env,
            terrain,
            resources,
            scratch: &mut world.scratch,
            history: &mut world.history,
            objects: &world.objects,
            config,
            events: &mut events,
        };
        match obj.kind {
            ObjectKind::Player => run_player(&mut obj, &mut ctx),
            // Platforms are moved by the level owner
            ObjectKind::Platform => {}
        }

        world.objects.restore(slot, obj);
    }

    // Stable: same (tick, priority, slot) keeps emission order
    events.sort();

    TickResult {
        events,
        transition: world.env.take_transition(),
    }
}

/// Replay a recording from `initial`.
///
/// Tick `n` of the run is fed the recording's frame for the world's tick
/// number at that point, so a recording captured live replays exactly.
pub fn replay(
    initial: World,
    recording: &PlayerInputBuffer,
    tick_count: u32,
    terrain: &dyn TerrainSampler,
    resources: &SpriteResources,
    config: &SimConfig,
) -> (World, Vec<GameEvent>) {
    let mut world = initial;
    let mut all_events = Vec::new();

    for _ in 0..tick_count {
        let input = recording.frame_at(world.tick.wrapping_add(1));
        let result = tick(&mut world, input, terrain, resources, config);
        all_events.extend(result.events);
    }

    (world, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::{DeathCause, GameEventData, SoundCue};
    use crate::game::input::{BUTTON_A, BUTTON_RIGHT};
    use crate::core::vec2::SpeedVec;
    use crate::game::level::{TransitionKind, Zone};
    use crate::game::physics::JUMP_SPEED;
    use crate::game::resources::PlayerAnim;
    use crate::game::state::{
        Routine, SpeedProfile, BALL_HEIGHT_RADIUS, BALL_SHIFT, BALL_WIDTH_RADIUS,
    };
    use crate::game::terrain::BlockTerrain;
    use crate::game::tiles::TileStreamer;
    use proptest::prelude::*;

    const REST_Y: i16 = 236;

    fn setup() -> (World, BlockTerrain, SpriteResources, SimConfig) {
        let config = SimConfig::default();
        let mut world = World::new(LevelId::new(Zone::GreenHill, 0), &config);
        world.spawn_player(FixedVec2::from_pixels(100, REST_Y)).unwrap();
        (world, BlockTerrain::flat(64, 32, 16), SpriteResources::builtin(), config)
    }

    fn scripted(t: u32) -> u8 {
        match t {
            10..=60 => BUTTON_RIGHT,
            61..=63 => BUTTON_RIGHT | BUTTON_A,
            90..=95 => BUTTON_A,
            _ => 0,
        }
    }

    #[test]
    fn test_first_tick_initializes_and_stages_tiles() {
        let (mut world, terrain, resources, config) = setup();
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);

        assert_eq!(world.tick, 1);
        assert_eq!(world.player().unwrap().routine, Routine::Control);
        assert!(world.take_tile_upload(PLAYER_SLOT).is_some());
        assert!(world.take_tile_upload(PLAYER_SLOT).is_none());
        assert!(world.take_tile_upload(5).is_none());
    }

    #[test]
    fn test_at_rest_stays_idle() {
        let (mut world, terrain, resources, config) = setup();
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
        world.take_tile_upload(PLAYER_SLOT);

        let result = tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
        let player = world.player().unwrap();

        assert_eq!(player.inertia, 0);
        assert_eq!((player.velocity.x, player.velocity.y), (0, 0));
        assert_eq!(player.position, FixedVec2::from_pixels(100, REST_Y));
        assert_eq!(player.anim, PlayerAnim::Wait.id());
        assert!(result.events.is_empty());
        assert!(world.take_tile_upload(PLAYER_SLOT).is_none());
    }

    #[test]
    fn test_jump_from_rest() {
        let (mut world, terrain, resources, config) = setup();
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);

        let result = tick(&mut world, InputFrame::tap(BUTTON_A), &terrain, &resources, &config);
        let player = world.player().unwrap();

        assert!(player.status.airborne);
        assert!(player.status.ball_form);
        assert_eq!((player.x_rad, player.y_rad), (BALL_WIDTH_RADIUS, BALL_HEIGHT_RADIUS));
        assert_eq!(player.position.py(), REST_Y + BALL_SHIFT);
        assert_eq!(player.velocity, SpeedVec::new(0, -JUMP_SPEED));
        assert!(result
            .events
            .iter()
            .any(|e| e.data == GameEventData::Sound { cue: SoundCue::Jump }));
    }

    #[test]
    fn test_tick_determinism() {
        let (mut a, terrain, resources, config) = setup();
        let (mut b, _, _, _) = setup();

        for t in 1..=200 {
            let input = InputFrame::from_held(scripted(t - 1), scripted(t));
            tick(&mut a, input, &terrain, &resources, &config);
            tick(&mut b, input, &terrain, &resources, &config);
        }

        assert_eq!(a.tick, b.tick);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.player(), b.player());
    }

    #[test]
    fn test_hash_tracks_state() {
        let (mut world, terrain, resources, config) = setup();
        let before = world.compute_hash();
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
        assert_ne!(before, world.compute_hash());

        let mut moved = world.clone();
        if let Some(obj) = moved.objects.get_mut(PLAYER_SLOT) {
            obj.inertia = 1;
        }
        assert_ne!(world.compute_hash(), moved.compute_hash());
    }

    #[test]
    fn test_hash_covers_every_carried_field() {
        let (mut world, terrain, resources, config) = setup();
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
        let base = world.compute_hash();

        let edits: [(&str, fn(&mut World)); 11] = [
            ("speed profile", |w| player_mut(w).speed = SpeedProfile::SHOES),
            ("floor clip", |w| player_mut(w).floor_clip = true),
            ("front angle", |w| player_mut(w).front_angle = 0x10),
            ("back angle", |w| player_mut(w).back_angle = 0x10),
            ("controls", |w| player_mut(w).controls = InputFrame::hold(BUTTON_RIGHT)),
            ("standing on", |w| player_mut(w).standing_on = Some(3)),
            ("tile memo", |w| player_mut(w).gfx = TileStreamer::new()),
            ("pending upload", |w| {
                w.take_tile_upload(PLAYER_SLOT);
            }),
            ("history", |w| w.history.record(FixedVec2::from_pixels(1, 2))),
            ("camera limits", |w| w.env.limits.bottom += 1),
            ("visibility", |w| {
                if let Some(obj) = w.objects.get_mut(PLAYER_SLOT) {
                    obj.visible = false;
                }
            }),
        ];

        for (name, edit) in edits {
            let mut changed = world.clone();
            edit(&mut changed);
            assert_ne!(changed.compute_hash(), base, "{name} not hashed");
        }
    }

    fn player_mut(world: &mut World) -> &mut crate::game::state::PlayerScratch {
        world
            .objects
            .get_mut(PLAYER_SLOT)
            .and_then(ObjectState::player_scratch_mut)
            .unwrap()
    }

    #[test]
    fn test_speed_profile_divergence_shows_in_hash() {
        let (mut a, terrain, resources, config) = setup();
        tick(&mut a, InputFrame::new(), &terrain, &resources, &config);
        let mut b = a.clone();
        player_mut(&mut b).speed = SpeedProfile::SHOES;
        assert_ne!(a.compute_hash(), b.compute_hash());

        for _ in 0..40 {
            tick(&mut a, InputFrame::hold(BUTTON_RIGHT), &terrain, &resources, &config);
            tick(&mut b, InputFrame::hold(BUTTON_RIGHT), &terrain, &resources, &config);
        }
        assert!(b.player().unwrap().inertia > a.player().unwrap().inertia);
    }

    proptest! {
        #[test]
        fn prop_independent_worlds_hash_alike(pads in proptest::collection::vec(any::<u8>(), 1..90)) {
            let (mut a, terrain, resources, config) = setup();
            let (mut b, _, _, _) = setup();
            let mut previous = 0;
            for held in pads {
                let input = InputFrame::from_held(previous, held);
                tick(&mut a, input, &terrain, &resources, &config);
                tick(&mut b, input, &terrain, &resources, &config);
                previous = held;
            }
            prop_assert_eq!(a.compute_hash(), b.compute_hash());
        }
    }

    #[test]
    fn test_recording_replays_to_live_hash() {
        let (mut live, terrain, resources, config) = setup();
        let initial = live.clone();
        let mut recording = PlayerInputBuffer::new();

        let mut previous = 0;
        for t in 1..=150 {
            let held = scripted(t);
            recording.record(t, held);
            tick(&mut live, InputFrame::from_held(previous, held), &terrain, &resources, &config);
            previous = held;
        }
        recording.finalize(150);

        let bytes = recording.to_bytes().unwrap();
        let decoded = PlayerInputBuffer::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.digest(), recording.digest());

        let (replayed, _) = replay(initial, &decoded, 150, &terrain, &resources, &config);
        assert_eq!(replayed.tick, live.tick);
        assert_eq!(replayed.compute_hash(), live.compute_hash());
    }

    #[test]
    fn test_falling_into_pit_restarts_level() {
        let config = SimConfig::default();
        let mut world = World::new(LevelId::new(Zone::Marble, 1), &config);
        world.env.limits.bottom = 0;
        world.spawn_player(FixedVec2::from_pixels(100, 100)).unwrap();
        let terrain = BlockTerrain::new(64, 32);
        let resources = SpriteResources::builtin();

        let mut events = Vec::new();
        let mut transition = None;
        for _ in 0..300 {
            let result = tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
            events.extend(result.events);
            if result.transition.is_some() {
                transition = result.transition;
                break;
            }
        }

        assert!(events.iter().any(|e| e.data
            == GameEventData::PlayerKilled { cause: DeathCause::Pit }));
        let transition = transition.expect("restart requested");
        assert_eq!(transition.kind, TransitionKind::Restart);
        assert_eq!(transition.next, LevelId::new(Zone::Marble, 1));
        assert_eq!(world.player().unwrap().routine, Routine::ResetLevel);
    }

    #[test]
    fn test_events_sorted_by_priority() {
        let config = SimConfig::default();
        let mut world = World::new(LevelId::new(Zone::Marble, 1), &config);
        world.env.limits.bottom = 0;
        world.spawn_player(FixedVec2::from_pixels(100, 240)).unwrap();
        let terrain = BlockTerrain::new(64, 32);
        let resources = SpriteResources::builtin();

        for _ in 0..300 {
            let result = tick(&mut world, InputFrame::new(), &terrain, &resources, &config);
            if result.events.len() > 1 {
                assert!(result.events.windows(2).all(|w| w[0] <= w[1]));
                assert!(matches!(result.events[0].data, GameEventData::PlayerKilled { .. }));
                return;
            }
        }
        panic!("no death");
    }

    #[test]
    fn test_debug_cheat_seeds_env() {
        let config = SimConfig { debug_cheat: true, ..SimConfig::default() };
        let world = World::new(LevelId::new(Zone::GreenHill, 0), &config);
        assert!(world.env.debug_cheat);
        assert_eq!(world.objects.capacity(), OBJECT_SLOTS);
    }

    #[test]
    fn test_spawn_player_without_slots() {
        let config = SimConfig { object_slots: 0, ..SimConfig::default() };
        let mut world = World::new(LevelId::new(Zone::GreenHill, 0), &config);
        assert!(world.spawn_player(FixedVec2::ZERO).is_err());
        assert!(world.player().is_none());
    }

    #[test]
    fn test_render_list_follows_camera() {
        let (mut world, terrain, resources, config) = setup();
        world.env.camera = (40, 100);
        tick(&mut world, InputFrame::new(), &terrain, &resources, &config);

        let list = world.render_list();
        assert_eq!(list.len(), 1);
        assert_eq!((list[0].screen_x, list[0].screen_y), (60, REST_Y - 100));
    }

    #[test]
    fn test_config_defaults() {
        let config = SimConfig::default();
        assert!(!config.legacy_shoes_restore);
        assert!(!config.debug_cheat);
        assert_eq!(config.object_slots, OBJECT_SLOTS);
    }
}
