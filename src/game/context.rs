//! Per-Tick Simulation Context
//!
//! Everything an object routine may read or write besides its own state,
//! bundled so it can be passed down the call chain explicitly:
//!
//! ```text
//! ┌──────────────────────── SimContext ────────────────────────┐
//! │ tick, slot, input          this tick's identity and pad     │
//! │ env          (mut)         level flags, camera, transitions │
//! │ scratch      (mut)         angle buffers, shared per tick   │
//! │ history      (mut)         recent player positions          │
//! │ events       (mut)         sound cues and other events      │
//! │ terrain, resources, objects, config      (read-only)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shared scratch is single-writer per tick: objects run in slot order and
//! later objects see what earlier ones wrote.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::collision::NO_SURFACE_ANGLE;
use crate::game::events::{GameEvent, GameEventData, SoundCue};
use crate::game::input::InputFrame;
use crate::game::level::LevelEnv;
use crate::game::resources::SpriteResources;
use crate::game::state::ObjectTable;
use crate::game::terrain::TerrainSampler;
use crate::game::tick::SimConfig;

/// Positions kept by `PositionHistory`.
pub const HISTORY_LEN: usize = 64;

/// Scratch values shared between objects within a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickScratch {
    /// Floor angles seen by the last pair of floor probes
    pub angle_buffer: [u8; 2],
}

impl Default for TickScratch {
    fn default() -> Self {
        Self {
            angle_buffer: [NO_SURFACE_ANGLE; 2],
        }
    }
}

/// Ring of recent player positions (pixels), newest last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHistory {
    entries: Vec<(i16, i16)>,
    cursor: usize,
}

impl PositionHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self {
            entries: vec![(0, 0); HISTORY_LEN],
            cursor: 0,
        }
    }

    /// Record a position.
    pub fn record(&mut self, position: FixedVec2) {
        self.entries[self.cursor] = (position.px(), position.py());
        self.cursor = (self.cursor + 1) % HISTORY_LEN;
    }

    /// Position recorded `ago` ticks back (0 = most recent).
    pub fn ago(&self, ago: usize) -> (i16, i16) {
        let index = (self.cursor + HISTORY_LEN - 1 - ago % HISTORY_LEN) % HISTORY_LEN;
        self.entries[index]
    }

    /// Feed the ring and its cursor into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.cursor as u32);
        for &(x, y) in &self.entries {
            hasher.update_i16(x);
            hasher.update_i16(y);
        }
    }
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of the world handed to one object for one tick.
pub struct SimContext<'a> {
    /// Tick being simulated
    pub tick: u32,
    /// Slot of the running object
    pub slot: usize,
    /// Pad state for this tick
    pub input: InputFrame,
    /// Level and game-state flags
    pub env: &'a mut LevelEnv,
    /// Terrain collision source
    pub terrain: &'a dyn TerrainSampler,
    /// Animation scripts and tile data
    pub resources: &'a SpriteResources,
    /// Shared per-tick scratch
    pub scratch: &'a mut TickScratch,
    /// Recent player positions
    pub history: &'a mut PositionHistory,
    /// Every other object (the running one's slot reads as empty)
    pub objects: &'a ObjectTable,
    /// Simulation options
    pub config: &'a SimConfig,
    /// Events raised this tick
    pub events: &'a mut Vec<GameEvent>,
}

impl<'a> SimContext<'a> {
    /// Queue an event from the running object.
    pub fn emit(&mut self, data: GameEventData) {
        self.events.push(GameEvent::new(self.tick, self.slot, data));
    }

    /// Queue a sound cue.
    pub fn sound(&mut self, cue: SoundCue) {
        self.emit(GameEventData::Sound { cue });
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_ring() {
        let mut history = PositionHistory::new();
        for i in 0..70 {
            history.record(FixedVec2::from_pixels(i, -i));
        }
        assert_eq!(history.ago(0), (69, -69));
        assert_eq!(history.ago(1), (68, -68));
        assert_eq!(history.ago(63), (6, -6));
    }

    #[test]
    fn test_emit_tags_tick_and_slot() {
        let mut fx = fixture::Fixture::flat();
        fx.tick = 42;
        let mut ctx = fx.ctx();
        ctx.slot = 3;
        ctx.sound(SoundCue::Jump);

        assert_eq!(fx.events.len(), 1);
        assert_eq!((fx.events[0].tick, fx.events[0].slot), (42, 3));
        assert_eq!(fx.sounds(), vec![SoundCue::Jump]);
    }
}
