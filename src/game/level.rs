//! Level Identity and Global Level Flags
//!
//! Everything the player object reads from, or writes back to, the level
//! and game-state owner: camera limits, control locks, power-up flags and
//! the pending level transition.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;

/// Visible screen width in pixels.
pub const SCREEN_WIDTH: i16 = 320;

/// Visible screen height in pixels.
pub const SCREEN_HEIGHT: i16 = 224;

/// Camera look shift at rest.
pub const LOOK_SHIFT_NEUTRAL: i16 = 192;

/// Camera look shift while looking up.
pub const LOOK_SHIFT_UP: i16 = 200;

/// Camera look shift while ducking.
pub const LOOK_SHIFT_DOWN: i16 = 8;

/// Air counter value at which drowning music takes over.
pub const AIR_WARNING: u16 = 12;

/// Zone identifiers in level order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Zone {
    /// Green Hill
    GreenHill = 0,
    /// Labyrinth
    Labyrinth = 1,
    /// Marble
    Marble = 2,
    /// Star Light
    StarLight = 3,
    /// Spring Yard
    SpringYard = 4,
    /// Scrap Brain
    ScrapBrain = 5,
    /// Final boss arena
    Ending = 6,
    /// Special stage
    Special = 7,
}

/// Zone and act. Acts count from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelId {
    /// Zone
    pub zone: Zone,
    /// Act within the zone
    pub act: u8,
}

impl LevelId {
    /// Create a level id.
    pub const fn new(zone: Zone, act: u8) -> Self {
        Self { zone, act }
    }

    /// Packed form: zone in the high byte, act in the low byte.
    pub const fn raw(self) -> u16 {
        ((self.zone as u16) << 8) | self.act as u16
    }
}

/// Camera scroll limits in level pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraLimits {
    /// Left edge
    pub left: i16,
    /// Right edge of the camera's left side
    pub right: i16,
    /// Top edge
    pub top: i16,
    /// Bottom edge of the camera's top side
    pub bottom: i16,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self { left: 0, right: 0x2000, top: 0, bottom: 0x400 }
    }
}

/// Why a level is being left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Fell out of a level that continues elsewhere
    Warp,
    /// Player died and the act restarts
    Restart,
}

/// Request for the level owner to load another level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    /// Level to load
    pub next: LevelId,
    /// Kind of transition
    pub kind: TransitionKind,
    /// Whether the last lamppost is forgotten
    pub reset_lamp: bool,
}

/// Global level and game-state flags shared with the player object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEnv {
    /// Current level
    pub level: LevelId,
    /// Camera scroll limits
    pub limits: CameraLimits,
    /// Camera top-left in level pixels
    pub camera: (i16, i16),
    /// Screen scroll locked (boss arenas)
    pub lock_screen: bool,
    /// Pad state is not copied into the player's controls
    pub lock_controls: bool,
    /// Player routine skips physics entirely
    pub lock_multi: bool,
    /// Only jumping is allowed
    pub jump_only: bool,
    /// Animation 0 keeps progress across ticks (tube sections)
    pub tunnel_mode: bool,
    /// Debug placement mode may be entered with B
    pub debug_cheat: bool,
    /// Camera look offset
    pub look_shift: i16,
    /// Enemy chain bonus counter
    pub item_bonus: u16,
    /// Invincibility power-up active
    pub invincibility: bool,
    /// Speed shoes power-up active
    pub shoes: bool,
    /// Remaining air while underwater
    pub air: u16,
    /// Last lamppost touched
    pub last_lamp: u8,
    /// Level restart requested
    pub restart: bool,
    /// Transition requested this tick, consumed by the level owner
    pub pending_transition: Option<LevelTransition>,
}

impl LevelEnv {
    /// Fresh flags for a level.
    pub fn new(level: LevelId) -> Self {
        Self {
            level,
            limits: CameraLimits::default(),
            camera: (0, 0),
            lock_screen: false,
            lock_controls: false,
            lock_multi: false,
            jump_only: false,
            tunnel_mode: false,
            debug_cheat: false,
            look_shift: LOOK_SHIFT_NEUTRAL,
            item_bonus: 0,
            invincibility: false,
            shoes: false,
            air: 30,
            last_lamp: 0,
            restart: false,
            pending_transition: None,
        }
    }

    /// Switch to another level and ask for a restart.
    pub fn request_transition(&mut self, transition: LevelTransition) {
        if transition.reset_lamp {
            self.last_lamp = 0;
        }
        self.restart = true;
        self.level = transition.next;
        self.pending_transition = Some(transition);
    }

    /// Take the pending transition, if any.
    pub fn take_transition(&mut self) -> Option<LevelTransition> {
        self.pending_transition.take()
    }

    /// Feed every flag into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u16(self.level.raw());
        let l = &self.limits;
        for edge in [l.left, l.right, l.top, l.bottom] {
            hasher.update_i16(edge);
        }
        hasher.update_i16(self.camera.0);
        hasher.update_i16(self.camera.1);
        for flag in [
            self.lock_screen,
            self.lock_controls,
            self.lock_multi,
            self.jump_only,
            self.tunnel_mode,
            self.debug_cheat,
            self.invincibility,
            self.shoes,
            self.restart,
        ] {
            hasher.update_bool(flag);
        }
        hasher.update_i16(self.look_shift);
        hasher.update_u16(self.item_bonus);
        hasher.update_u16(self.air);
        hasher.update_u8(self.last_lamp);

        match &self.pending_transition {
            Some(t) => {
                hasher.update_bool(true);
                hasher.update_u16(t.next.raw());
                hasher.update_u8(match t.kind {
                    TransitionKind::Warp => 0,
                    TransitionKind::Restart => 1,
                });
                hasher.update_bool(t.reset_lamp);
            }
            None => hasher.update_bool(false),
        }
    }
}

impl Default for LevelEnv {
    fn default() -> Self {
        Self::new(LevelId::new(Zone::GreenHill, 0))
    }
}
