//! Object State Definitions
//!
//! Every object in a level lives in one slot of an `ObjectTable` as an
//! `ObjectState`. The record holds what all kinds share (position, speeds,
//! collision extents, animation cursor, render flags); kind-specific fields
//! live in a tagged `ObjectScratch`.
//!
//! ## Player routine
//!
//! ```text
//! ┌──────┐ first tick ┌─────────┐  kill   ┌──────┐ below death line ┌────────────┐
//! │ Init │ ─────────> │ Control │ ──────> │ Dead │ ───────────────> │ ResetLevel │
//! └──────┘            └─────────┘         └──────┘                  └────────────┘
//!                       │     ▲
//!          cheat + B    ▼     │  B
//!                      ┌───────┐
//!                      │ Debug │
//!                      └───────┘
//! ```

use serde::{Serialize, Deserialize};

use crate::core::angle::Angle;
use crate::core::fixed::Speed;
use crate::core::hash::StateHasher;
use crate::core::vec2::{FixedVec2, SpeedVec};
use crate::game::input::InputFrame;
use crate::game::resources::DecodeError;
use crate::game::tiles::TileStreamer;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Standing half-width
pub const PLAYER_WIDTH_RADIUS: u8 = 9;

/// Standing half-height
pub const PLAYER_HEIGHT_RADIUS: u8 = 19;

/// Ball-form half-width
pub const BALL_WIDTH_RADIUS: u8 = 7;

/// Ball-form half-height
pub const BALL_HEIGHT_RADIUS: u8 = 14;

/// Vertical shift keeping the feet in place when the height changes.
pub const BALL_SHIFT: i16 = (PLAYER_HEIGHT_RADIUS - BALL_HEIGHT_RADIUS) as i16;

/// Pattern base of the player's art in video memory.
pub const PLAYER_ART_TILE: u16 = 0x780;

/// Total object slots.
pub const OBJECT_SLOTS: usize = 0x80;

/// Slots reserved for the player and its helpers; level objects spawn above.
pub const RESERVED_SLOTS: usize = 0x20;

/// Slot the player occupies.
pub const PLAYER_SLOT: usize = 0;

/// Previous-animation value that makes the next animation step restart.
pub const ANIM_RESTART_MARKER: u8 = 1;

// =============================================================================
// ENUMS AND FLAG RECORDS
// =============================================================================

/// What kind of object occupies a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectKind {
    /// Player character
    Player = 1,
    /// Solid platform the player can stand on
    Platform = 2,
}

/// Coarse routine of an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Routine {
    /// One-time setup on the first tick
    #[default]
    Init = 0,
    /// Normal play
    Control = 2,
    /// Free placement (debug cheat)
    Debug = 4,
    /// Death fall
    Dead = 6,
    /// Waiting for the level owner to restart
    ResetLevel = 8,
}

/// Player status flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusFlags {
    /// Facing left
    pub x_flip: bool,
    /// Not touching the ground
    pub airborne: bool,
    /// Rolled into a ball
    pub ball_form: bool,
    /// Standing on another object
    pub object_stand: bool,
    /// Jumped while already rolling
    pub roll_jump: bool,
    /// Pushing against a wall
    pub pushing: bool,
    /// Below the water line
    pub underwater: bool,
}

/// Sprite mirroring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderFlags {
    /// Mirror horizontally
    pub x_flip: bool,
    /// Mirror vertically
    pub y_flip: bool,
}

/// Video memory placement of an object's art.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtTile {
    /// First pattern index
    pub pattern: u16,
    /// Palette line (0-3)
    pub palette: u8,
    /// Draw above high-priority plane tiles
    pub high_priority: bool,
}

/// Ground movement constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Top running speed
    pub max: Speed,
    /// Acceleration (and friction)
    pub acc: Speed,
    /// Deceleration when reversing
    pub dec: Speed,
}

impl SpeedProfile {
    /// Dry land
    pub const NORMAL: Self = Self { max: 0x600, acc: 0x0C, dec: 0x80 };
    /// Below the water line
    pub const UNDERWATER: Self = Self { max: 0x300, acc: 0x06, dec: 0x40 };
    /// Speed shoes
    pub const SHOES: Self = Self { max: 0xC00, acc: 0x18, dec: 0x80 };
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::NORMAL
    }
}

// =============================================================================
// SCRATCH VARIANTS
// =============================================================================

/// Player-only fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScratch {
    /// Active movement constants
    pub speed: SpeedProfile,
    /// Controls as seen by the player (frozen while controls are locked)
    pub controls: InputFrame,
    /// Post-hit invulnerability blink timer
    pub flash_time: u16,
    /// Invincibility power-up timer
    pub invincibility_time: u16,
    /// Speed shoes timer
    pub shoes_time: u16,
    /// In the air because of a jump
    pub jumping: bool,
    /// Stay grounded over drops (tubes, loops)
    pub floor_clip: bool,
    /// Y where the death fall started
    pub death_y: i16,
    /// Floor angle under the front probe last tick
    pub front_angle: u8,
    /// Floor angle under the back probe last tick
    pub back_angle: u8,
    /// Ticks of ignored left/right input after sliding off a slope
    pub control_lock: u16,
    /// Slot of the object being stood on
    pub standing_on: Option<usize>,
    /// Differential tile loader for this player's frames
    pub gfx: TileStreamer,
    /// Sprite decode errors seen on the last tick
    pub faults: Vec<DecodeError>,
}

impl Default for PlayerScratch {
    fn default() -> Self {
        Self {
            speed: SpeedProfile::NORMAL,
            controls: InputFrame::new(),
            flash_time: 0,
            invincibility_time: 0,
            shoes_time: 0,
            jumping: false,
            floor_clip: false,
            death_y: 0,
            front_angle: 0,
            back_angle: 0,
            control_lock: 0,
            standing_on: None,
            gfx: TileStreamer::new(),
            faults: Vec::new(),
        }
    }
}

/// Platform-only fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformScratch {
    /// Player never balances on this platform's edges
    pub no_balance: bool,
}

/// Kind-specific state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectScratch {
    /// Nothing kind-specific
    #[default]
    None,
    /// Player fields
    Player(PlayerScratch),
    /// Platform fields
    Platform(PlatformScratch),
}

// =============================================================================
// OBJECT STATE
// =============================================================================

/// What the renderer needs to draw one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDescriptor {
    /// Art placement
    pub art: ArtTile,
    /// Mapping frame
    pub frame: u8,
    /// Mirror horizontally
    pub x_flip: bool,
    /// Mirror vertically
    pub y_flip: bool,
    /// Sprite priority (0 = front)
    pub priority: u8,
    /// Screen x of the object's center
    pub screen_x: i16,
    /// Screen y of the object's center
    pub screen_y: i16,
}

/// One object slot's state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Object kind
    pub kind: ObjectKind,
    /// Coarse routine
    pub routine: Routine,
    /// Center position (Q16.16)
    pub position: FixedVec2,
    /// Speed (Q8.8)
    pub velocity: SpeedVec,
    /// Ground speed along the surface angle (Q8.8)
    pub inertia: Speed,
    /// Collision half-width
    pub x_rad: u8,
    /// Collision half-height
    pub y_rad: u8,
    /// Surface / facing angle
    pub angle: Angle,
    /// Status flags
    pub status: StatusFlags,
    /// Active animation id
    pub anim: u8,
    /// Animation id seen on the previous animation step
    pub prev_anim: u8,
    /// Command index inside the active script
    pub anim_frame: u8,
    /// Current mapping frame
    pub frame: u8,
    /// Ticks left on the current frame (signed: -1 means expired)
    pub frame_time: i8,
    /// Sprite mirroring
    pub render: RenderFlags,
    /// Art placement
    pub art: ArtTile,
    /// Sprite priority (0 = front)
    pub priority: u8,
    /// Visible half-width in pixels
    pub width_pixels: u8,
    /// Drawn this tick
    pub visible: bool,
    /// Kind-specific fields
    pub scratch: ObjectScratch,
}

impl ObjectState {
    /// Blank object in the `Init` routine.
    pub fn new(kind: ObjectKind, position: FixedVec2) -> Self {
        Self {
            kind,
            routine: Routine::Init,
            position,
            velocity: SpeedVec::ZERO,
            inertia: 0,
            x_rad: 0,
            y_rad: 0,
            angle: Angle::ZERO,
            status: StatusFlags::default(),
            anim: 0,
            prev_anim: 0,
            anim_frame: 0,
            frame: 0,
            frame_time: 0,
            render: RenderFlags::default(),
            art: ArtTile::default(),
            priority: 0,
            width_pixels: 0,
            visible: true,
            scratch: ObjectScratch::None,
        }
    }

    /// Player waiting for its `Init` routine.
    pub fn player(position: FixedVec2) -> Self {
        let mut obj = Self::new(ObjectKind::Player, position);
        obj.scratch = ObjectScratch::Player(PlayerScratch::default());
        obj
    }

    /// Solid platform with the given visible half-width.
    pub fn platform(position: FixedVec2, width_pixels: u8) -> Self {
        let mut obj = Self::new(ObjectKind::Platform, position);
        obj.width_pixels = width_pixels;
        obj.priority = 4;
        obj.scratch = ObjectScratch::Platform(PlatformScratch::default());
        obj
    }

    /// Player fields, if this is a player.
    pub fn player_scratch(&self) -> Option<&PlayerScratch> {
        match &self.scratch {
            ObjectScratch::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable player fields, if this is a player.
    pub fn player_scratch_mut(&mut self) -> Option<&mut PlayerScratch> {
        match &mut self.scratch {
            ObjectScratch::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Platform fields, if this is a platform.
    pub fn platform_scratch(&self) -> Option<&PlatformScratch> {
        match &self.scratch {
            ObjectScratch::Platform(p) => Some(p),
            _ => None,
        }
    }

    /// Curl into a ball: smaller extents, center moved down to keep the
    /// feet in place. Returns false if already curled.
    pub fn enter_ball(&mut self) -> bool {
        if self.status.ball_form {
            return false;
        }
        self.status.ball_form = true;
        self.y_rad = BALL_HEIGHT_RADIUS;
        self.x_rad = BALL_WIDTH_RADIUS;
        self.position.add_py(BALL_SHIFT);
        true
    }

    /// Uncurl: standing extents, center moved up. Returns false if not curled.
    pub fn exit_ball(&mut self) -> bool {
        if !self.status.ball_form {
            return false;
        }
        self.status.ball_form = false;
        self.y_rad = PLAYER_HEIGHT_RADIUS;
        self.x_rad = PLAYER_WIDTH_RADIUS;
        self.position.add_py(-BALL_SHIFT);
        true
    }

    /// Force the next animation step to restart its script.
    #[inline]
    pub fn restart_animation(&mut self) {
        self.prev_anim = ANIM_RESTART_MARKER;
    }

    /// Draw description relative to the camera's top-left, or None while
    /// hidden.
    pub fn render_descriptor(&self, camera: (i16, i16)) -> Option<RenderDescriptor> {
        if !self.visible {
            return None;
        }
        Some(RenderDescriptor {
            art: self.art,
            frame: self.frame,
            x_flip: self.render.x_flip,
            y_flip: self.render.y_flip,
            priority: self.priority,
            screen_x: self.position.px().wrapping_sub(camera.0),
            screen_y: self.position.py().wrapping_sub(camera.1),
        })
    }

    /// Feed every field that can influence a later tick into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.kind as u8);
        hasher.update_u8(self.routine as u8);
        hasher.update_vec2(self.position);
        hasher.update_speed_vec(self.velocity);
        hasher.update_speed(self.inertia);
        hasher.update_u8(self.x_rad);
        hasher.update_u8(self.y_rad);
        hasher.update_u8(self.angle.raw());

        let s = &self.status;
        for flag in [s.x_flip, s.airborne, s.ball_form, s.object_stand, s.roll_jump, s.pushing, s.underwater] {
            hasher.update_bool(flag);
        }

        hasher.update_u8(self.anim);
        hasher.update_u8(self.prev_anim);
        hasher.update_u8(self.anim_frame);
        hasher.update_u8(self.frame);
        hasher.update_i8(self.frame_time);
        hasher.update_bool(self.render.x_flip);
        hasher.update_bool(self.render.y_flip);
        hasher.update_u16(self.art.pattern);
        hasher.update_u8(self.art.palette);
        hasher.update_bool(self.art.high_priority);
        hasher.update_u8(self.priority);
        hasher.update_u8(self.width_pixels);
        hasher.update_bool(self.visible);

        match &self.scratch {
            ObjectScratch::None => hasher.update_u8(0),
            ObjectScratch::Player(p) => {
                hasher.update_u8(1);
                p.hash_into(hasher);
            }
            ObjectScratch::Platform(p) => {
                hasher.update_u8(2);
                hasher.update_bool(p.no_balance);
            }
        }
    }
}

impl PlayerScratch {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_speed(self.speed.max);
        hasher.update_speed(self.speed.acc);
        hasher.update_speed(self.speed.dec);
        hasher.update_u8(self.controls.held);
        hasher.update_u8(self.controls.pressed);
        hasher.update_u16(self.flash_time);
        hasher.update_u16(self.invincibility_time);
        hasher.update_u16(self.shoes_time);
        hasher.update_bool(self.jumping);
        hasher.update_bool(self.floor_clip);
        hasher.update_i16(self.death_y);
        hasher.update_u8(self.front_angle);
        hasher.update_u8(self.back_angle);
        hasher.update_u16(self.control_lock);
        match self.standing_on {
            Some(slot) => {
                hasher.update_bool(true);
                hasher.update_u32(slot as u32);
            }
            None => hasher.update_bool(false),
        }
        self.gfx.hash_into(hasher);
        hasher.update_u32(self.faults.len() as u32);
        for fault in &self.faults {
            hasher.update_table(fault.to_string().as_bytes());
        }
    }
}

// =============================================================================
// OBJECT TABLE
// =============================================================================

/// Fixed set of object slots, iterated in ascending slot order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectTable {
    slots: Vec<Option<ObjectState>>,
}

impl ObjectTable {
    /// Empty table with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Place an object in the first free level slot.
    pub fn spawn(&mut self, obj: ObjectState) -> Option<usize> {
        let slot = (RESERVED_SLOTS.min(self.slots.len())..self.slots.len())
            .find(|&i| self.slots[i].is_none())?;
        self.slots[slot] = Some(obj);
        Some(slot)
    }

    /// Place an object in a specific slot, returning what was there.
    ///
    /// Out-of-range slots hand the object back untouched.
    pub fn spawn_at(&mut self, slot: usize, obj: ObjectState) -> Result<Option<ObjectState>, ObjectState> {
        match self.slots.get_mut(slot) {
            Some(entry) => Ok(entry.replace(obj)),
            None => Err(obj),
        }
    }

    /// Release a slot.
    pub fn free(&mut self, slot: usize) -> Option<ObjectState> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Object in a slot.
    pub fn get(&self, slot: usize) -> Option<&ObjectState> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Mutable object in a slot.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut ObjectState> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ObjectState)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|o| (i, o)))
    }

    /// Remove an object while it runs.
    pub(crate) fn take(&mut self, slot: usize) -> Option<ObjectState> {
        self.free(slot)
    }

    /// Put a running object back.
    pub(crate) fn restore(&mut self, slot: usize, obj: ObjectState) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(obj);
        }
    }
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new(OBJECT_SLOTS)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standing_player() -> ObjectState {
        let mut obj = ObjectState::player(FixedVec2::from_pixels(100, 200));
        obj.x_rad = PLAYER_WIDTH_RADIUS;
        obj.y_rad = PLAYER_HEIGHT_RADIUS;
        obj
    }

    #[test]
    fn test_ball_toggle_keeps_feet() {
        let mut obj = standing_player();
        let feet = obj.position.py() + obj.y_rad as i16;

        assert!(obj.enter_ball());
        assert_eq!((obj.x_rad, obj.y_rad), (BALL_WIDTH_RADIUS, BALL_HEIGHT_RADIUS));
        assert_eq!(obj.position.py() + obj.y_rad as i16, feet);
        assert!(!obj.enter_ball());

        assert!(obj.exit_ball());
        assert_eq!(obj.position.py(), 200);
        assert!(!obj.exit_ball());
    }

    #[test]
    fn test_render_descriptor() {
        let mut obj = standing_player();
        obj.art.pattern = PLAYER_ART_TILE;
        obj.render.x_flip = true;
        let desc = obj.render_descriptor((40, 100)).unwrap();
        assert_eq!((desc.screen_x, desc.screen_y), (60, 100));
        assert!(desc.x_flip);

        obj.visible = false;
        assert!(obj.render_descriptor((0, 0)).is_none());
    }

    #[test]
    fn test_table_spawn_order() {
        let mut table = ObjectTable::new(OBJECT_SLOTS);
        assert!(table.spawn_at(PLAYER_SLOT, standing_player()).is_ok());

        let a = table.spawn(ObjectState::platform(FixedVec2::ZERO, 16)).unwrap();
        let b = table.spawn(ObjectState::platform(FixedVec2::ZERO, 16)).unwrap();
        assert_eq!((a, b), (RESERVED_SLOTS, RESERVED_SLOTS + 1));

        table.free(a);
        assert_eq!(table.spawn(ObjectState::platform(FixedVec2::ZERO, 8)), Some(a));

        let slots: Vec<usize> = table.iter().map(|(i, _)| i).collect();
        assert_eq!(slots, vec![PLAYER_SLOT, a, b]);
        assert!(table.spawn_at(OBJECT_SLOTS, standing_player()).is_err());
    }

    #[test]
    fn test_scratch_is_tagged() {
        let player = standing_player();
        assert!(player.player_scratch().is_some());
        assert!(player.platform_scratch().is_none());

        let platform = ObjectState::platform(FixedVec2::ZERO, 16);
        assert!(platform.player_scratch().is_none());
        assert!(!platform.platform_scratch().unwrap().no_balance);
    }
}
