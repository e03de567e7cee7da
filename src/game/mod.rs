//! Player Object Simulation
//!
//! Everything that runs inside a tick. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `state`: object slots, status flags, the player's kind-specific fields
//! - `tick`: world, dispatcher, replay
//! - `player`: routine state machine (Init, Control, Debug, Dead, ResetLevel)
//! - `physics`: movement, slopes, jumping, rolling, level bounds
//! - `collision`: floor, wall and ceiling probes
//! - `animation`: script interpreter and procedural walk/roll/push timing
//! - `tiles`: differential tile streaming for the current frame
//! - `resources`: animation scripts, tile manifests, atlas
//! - `terrain`: collision block source
//! - `input`: pad frames and recordings
//! - `level`: level id, camera limits, shared game-state flags
//! - `context`: per-tick context handed to every routine
//! - `events`: sound cues, deaths, transitions

pub mod input;
pub mod state;
pub mod tick;
pub mod context;
pub mod player;
pub mod physics;
pub mod collision;
pub mod animation;
pub mod tiles;
pub mod resources;
pub mod terrain;
pub mod level;
pub mod events;

// Re-export key types
pub use input::{InputFrame, InputDelta, PlayerInputBuffer};
pub use state::{ObjectState, ObjectKind, Routine, StatusFlags, PlayerScratch};
pub use tick::{tick, replay, SimConfig, TickResult, World};
pub use events::{GameEvent, GameEventData, SoundCue, DeathCause};
pub use resources::{DecodeError, SpriteResources};
