//! # Hedgehog Engine
//!
//! Deterministic player object simulation for a 16-bit style platformer:
//! slope-aware momentum, rolling, jumping, floor and wall probes, scripted
//! animation and differential tile streaming.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HEDGEHOG ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 positions, Q8.8 speeds             │
//! │  ├── angle.rs    - 8-bit angles and the sine table           │
//! │  ├── vec2.rs     - Fixed-point position and speed vectors    │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── state.rs    - Object slots and player fields            │
//! │  ├── tick.rs     - World, dispatcher, replay                 │
//! │  ├── player.rs   - Routine state machine                     │
//! │  ├── physics.rs  - Movement integrator                       │
//! │  ├── collision.rs- Terrain probes                            │
//! │  ├── animation.rs- Script interpreter                        │
//! │  └── tiles.rs    - Tile streamer                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic
//! - Objects run in fixed slot order
//! - No system time dependencies
//! - Overflow wraps like the 16/32-bit registers it models
//!
//! Given the same level, resources and input recording, the simulation
//! produces **identical state hashes** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::fixed::{Fixed, Speed, FIXED_ONE, FIXED_SCALE, SPEED_ONE};
pub use core::angle::Angle;
pub use core::vec2::{FixedVec2, SpeedVec};
pub use game::input::{InputFrame, InputDelta, PlayerInputBuffer};
pub use game::state::{ObjectState, ObjectTable};
pub use game::tick::{SimConfig, World};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
