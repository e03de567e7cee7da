//! Core deterministic primitives.
//!
//! Integer-only building blocks shared by every simulation component:
//! fixed-point positions and speeds, 8-bit angles with their sine table,
//! and state digests.

pub mod fixed;
pub mod angle;
pub mod vec2;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, Speed, FIXED_ONE, FIXED_SCALE, SPEED_ONE};
pub use angle::{Angle, Direction, sin_cos};
pub use vec2::{FixedVec2, SpeedVec};
pub use hash::{compute_state_hash, StateHash, StateHasher};
