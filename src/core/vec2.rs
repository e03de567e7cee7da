//! Position and Speed Vectors
//!
//! `FixedVec2` is a Q16.16 position, `SpeedVec` a Q8.8 per-frame speed.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::fixed::{
    Fixed, Speed,
    add_pixels, from_pixel, speed_to_fixed, subpixel, to_pixel, with_pixel,
};

/// 2D position with Q16.16 components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Origin
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a position from whole pixels.
    #[inline]
    pub const fn from_pixels(x: i16, y: i16) -> Self {
        Self {
            x: from_pixel(x),
            y: from_pixel(y),
        }
    }

    /// Pixel part of x.
    #[inline]
    pub const fn px(self) -> i16 {
        to_pixel(self.x)
    }

    /// Pixel part of y.
    #[inline]
    pub const fn py(self) -> i16 {
        to_pixel(self.y)
    }

    /// Replace the pixel part of x.
    #[inline]
    pub fn set_px(&mut self, px: i16) {
        self.x = with_pixel(self.x, px);
    }

    /// Replace the pixel part of y.
    #[inline]
    pub fn set_py(&mut self, py: i16) {
        self.y = with_pixel(self.y, py);
    }

    /// Shift x by whole pixels.
    #[inline]
    pub fn add_px(&mut self, dx: i16) {
        self.x = add_pixels(self.x, dx);
    }

    /// Shift y by whole pixels.
    #[inline]
    pub fn add_py(&mut self, dy: i16) {
        self.y = add_pixels(self.y, dy);
    }

    /// Position after one frame at `speed`.
    #[inline]
    pub fn stepped(self, speed: SpeedVec) -> Self {
        Self {
            x: self.x.wrapping_add(speed_to_fixed(speed.x)),
            y: self.y.wrapping_add(speed_to_fixed(speed.y)),
        }
    }

    /// Move one frame at `speed`.
    #[inline]
    pub fn apply_speed(&mut self, speed: SpeedVec) {
        *self = self.stepped(speed);
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pos({}.{:04X}, {}.{:04X})",
            self.px(),
            subpixel(self.x),
            self.py(),
            subpixel(self.y)
        )
    }
}

/// Per-frame speed with Q8.8 components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpeedVec {
    /// Horizontal speed
    pub x: Speed,
    /// Vertical speed (positive is down)
    pub y: Speed,
}

impl SpeedVec {
    /// At rest
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a speed vector.
    #[inline]
    pub const fn new(x: Speed, y: Speed) -> Self {
        Self { x, y }
    }
}
