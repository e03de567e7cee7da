//! 8-bit Angles and the Sine Table
//!
//! A full turn is 256 steps. Angles grow clockwise on screen because the y
//! axis points down: 0x00 is a level floor, 0x40 a wall whose surface faces
//! right, 0x80 a ceiling and 0xC0 a wall whose surface faces left.
//!
//! ```text
//!                 0x80 (Up)
//!                   │
//!      0x40 (Left) ─┼─ 0xC0 (Right)
//!                   │
//!                 0x00 (Down)
//! ```
//!
//! The direction names describe where a probe cast at that angle travels:
//! an object standing at angle 0x00 probes down for its floor.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// Sine of each angle step, 256 = 1.0 (truncated toward zero).
///
/// Cosine is read from the same table a quarter turn later.
pub static SINE_TABLE: [i16; 256] = {
    const QUARTER: [i16; 65] = [
        0, 6, 12, 18, 25, 31, 37, 43, 49, 56, 62, 68, 74, 80, 86, 92,
        97, 103, 109, 115, 120, 126, 131, 136, 142, 147, 152, 157, 162, 167, 171, 176,
        181, 185, 189, 193, 197, 201, 205, 209, 212, 216, 219, 222, 225, 228, 231, 234,
        236, 238, 241, 243, 244, 246, 248, 249, 251, 252, 253, 254, 254, 255, 255, 255,
        256,
    ];
    let mut table = [0i16; 256];
    let mut i = 0;
    while i < 256 {
        let step = i & 0x7F;
        let magnitude = if step <= 64 { QUARTER[step] } else { QUARTER[128 - step] };
        table[i] = if i < 128 { magnitude } else { -magnitude };
        i += 1;
    }
    table
};

/// Sine and cosine of an angle, 256 = 1.0.
#[inline]
pub fn sin_cos(angle: Angle) -> (i16, i16) {
    let a = angle.0 as usize;
    (SINE_TABLE[a], SINE_TABLE[(a + 0x40) & 0xFF])
}

/// Axis-aligned direction a probe travels in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// +y on screen (floor)
    Down = 0x00,
    /// -x on screen
    Left = 0x40,
    /// -y on screen (ceiling)
    Up = 0x80,
    /// +x on screen
    Right = 0xC0,
}

impl Direction {
    /// Direction from an already bucketed angle (`0x00`, `0x40`, `0x80`, `0xC0`).
    #[inline]
    pub const fn from_bucket(bucket: u8) -> Self {
        match bucket & 0xC0 {
            0x00 => Direction::Down,
            0x40 => Direction::Left,
            0x80 => Direction::Up,
            _ => Direction::Right,
        }
    }

    /// Angle this direction faces.
    #[inline]
    pub const fn angle(self) -> Angle {
        Angle(self as u8)
    }

    /// Unit step along the direction as (dx, dy).
    #[inline]
    pub const fn step(self) -> (i16, i16) {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
        }
    }

    /// True for Left/Right.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Angle in 256 steps per turn. All arithmetic wraps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Angle(pub u8);

impl Angle {
    /// Level floor
    pub const ZERO: Self = Self(0);

    /// Raw step value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Nearest quadrant, rounding the ±0x20 boundary toward the next one:
    /// `(angle + 0x20) & 0xC0`.
    #[inline]
    pub const fn quadrant(self) -> u8 {
        self.0.wrapping_add(0x20) & 0xC0
    }

    /// Direction of the nearest quadrant.
    #[inline]
    pub const fn direction(self) -> Direction {
        Direction::from_bucket(self.quadrant())
    }

    /// Angle snapped to its quadrant.
    #[inline]
    pub const fn snapped(self) -> Self {
        Self(self.quadrant())
    }

    /// Odd angles mark surfaces whose angle must not be taken verbatim.
    #[inline]
    pub const fn is_special(self) -> bool {
        self.0 & 1 != 0
    }

    /// Quadrant with the boundary steps split evenly between neighbours.
    ///
    /// Angles exactly on a ±0x20 boundary go to whichever side keeps the
    /// mapping symmetric around 0x00.
    #[inline]
    pub const fn symmetric_quadrant(self) -> Direction {
        let mut a = self.0;
        if a.wrapping_add(0x20) & 0x80 != 0 {
            if a & 0x80 != 0 {
                a = a.wrapping_sub(1);
            }
            a = a.wrapping_add(0x20);
        } else {
            if a & 0x80 != 0 {
                a = a.wrapping_add(1);
            }
            a = a.wrapping_add(0x1F);
        }
        Direction::from_bucket(a & 0xC0)
    }
}

impl Add<u8> for Angle {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u8) -> Self {
        Self(self.0.wrapping_add(rhs))
    }
}

impl Sub<u8> for Angle {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: u8) -> Self {
        Self(self.0.wrapping_sub(rhs))
    }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle(0x{:02X})", self.0)
    }
}
