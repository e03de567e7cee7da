//! Fixed-Point Positions and Speeds
//!
//! Two fixed-point formats drive the whole simulation. Neither ever touches
//! a float.
//!
//! ## Formats
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Position: Q16.16 (32-bit signed)                           │
//! │  [S][IIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                     │
//! │      └─ pixel (i16) ─┘└─ sub-pixel ──┘                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Speed: Q8.8 (16-bit signed)                                │
//! │  [S][IIIIIII][FFFFFFFF]                                     │
//! │  0x100 = one pixel per frame                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applying a speed to a position shifts it left by 8 so the Q8.8 fraction
//! lands on the top byte of the Q16.16 fraction.
//!
//! ## Overflow
//!
//! Every operation wraps, matching 16/32-bit register arithmetic. A speed
//! that overflows its 16 bits turns around instead of saturating.

/// Q16.16 position stored as i32.
pub type Fixed = i32;

/// Q8.8 speed stored as i16 (0x100 = 1 pixel/frame).
pub type Speed = i16;

/// Number of fractional bits in a position (16)
pub const FIXED_SCALE: i32 = 16;

/// One pixel in position units (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// Number of fractional bits in a speed (8)
pub const SPEED_SCALE: i32 = 8;

/// One pixel per frame in speed units (256)
pub const SPEED_ONE: Speed = 1 << SPEED_SCALE;

// =============================================================================
// PIXEL ACCESS
// =============================================================================

/// Integer pixel part of a position.
#[inline]
pub const fn to_pixel(value: Fixed) -> i16 {
    (value >> FIXED_SCALE) as i16
}

/// Sub-pixel part of a position.
#[inline]
pub const fn subpixel(value: Fixed) -> u16 {
    value as u16
}

/// Position at the start of a pixel.
#[inline]
pub const fn from_pixel(px: i16) -> Fixed {
    (px as i32) << FIXED_SCALE
}

/// Replace the pixel part of a position, keeping its sub-pixel part.
#[inline]
pub const fn with_pixel(value: Fixed, px: i16) -> Fixed {
    from_pixel(px) | (value & 0xFFFF)
}

/// Add whole pixels to a position. The pixel part wraps at 16 bits and the
/// sub-pixel part is untouched.
#[inline]
pub const fn add_pixels(value: Fixed, delta: i16) -> Fixed {
    with_pixel(value, to_pixel(value).wrapping_add(delta))
}

// =============================================================================
// SPEED OPERATIONS
// =============================================================================

/// Widen a Q8.8 speed to the Q16.16 step it applies each frame.
#[inline]
pub const fn speed_to_fixed(speed: Speed) -> Fixed {
    (speed as i32) << SPEED_SCALE
}

/// Absolute speed. `i16::MIN` stays negative, as on the register.
#[inline]
pub const fn speed_abs(speed: Speed) -> Speed {
    speed.wrapping_abs()
}

/// Scale a magnitude by a sine-table value (256 = 1.0).
///
/// The product is taken in 32 bits, shifted, then truncated back to 16 bits.
#[inline]
pub const fn trig_scale(trig: i16, magnitude: i16) -> Speed {
    ((trig as i32 * magnitude as i32) >> 8) as Speed
}

// =============================================================================
// TESTS
// =============================================================================
