//! Terrain Collision Probes
//!
//! Casts axis-aligned probes into the terrain and reports how far the
//! nearest surface is, and at what angle it lies.
//!
//! A probe samples the block under its pixel. An empty block hands over to
//! the next block along the probe direction; a completely full block hands
//! back to the previous one. The second sample never recurses, so a probe
//! sees at most two blocks:
//!
//! ```text
//!   distance = 15 - extent - local       (local = offset inside the block)
//!
//!   distance > 0   surface ahead, not touching
//!   distance = 0   touching
//!   distance < 0   embedded
//! ```
//!
//! A miss is not an error: it yields the end-of-range distance and the
//! `NO_SURFACE_ANGLE` sentinel.

use serde::{Serialize, Deserialize};

use crate::core::angle::{Angle, Direction};
use crate::core::vec2::{FixedVec2, SpeedVec};
use crate::game::terrain::{SolidLayer, TerrainSampler, BLOCK_SIZE};

/// Angle reported when no surface was found ("no floor").
pub const NO_SURFACE_ANGLE: u8 = 3;

/// How far ahead of the center the in-front probe looks.
const FRONT_PROBE_REACH: i16 = 10;

/// Extra drop of the in-front probe on level ground, so it catches low steps.
const FRONT_PROBE_DROP: i16 = 8;

/// Result of one probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeHit {
    /// Signed distance to the surface along the probe direction
    pub distance: i16,
    /// Surface angle, or `NO_SURFACE_ANGLE`
    pub angle: u8,
}

/// Result of the two probes cast for one contact check.
///
/// For floors and ceilings the left probe sits on the +x side; for walls it
/// sits on the -y side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbePair {
    /// First probe
    pub left: ProbeHit,
    /// Second probe
    pub right: ProbeHit,
}

impl ProbePair {
    /// The closer surface; ties keep the left probe.
    #[inline]
    pub fn nearest(&self) -> ProbeHit {
        if self.right.distance < self.left.distance {
            self.right
        } else {
            self.left
        }
    }
}

/// Layer a probe in `direction` respects: floors are top-solid, everything
/// else needs full solidity.
#[inline]
pub fn layer_for(direction: Direction) -> SolidLayer {
    match direction {
        Direction::Down => SolidLayer::Top,
        _ => SolidLayer::Full,
    }
}

#[inline]
fn local_offset(x: i16, y: i16, direction: Direction) -> i16 {
    match direction {
        Direction::Down => y & 15,
        Direction::Up => 15 - (y & 15),
        Direction::Right => x & 15,
        Direction::Left => 15 - (x & 15),
    }
}

#[inline]
fn advance(x: i16, y: i16, direction: Direction, amount: i16) -> (i16, i16) {
    let (dx, dy) = direction.step();
    (
        x.wrapping_add(dx.wrapping_mul(amount)),
        y.wrapping_add(dy.wrapping_mul(amount)),
    )
}

/// Second-block sample: distance plus the angle, if the block was solid.
fn sample_once(
    terrain: &dyn TerrainSampler,
    x: i16,
    y: i16,
    direction: Direction,
    layer: SolidLayer,
) -> (i16, Option<u8>) {
    let sample = terrain.query(x, y, direction, layer);
    let local = local_offset(x, y, direction);
    if sample.extent == 0 {
        (15 - local, None)
    } else {
        (15 - sample.extent as i16 - local, Some(sample.angle))
    }
}

/// Cast one probe from pixel (x, y).
pub fn find_surface(
    terrain: &dyn TerrainSampler,
    x: i16,
    y: i16,
    direction: Direction,
    layer: SolidLayer,
) -> ProbeHit {
    let sample = terrain.query(x, y, direction, layer);

    match sample.extent {
        0 => {
            let (nx, ny) = advance(x, y, direction, BLOCK_SIZE);
            let (distance, angle) = sample_once(terrain, nx, ny, direction, layer);
            ProbeHit {
                distance: distance.wrapping_add(BLOCK_SIZE),
                angle: angle.unwrap_or(NO_SURFACE_ANGLE),
            }
        }
        e if e >= 16 => {
            let (px, py) = advance(x, y, direction, -BLOCK_SIZE);
            let (distance, angle) = sample_once(terrain, px, py, direction, layer);
            ProbeHit {
                distance: distance.wrapping_sub(BLOCK_SIZE),
                angle: angle.unwrap_or(sample.angle),
            }
        }
        extent => ProbeHit {
            distance: 15 - extent as i16 - local_offset(x, y, direction),
            angle: sample.angle,
        },
    }
}

/// Cast both contact probes for an object's extents in `direction`.
pub fn probe_pair(
    terrain: &dyn TerrainSampler,
    position: FixedVec2,
    x_rad: u8,
    y_rad: u8,
    direction: Direction,
) -> ProbePair {
    let (x, y) = (position.px(), position.py());
    let (w, h) = (x_rad as i16, y_rad as i16);

    let (left, right) = match direction {
        Direction::Down => ((x.wrapping_add(w), y.wrapping_add(h)), (x.wrapping_sub(w), y.wrapping_add(h))),
        Direction::Up => ((x.wrapping_add(w), y.wrapping_sub(h)), (x.wrapping_sub(w), y.wrapping_sub(h))),
        Direction::Right => ((x.wrapping_add(h), y.wrapping_sub(w)), (x.wrapping_add(h), y.wrapping_add(w))),
        Direction::Left => ((x.wrapping_sub(h), y.wrapping_sub(w)), (x.wrapping_sub(h), y.wrapping_add(w))),
    };

    let layer = layer_for(direction);
    ProbePair {
        left: find_surface(terrain, left.0, left.1, direction, layer),
        right: find_surface(terrain, right.0, right.1, direction, layer),
    }
}

/// Angle to adopt after touching a surface: odd angles snap the current
/// angle to its quadrant instead of being used as-is.
#[inline]
pub fn resolve_angle(current: Angle, detected: u8) -> Angle {
    if Angle(detected).is_special() {
        current.snapped()
    } else {
        Angle(detected)
    }
}

/// Distance from the object's extents to the nearest surface toward `angle`,
/// using the plain quadrant of `angle`.
///
/// Used for the jump headroom check (`angle + 0x80` points overhead).
pub fn distance_toward(
    terrain: &dyn TerrainSampler,
    position: FixedVec2,
    x_rad: u8,
    y_rad: u8,
    angle: Angle,
) -> ProbeHit {
    probe_pair(terrain, position, x_rad, y_rad, angle.direction()).nearest()
}

/// Distance to a wall (or floor/ceiling) in front of the object at the
/// position it will reach this frame.
pub fn room_in_front(
    terrain: &dyn TerrainSampler,
    position: FixedVec2,
    speed: SpeedVec,
    angle: Angle,
) -> i16 {
    let next = position.stepped(speed);
    let (x, y) = (next.px(), next.py());
    let direction = angle.symmetric_quadrant();

    let drop = if angle.raw() & 0x38 == 0 { FRONT_PROBE_DROP } else { 0 };
    let (px, py) = match direction {
        Direction::Down => (x, y.wrapping_add(FRONT_PROBE_REACH)),
        Direction::Up => (x, y.wrapping_sub(FRONT_PROBE_REACH)),
        Direction::Left => (x.wrapping_sub(FRONT_PROBE_REACH), y.wrapping_add(drop)),
        Direction::Right => (x.wrapping_add(FRONT_PROBE_REACH), y.wrapping_add(drop)),
    };

    find_surface(terrain, px, py, direction, layer_for(direction)).distance
}

/// Floor distance below the object's feet at column `x` (ledge test).
pub fn floor_distance_at(
    terrain: &dyn TerrainSampler,
    position: FixedVec2,
    y_rad: u8,
    x: i16,
) -> i16 {
    let y = position.py().wrapping_add(y_rad as i16);
    find_surface(terrain, x, y, Direction::Down, SolidLayer::Top).distance
}

// =============================================================================
// TESTS
// =============================================================================
