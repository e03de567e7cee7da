//! Input Capture and Recording
//!
//! The pad is sampled once per tick into a held mask and a pressed mask
//! (buttons that went down this tick). Recordings only store the ticks where
//! the raw held mask changed, so the pressed edges are rebuilt on replay.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{HashDomain, StateHash, StateHasher};

// =============================================================================
// BUTTON BITS
// =============================================================================

/// D-pad up
pub const BUTTON_UP: u8 = 0x01;
/// D-pad down
pub const BUTTON_DOWN: u8 = 0x02;
/// D-pad left
pub const BUTTON_LEFT: u8 = 0x04;
/// D-pad right
pub const BUTTON_RIGHT: u8 = 0x08;
/// B button
pub const BUTTON_B: u8 = 0x10;
/// C button
pub const BUTTON_C: u8 = 0x20;
/// A button
pub const BUTTON_A: u8 = 0x40;

/// Any of the three jump buttons.
pub const BUTTONS_JUMP: u8 = BUTTON_A | BUTTON_B | BUTTON_C;

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Pad state for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Buttons currently down
    pub held: u8,
    /// Buttons that went down this tick
    pub pressed: u8,
}

impl InputFrame {
    /// No buttons.
    pub const fn new() -> Self {
        Self { held: 0, pressed: 0 }
    }

    /// Derive the pressed edges from the previous and current held masks.
    #[inline]
    pub const fn from_held(previous: u8, held: u8) -> Self {
        Self {
            held,
            pressed: held & !previous,
        }
    }

    /// Held and pressed on the same tick.
    pub const fn tap(buttons: u8) -> Self {
        Self { held: buttons, pressed: buttons }
    }

    /// Held without a new edge.
    pub const fn hold(buttons: u8) -> Self {
        Self { held: buttons, pressed: 0 }
    }

    /// Whether any of `buttons` is held.
    #[inline]
    pub const fn is_held(&self, buttons: u8) -> bool {
        self.held & buttons != 0
    }

    /// Whether any of `buttons` went down this tick.
    #[inline]
    pub const fn is_pressed(&self, buttons: u8) -> bool {
        self.pressed & buttons != 0
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Held-mask change, stored only when the mask differs from the last one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this held mask began
    pub tick: u32,
    /// Raw held mask
    pub held: u8,
}

/// Errors reading a serialized recording.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// Bytes did not decode as a recording
    #[error("recording decode failed: {0}")]
    Decode(#[from] bincode::Error),

    /// Deltas were not in ascending tick order
    #[error("delta at tick {tick} is out of order")]
    OutOfOrder {
        /// Offending tick
        tick: u32,
    },
}

/// Delta-compressed pad recording.
///
/// Used for:
/// - Replay playback
/// - Determinism checks (replayed state must hash the same)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerInputBuffer {
    /// Starting tick (usually 0)
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    /// Only stores ticks where the held mask CHANGED.
    deltas: Vec<InputDelta>,

    /// Last recorded held mask (for delta comparison)
    #[serde(skip)]
    last_held: u8,
}

impl PlayerInputBuffer {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self {
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_held: 0,
        }
    }

    /// Record the raw held mask for a tick.
    pub fn record(&mut self, tick: u32, held: u8) {
        self.end_tick = tick;

        if held != self.last_held {
            self.deltas.push(InputDelta { tick, held });
            self.last_held = held;
        }
    }

    /// Held mask in effect at a tick.
    pub fn held_at(&self, tick: u32) -> u8 {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            0
        } else {
            self.deltas[idx - 1].held
        }
    }

    /// Input frame at a tick, with edges rebuilt from the previous tick.
    pub fn frame_at(&self, tick: u32) -> InputFrame {
        let previous = if tick > self.start_tick { self.held_at(tick - 1) } else { 0 };
        InputFrame::from_held(previous, self.held_at(tick))
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Finalize the buffer.
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = end_tick;
    }

    /// Serialize with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize with bincode, rejecting out-of-order deltas.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordingError> {
        let mut buffer: Self = bincode::deserialize(bytes)?;
        for pair in buffer.deltas.windows(2) {
            if pair[1].tick <= pair[0].tick {
                return Err(RecordingError::OutOfOrder { tick: pair[1].tick });
            }
        }
        buffer.last_held = buffer.deltas.last().map_or(0, |d| d.held);
        Ok(buffer)
    }

    /// Digest of the recorded deltas.
    pub fn digest(&self) -> StateHash {
        let mut hasher = StateHasher::new(HashDomain::Inputs);
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.held);
        }
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_from_held() {
        let frame = InputFrame::from_held(BUTTON_RIGHT, BUTTON_RIGHT | BUTTON_A);
        assert!(frame.is_held(BUTTON_RIGHT));
        assert!(frame.is_pressed(BUTTON_A));
        assert!(!frame.is_pressed(BUTTON_RIGHT));
        assert!(frame.is_pressed(BUTTONS_JUMP));
    }

    #[test]
    fn test_input_buffer_delta_compression() {
        let mut buffer = PlayerInputBuffer::new();

        for t in 0..4 {
            buffer.record(t, BUTTON_RIGHT);
        }
        assert_eq!(buffer.delta_count(), 1);

        buffer.record(4, BUTTON_RIGHT | BUTTON_C);
        assert_eq!(buffer.delta_count(), 2);
    }

    #[test]
    fn test_frame_at_rebuilds_edges() {
        let mut buffer = PlayerInputBuffer::new();
        buffer.record(10, BUTTON_LEFT);
        buffer.record(20, BUTTON_LEFT | BUTTON_B);
        buffer.finalize(30);

        assert_eq!(buffer.frame_at(5), InputFrame::new());
        assert!(buffer.frame_at(10).is_pressed(BUTTON_LEFT));
        assert!(!buffer.frame_at(11).is_pressed(BUTTON_LEFT));
        assert!(buffer.frame_at(20).is_pressed(BUTTON_B));
        assert_eq!(buffer.frame_at(25).held, BUTTON_LEFT | BUTTON_B);
    }

    #[test]
    fn test_recording_bytes_restore() {
        let mut buffer = PlayerInputBuffer::new();
        buffer.record(2, BUTTON_DOWN);
        buffer.record(9, 0);
        buffer.finalize(12);

        let bytes = buffer.to_bytes().unwrap();
        let restored = PlayerInputBuffer::from_bytes(&bytes).unwrap();
        assert_eq!(restored.deltas, buffer.deltas);
        assert_eq!(restored.digest(), buffer.digest());
    }

    #[test]
    fn test_recording_rejects_garbage() {
        assert!(PlayerInputBuffer::from_bytes(&[1, 2, 3]).is_err());
    }
}
