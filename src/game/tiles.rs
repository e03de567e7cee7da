//! Differential Tile Streaming
//!
//! The player's art does not fit in video memory all at once, so only the
//! tiles of the current mapping frame are staged. `TileStreamer` remembers
//! the last frame it staged and does nothing until the frame changes.
//!
//! ```text
//!  frame ──► DplcTable ──► [(count, tile), ...] ──► TileAtlas ──► staging
//!    │                                                              │
//!    └──────────── same as last_frame? skip ─────────────┘  changed = true
//! ```
//!
//! A frame is validated in full before a single byte is copied, so a bad
//! manifest leaves the previous frame's tiles staged.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::resources::{DecodeError, DplcEntry, DplcTable, TileAtlas, TILE_SIZE};

/// Tiles the staging buffer holds.
pub const STAGING_TILES: usize = 23;

/// Staging buffer size in bytes.
pub const STAGING_BYTES: usize = STAGING_TILES * TILE_SIZE;

/// Per-object tile loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStreamer {
    last_frame: Option<u8>,
    staging: Vec<u8>,
    loaded_tiles: usize,
    changed: bool,
}

impl TileStreamer {
    /// Empty loader; the first update always stages.
    pub fn new() -> Self {
        Self {
            last_frame: None,
            staging: vec![0; STAGING_BYTES],
            loaded_tiles: 0,
            changed: false,
        }
    }

    /// Stage the tiles of `frame` if it differs from the last staged frame.
    ///
    /// Returns whether anything was copied. On error the loader is left
    /// exactly as it was, so the same frame is retried next tick.
    pub fn update(&mut self, frame: u8, dplc: &DplcTable, atlas: &TileAtlas) -> Result<bool, DecodeError> {
        if self.last_frame == Some(frame) {
            return Ok(false);
        }

        let entries = dplc.entries(frame)?;
        let tiles: usize = entries.iter().map(DplcEntry::tiles).sum();
        if tiles > STAGING_TILES {
            return Err(DecodeError::StagingOverflow {
                frame,
                tiles,
                capacity: STAGING_TILES,
            });
        }

        let sources = entries
            .iter()
            .map(|e| atlas.tiles(e.tile as usize, e.tiles()))
            .collect::<Result<Vec<_>, _>>()?;

        self.last_frame = Some(frame);
        if sources.is_empty() {
            return Ok(false);
        }

        let mut offset = 0;
        for src in sources {
            self.staging[offset..offset + src.len()].copy_from_slice(src);
            offset += src.len();
        }
        self.loaded_tiles = tiles;
        self.changed = true;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(frame, tiles, "staged frame tiles");

        Ok(true)
    }

    /// Frame whose tiles are staged.
    pub fn last_frame(&self) -> Option<u8> {
        self.last_frame
    }

    /// Loaded bytes if they changed since the last call.
    pub fn take_changed(&mut self) -> Option<&[u8]> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(&self.staging[..self.loaded_tiles * TILE_SIZE])
    }

    /// Feed the memo and any not-yet-taken upload into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        match self.last_frame {
            Some(frame) => {
                hasher.update_bool(true);
                hasher.update_u8(frame);
            }
            None => hasher.update_bool(false),
        }
        hasher.update_bool(self.changed);
        hasher.update_table(&self.staging[..self.loaded_tiles * TILE_SIZE]);
    }
}

impl Default for TileStreamer {
    fn default() -> Self {
        Self::new()
    }
}
