//! Compiled-in Sprite Resources
//!
//! Three read-only tables feed the animation and tile-streaming steps:
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ AnimationTable   │   │ DplcTable        │   │ TileAtlas        │
//! │ id → script      │   │ frame → entries  │   │ 32-byte tiles    │
//! │ [delay][cmds..]  │   │ [n][cnt|tile]..  │   │                  │
//! └──────────────────┘   └──────────────────┘   └──────────────────┘
//! ```
//!
//! Both indexed tables start with big-endian u16 offsets, one per entry,
//! measured from the start of the table. Offsets are validated when a table
//! is loaded; reads past the end of an entry surface as `DecodeError`.

use std::ops::Range;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{HashDomain, StateHash, StateHasher};

/// Bytes per 8×8 tile (4 bits per pixel).
pub const TILE_SIZE: usize = 32;

/// Opcode: loop to the first command.
pub const OP_RESTART: u8 = 0xFF;

/// Opcode: jump back by the following operand.
pub const OP_BACK: u8 = 0xFE;

/// Opcode: switch to the animation in the following operand.
pub const OP_CHANGE: u8 = 0xFD;

// =============================================================================
// ERRORS
// =============================================================================

/// Malformed animation or tile data.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecodeError {
    /// Table too short to hold its own header
    #[error("table header truncated ({len} bytes)")]
    TruncatedHeader {
        /// Table length
        len: usize,
    },

    /// Header offset outside the table
    #[error("entry {id} points at offset {offset:#x}, outside the table")]
    BadOffset {
        /// Entry index
        id: usize,
        /// Offending offset
        offset: usize,
    },

    /// No script with this id
    #[error("unknown animation {0:#04x}")]
    UnknownAnimation(u8),

    /// Command index past the end of a script
    #[error("animation {anim:#04x} has no command at index {index}")]
    ScriptOverrun {
        /// Animation id
        anim: u8,
        /// Command index
        index: usize,
    },

    /// Back-jump before the first command
    #[error("animation {anim:#04x} jumps back {by} from index {index}")]
    NegativeBackJump {
        /// Animation id
        anim: u8,
        /// Index of the back-jump opcode
        index: usize,
        /// Jump distance
        by: u8,
    },

    /// Opcode with no meaning
    #[error("animation {anim:#04x} has unknown opcode {opcode:#04x} at index {index}")]
    UnknownOpcode {
        /// Animation id
        anim: u8,
        /// Opcode value
        opcode: u8,
        /// Command index
        index: usize,
    },

    /// No tile manifest for this frame
    #[error("unknown tile manifest frame {0:#04x}")]
    UnknownFrame(u8),

    /// Manifest ends before its declared entries
    #[error("tile manifest for frame {frame:#04x} is truncated")]
    TruncatedManifest {
        /// Mapping frame
        frame: u8,
    },

    /// Manifest entry reads past the atlas
    #[error("tiles {first}..{end} are outside the {available}-tile atlas")]
    AtlasOverrun {
        /// First tile requested
        first: usize,
        /// One past the last tile requested
        end: usize,
        /// Tiles in the atlas
        available: usize,
    },

    /// Frame needs more tiles than the staging buffer holds
    #[error("frame {frame:#04x} needs {tiles} tiles, staging holds {capacity}")]
    StagingOverflow {
        /// Mapping frame
        frame: u8,
        /// Tiles required
        tiles: usize,
        /// Staging capacity in tiles
        capacity: usize,
    },
}

// =============================================================================
// OFFSET TABLES
// =============================================================================

#[inline]
fn read_be16(data: &[u8], at: usize) -> Option<usize> {
    Some(u16::from_be_bytes([*data.get(at)?, *data.get(at + 1)?]) as usize)
}

/// Validate an offset header and derive each entry's byte range. An entry
/// ends where the next higher entry begins.
fn entry_ranges(data: &[u8]) -> Result<Vec<Range<usize>>, DecodeError> {
    let header_end = read_be16(data, 0).ok_or(DecodeError::TruncatedHeader { len: data.len() })?;
    if header_end < 2 || header_end % 2 != 0 || header_end > data.len() {
        return Err(DecodeError::BadOffset { id: 0, offset: header_end });
    }

    let mut offsets = Vec::with_capacity(header_end / 2);
    for id in 0..header_end / 2 {
        let offset = read_be16(data, id * 2).ok_or(DecodeError::TruncatedHeader { len: data.len() })?;
        if offset < header_end || offset > data.len() {
            return Err(DecodeError::BadOffset { id, offset });
        }
        offsets.push(offset);
    }

    let mut starts = offsets.clone();
    starts.sort_unstable();
    starts.dedup();

    Ok(offsets
        .iter()
        .map(|&start| {
            let end = starts.iter().copied().find(|&s| s > start).unwrap_or(data.len());
            start..end
        })
        .collect())
}

/// Build an offset table from already encoded entries.
fn encode_table(entries: &[Vec<u8>]) -> Vec<u8> {
    let header = entries.len() * 2;
    let mut data = Vec::with_capacity(header + entries.iter().map(Vec::len).sum::<usize>());
    let mut offset = header;
    for entry in entries {
        data.extend_from_slice(&(offset as u16).to_be_bytes());
        offset += entry.len();
    }
    for entry in entries {
        data.extend_from_slice(entry);
    }
    data
}

// =============================================================================
// ANIMATION SCRIPTS
// =============================================================================

/// Player animation ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PlayerAnim {
    Walk = 0x00,
    Run = 0x01,
    Roll = 0x02,
    Roll2 = 0x03,
    Push = 0x04,
    Wait = 0x05,
    Balance = 0x06,
    LookUp = 0x07,
    Duck = 0x08,
    Warp1 = 0x09,
    Warp2 = 0x0A,
    Warp3 = 0x0B,
    Warp4 = 0x0C,
    Stop = 0x0D,
    Float1 = 0x0E,
    Float2 = 0x0F,
    Spring = 0x10,
    Hang = 0x11,
    Leap1 = 0x12,
    Leap2 = 0x13,
    Surf = 0x14,
    GetAir = 0x15,
    Burnt = 0x16,
    Drown = 0x17,
    Death = 0x18,
    Shrink = 0x19,
    Hurt = 0x1A,
    WaterSlide = 0x1B,
    Null = 0x1C,
}

impl PlayerAnim {
    /// Raw id.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// One animation script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Script<'a> {
    /// Animation id the script was looked up by
    pub id: u8,
    /// Per-frame delay; negative values select procedural playback
    pub delay: i8,
    commands: &'a [u8],
}

impl<'a> Script<'a> {
    /// Command at `index`.
    #[inline]
    pub fn command(&self, index: usize) -> Result<u8, DecodeError> {
        self.commands
            .get(index)
            .copied()
            .ok_or(DecodeError::ScriptOverrun { anim: self.id, index })
    }

    /// Number of command bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the script has no commands.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Animation scripts indexed by animation id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationTable {
    data: Vec<u8>,
    ranges: Vec<Range<usize>>,
}

impl AnimationTable {
    /// Load a table, validating its header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DecodeError> {
        let ranges = entry_ranges(&data)?;
        Ok(Self { data, ranges })
    }

    /// Encode scripts given as (delay, commands), in id order.
    pub fn from_scripts(scripts: &[(i8, &[u8])]) -> Self {
        let entries: Vec<Vec<u8>> = scripts
            .iter()
            .map(|(delay, commands)| {
                let mut entry = Vec::with_capacity(commands.len() + 1);
                entry.push(*delay as u8);
                entry.extend_from_slice(commands);
                entry
            })
            .collect();
        let data = encode_table(&entries);
        let header = entries.len() * 2;
        let mut ranges = Vec::with_capacity(entries.len());
        let mut offset = header;
        for entry in &entries {
            ranges.push(offset..offset + entry.len());
            offset += entry.len();
        }
        Self { data, ranges }
    }

    /// Number of animations.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the table has no animations.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Script for an animation id.
    pub fn script(&self, id: u8) -> Result<Script<'_>, DecodeError> {
        let range = self
            .ranges
            .get(id as usize)
            .ok_or(DecodeError::UnknownAnimation(id))?;
        let bytes = &self.data[range.clone()];
        let (&delay, commands) = bytes
            .split_first()
            .ok_or(DecodeError::ScriptOverrun { anim: id, index: 0 })?;
        Ok(Script { id, delay: delay as i8, commands })
    }

    /// Encoded table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// =============================================================================
// TILE MANIFESTS
// =============================================================================

/// One run of tiles to copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DplcEntry {
    /// Tiles in the run minus one (0..=15)
    pub count: u8,
    /// First tile in the atlas (12 bits)
    pub tile: u16,
}

impl DplcEntry {
    /// Tiles copied by this entry.
    #[inline]
    pub const fn tiles(&self) -> usize {
        self.count as usize + 1
    }

    /// Packed form: count in the high nibble.
    #[inline]
    pub const fn to_word(self) -> u16 {
        ((self.count as u16 & 0xF) << 12) | (self.tile & 0x0FFF)
    }

    /// Unpack a manifest word.
    #[inline]
    pub const fn from_word(word: u16) -> Self {
        Self { count: (word >> 12) as u8, tile: word & 0x0FFF }
    }
}

/// Tile manifests (dynamic pattern load cues) indexed by mapping frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DplcTable {
    data: Vec<u8>,
    ranges: Vec<Range<usize>>,
}

impl DplcTable {
    /// Load a table, validating its header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DecodeError> {
        let ranges = entry_ranges(&data)?;
        Ok(Self { data, ranges })
    }

    /// Encode manifests in frame order.
    pub fn from_frames(frames: &[Vec<DplcEntry>]) -> Self {
        let entries: Vec<Vec<u8>> = frames
            .iter()
            .map(|entries| {
                let mut bytes = Vec::with_capacity(1 + entries.len() * 2);
                bytes.push(entries.len() as u8);
                for entry in entries {
                    bytes.extend_from_slice(&entry.to_word().to_be_bytes());
                }
                bytes
            })
            .collect();
        let data = encode_table(&entries);
        // Freshly encoded offsets are always in range.
        let ranges = entry_ranges(&data).unwrap_or_default();
        Self { data, ranges }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the table has no frames.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Decoded entries for a frame.
    pub fn entries(&self, frame: u8) -> Result<Vec<DplcEntry>, DecodeError> {
        let range = self
            .ranges
            .get(frame as usize)
            .ok_or(DecodeError::UnknownFrame(frame))?;
        let bytes = &self.data[range.clone()];
        let (&count, words) = bytes
            .split_first()
            .ok_or(DecodeError::TruncatedManifest { frame })?;
        let needed = count as usize * 2;
        if words.len() < needed {
            return Err(DecodeError::TruncatedManifest { frame });
        }
        Ok(words[..needed]
            .chunks_exact(2)
            .map(|w| DplcEntry::from_word(u16::from_be_bytes([w[0], w[1]])))
            .collect())
    }

    /// Encoded table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Source art, a flat run of 32-byte tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileAtlas {
    data: Vec<u8>,
}

impl TileAtlas {
    /// Wrap raw tile data. A trailing partial tile is ignored.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Whole tiles available.
    pub fn tile_count(&self) -> usize {
        self.data.len() / TILE_SIZE
    }

    /// Bytes of `count` tiles starting at `first`.
    pub fn tiles(&self, first: usize, count: usize) -> Result<&[u8], DecodeError> {
        let end = first + count;
        if end > self.tile_count() {
            return Err(DecodeError::AtlasOverrun {
                first,
                end,
                available: self.tile_count(),
            });
        }
        Ok(&self.data[first * TILE_SIZE..end * TILE_SIZE])
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// =============================================================================
// BUILT-IN PLAYER SET
// =============================================================================

/// Mapping frames covered by the built-in manifest.
pub const BUILTIN_FRAME_COUNT: usize = 0x60;

/// Atlas tiles reserved per built-in frame.
const BUILTIN_TILES_PER_FRAME: usize = 8;

/// Delay values selecting procedural playback.
const WALK_RUN: i8 = -1;
const ROLLING: i8 = -2;
const PUSHING: i8 = -3;

const PLAYER_SCRIPTS: [(i8, &[u8]); 0x1D] = [
    (WALK_RUN, &[0x08, 0x09, 0x0A, 0x0B, 0x06, 0x07, OP_RESTART]),
    (WALK_RUN, &[0x1E, 0x1F, 0x20, 0x21, OP_RESTART]),
    (ROLLING, &[0x2E, 0x2F, 0x30, 0x31, 0x32, OP_RESTART]),
    (ROLLING, &[0x2E, 0x2F, 0x32, 0x30, 0x31, 0x32, OP_RESTART]),
    (PUSHING, &[0x45, 0x46, 0x47, 0x48, OP_RESTART]),
    (0x17, &[
        0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
        0x03, 0x02, 0x02, 0x02, 0x03, 0x04, OP_BACK, 2,
    ]),
    (0x1F, &[0x3A, 0x3B, OP_RESTART]),
    (0x3F, &[0x05, OP_RESTART]),
    (0x3F, &[0x39, OP_RESTART]),
    (0x3F, &[0x33, OP_RESTART]),
    (0x3F, &[0x34, OP_RESTART]),
    (0x3F, &[0x35, OP_RESTART]),
    (0x3F, &[0x36, OP_RESTART]),
    (0x07, &[0x37, 0x38, OP_RESTART]),
    (0x07, &[0x3C, 0x3F, OP_RESTART]),
    (0x07, &[0x3C, 0x3D, 0x53, 0x3E, 0x54, OP_RESTART]),
    (0x2F, &[0x40, OP_CHANGE, 0x00]),
    (0x04, &[0x41, 0x42, OP_RESTART]),
    (0x0F, &[0x43, 0x43, 0x43, OP_BACK, 1]),
    (0x0F, &[0x43, 0x44, OP_BACK, 1]),
    (0x3F, &[0x49, OP_RESTART]),
    (0x0B, &[0x56, 0x56, 0x0A, 0x0B, OP_CHANGE, 0x00]),
    (0x20, &[0x4B, OP_RESTART]),
    (0x2F, &[0x4C, OP_RESTART]),
    (0x03, &[0x4D, OP_RESTART]),
    (0x03, &[0x4E, 0x4F, 0x50, 0x51, 0x52, 0x00, OP_BACK, 1]),
    (0x03, &[0x55, OP_RESTART]),
    (0x07, &[0x55, 0x57, OP_RESTART]),
    (0x77, &[0x00, OP_CHANGE, 0x00]),
];

/// Everything the animation and tile steps read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteResources {
    /// Animation scripts
    pub animations: AnimationTable,
    /// Tile manifests
    pub dplc: DplcTable,
    /// Source art
    pub atlas: TileAtlas,
}

impl SpriteResources {
    /// Player scripts with a generated manifest and atlas.
    ///
    /// Frame 0 loads nothing; every other frame loads two runs from its own
    /// stretch of the atlas, and each atlas tile is filled with its index.
    pub fn builtin() -> Self {
        let animations = AnimationTable::from_scripts(&PLAYER_SCRIPTS);

        let frames: Vec<Vec<DplcEntry>> = (0..BUILTIN_FRAME_COUNT)
            .map(|frame| {
                if frame == 0 {
                    return Vec::new();
                }
                let base = (frame * BUILTIN_TILES_PER_FRAME) as u16;
                vec![
                    DplcEntry { count: (frame % 4) as u8, tile: base },
                    DplcEntry { count: 1, tile: base + 4 },
                ]
            })
            .collect();
        let dplc = DplcTable::from_frames(&frames);

        let tiles = BUILTIN_FRAME_COUNT * BUILTIN_TILES_PER_FRAME;
        let atlas = TileAtlas::new(
            (0..tiles)
                .flat_map(|t| std::iter::repeat(t as u8).take(TILE_SIZE))
                .collect(),
        );

        Self { animations, dplc, atlas }
    }

    /// Digest of all three tables.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::new(HashDomain::Resources);
        hasher.update_table(self.animations.as_bytes());
        hasher.update_table(self.dplc.as_bytes());
        hasher.update_table(self.atlas.as_bytes());
        hasher.finalize()
    }
}

impl Default for SpriteResources {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scripts_load() {
        let res = SpriteResources::builtin();
        assert_eq!(res.animations.len(), 0x1D);

        let walk = res.animations.script(PlayerAnim::Walk.id()).unwrap();
        assert_eq!(walk.delay, -1);
        assert_eq!(walk.command(0).unwrap(), 0x08);

        let wait = res.animations.script(PlayerAnim::Wait.id()).unwrap();
        assert_eq!(wait.delay, 0x17);
        assert_eq!(wait.command(18).unwrap(), OP_BACK);
        assert!(wait.command(20).is_err());

        assert_eq!(
            res.animations.script(0x40),
            Err(DecodeError::UnknownAnimation(0x40))
        );
    }

    #[test]
    fn test_bytes_reload_matches() {
        let res = SpriteResources::builtin();
        let reloaded = AnimationTable::from_bytes(res.animations.as_bytes().to_vec()).unwrap();
        assert_eq!(reloaded, res.animations);

        let dplc = DplcTable::from_bytes(res.dplc.as_bytes().to_vec()).unwrap();
        assert_eq!(dplc.entries(5).unwrap(), res.dplc.entries(5).unwrap());
    }

    #[test]
    fn test_header_validation() {
        assert_eq!(
            AnimationTable::from_bytes(vec![0x00]),
            Err(DecodeError::TruncatedHeader { len: 1 })
        );
        // Second offset points past the end
        assert_eq!(
            AnimationTable::from_bytes(vec![0x00, 0x04, 0x00, 0x40, 0x05, 0x01]),
            Err(DecodeError::BadOffset { id: 1, offset: 0x40 })
        );
        // Odd header length
        assert!(AnimationTable::from_bytes(vec![0x00, 0x03, 0x00]).is_err());
    }

    #[test]
    fn test_shared_offsets_get_full_range() {
        // Two ids share one script
        let data = vec![0x00, 0x04, 0x00, 0x04, 0x05, 0x01, 0x02, 0xFF];
        let table = AnimationTable::from_bytes(data).unwrap();
        let (first, second) = (table.script(0).unwrap(), table.script(1).unwrap());
        assert_eq!((first.id, second.id), (0, 1));
        assert_eq!(first.delay, second.delay);
        assert_eq!(first.commands, second.commands);
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_dplc_entries() {
        let res = SpriteResources::builtin();
        assert!(res.dplc.entries(0).unwrap().is_empty());

        let entries = res.dplc.entries(6).unwrap();
        assert_eq!(entries[0], DplcEntry { count: 2, tile: 48 });
        assert_eq!(entries[0].tiles(), 3);
        assert_eq!(entries[1].tiles(), 2);

        assert_eq!(
            res.dplc.entries(BUILTIN_FRAME_COUNT as u8),
            Err(DecodeError::UnknownFrame(BUILTIN_FRAME_COUNT as u8))
        );
    }

    #[test]
    fn test_truncated_manifest() {
        // One frame declaring two entries but holding one
        let table = DplcTable::from_bytes(vec![0x00, 0x02, 0x02, 0x10, 0x05]).unwrap();
        assert_eq!(table.entries(0), Err(DecodeError::TruncatedManifest { frame: 0 }));
    }

    #[test]
    fn test_dplc_word_packing() {
        let entry = DplcEntry::from_word(0x3123);
        assert_eq!(entry, DplcEntry { count: 3, tile: 0x123 });
        assert_eq!(entry.to_word(), 0x3123);
    }

    #[test]
    fn test_atlas_bounds() {
        let atlas = TileAtlas::new(vec![0; TILE_SIZE * 4 + 5]);
        assert_eq!(atlas.tile_count(), 4);
        assert_eq!(atlas.tiles(1, 3).unwrap().len(), TILE_SIZE * 3);
        assert_eq!(
            atlas.tiles(2, 3),
            Err(DecodeError::AtlasOverrun { first: 2, end: 5, available: 4 })
        );
    }

    #[test]
    fn test_fingerprint_stable() {
        assert_eq!(
            SpriteResources::builtin().fingerprint(),
            SpriteResources::builtin().fingerprint()
        );
    }
}
