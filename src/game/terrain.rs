//! Terrain Sampling
//!
//! The level owner answers one question for the collision code: how much
//! solid material is in the 16×16 block under a pixel, seen from a given
//! direction. `TerrainSampler` is that seam; `BlockTerrain` is a small
//! in-memory grid used by the demo binary and tests.
//!
//! ## Extent
//!
//! ```text
//!   probe travelling Down          probe travelling Right
//!   ┌────────────────┐             ┌────────────────┐
//!   │                │             │          ██████│
//!   │        ████████│  extent     │          ██████│  extent = 6
//!   │   █████████████│  = column   │          ██████│  (solid run
//!   │████████████████│  height     │          ██████│   from the
//!   └────────────────┘             └────────────────┘   right edge)
//! ```
//!
//! The extent counts solid pixels from the block edge the probe travels
//! toward. 0 means empty, 16 means the whole column/row is solid.

use serde::{Serialize, Deserialize};

use crate::core::angle::Direction;

/// Block edge length in pixels.
pub const BLOCK_SIZE: i16 = 16;

/// Which solidity bit a probe respects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolidLayer {
    /// Blocks solid from the top only (floors, one-way platforms)
    Top,
    /// Blocks solid on every side (walls, ceilings)
    Full,
}

/// One column or row of a block as seen by a probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSample {
    /// Solid pixels from the far edge (0..=16)
    pub extent: u8,
    /// Surface angle of the block
    pub angle: u8,
}

impl BlockSample {
    /// Nothing solid.
    pub const EMPTY: Self = Self { extent: 0, angle: 0 };
}

/// Terrain height/flags lookup owned by the level.
pub trait TerrainSampler {
    /// Sample the block containing pixel (x, y) for a probe travelling in
    /// `direction`, honouring the `layer` solidity bit.
    fn query(&self, x: i16, y: i16, direction: Direction, layer: SolidLayer) -> BlockSample;
}

// =============================================================================
// BLOCK TERRAIN
// =============================================================================

/// Shape of a 16×16 collision block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Height of each column, measured up from the block's bottom edge
    pub heights: [u8; 16],
    /// Surface angle
    pub angle: u8,
    /// Solid to floor probes
    pub top_solid: bool,
    /// Solid to wall and ceiling probes
    pub side_solid: bool,
}

impl Block {
    /// Fully solid square.
    pub const fn full() -> Self {
        Self { heights: [16; 16], angle: 0, top_solid: true, side_solid: true }
    }

    /// Slope rising by `rise` pixels every `run` columns from `base`.
    ///
    /// Negative rise descends to the right. `angle` is the surface angle the
    /// level designer assigns to it.
    pub fn slope(base: u8, rise: i8, run: u8, angle: u8) -> Self {
        let mut heights = [0u8; 16];
        let run = run.max(1) as i16;
        for (col, h) in heights.iter_mut().enumerate() {
            let value = base as i16 + (col as i16 / run) * rise as i16;
            *h = value.clamp(0, 16) as u8;
        }
        Self { heights, angle, top_solid: true, side_solid: true }
    }

    /// Platform solid only from above.
    pub const fn one_way(height: u8) -> Self {
        Self { heights: [height; 16], angle: 0, top_solid: true, side_solid: false }
    }

    #[inline]
    fn solid_at(&self, col: usize, row: usize) -> bool {
        self.heights[col] as usize >= BLOCK_SIZE as usize - row
    }

    fn extent(&self, col: usize, row: usize, direction: Direction) -> u8 {
        let h = self.heights[col];
        match direction {
            Direction::Down => h,
            Direction::Up => {
                if h > 0 { 16 } else { 0 }
            }
            Direction::Right => self.run_length(row, (0..16).rev()),
            Direction::Left => self.run_length(row, 0..16),
        }
    }

    /// Solid run from the first column of `cols`; a row with solid pixels
    /// that do not touch that edge counts as fully solid.
    fn run_length(&self, row: usize, cols: impl Iterator<Item = usize> + Clone) -> u8 {
        let run = cols.clone().take_while(|&c| self.solid_at(c, row)).count() as u8;
        if run == 0 && cols.into_iter().any(|c| self.solid_at(c, row)) {
            16
        } else {
            run
        }
    }
}

/// In-memory grid of collision blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockTerrain {
    width: usize,
    height: usize,
    blocks: Vec<Block>,
    cells: Vec<Option<u16>>,
}

impl BlockTerrain {
    /// Empty terrain `width` × `height` blocks.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocks: Vec::new(),
            cells: vec![None; width * height],
        }
    }

    /// Register a block shape and return its id.
    pub fn define(&mut self, block: Block) -> u16 {
        self.blocks.push(block);
        (self.blocks.len() - 1) as u16
    }

    /// Place a block shape in a cell. Out-of-range cells are ignored.
    pub fn place(&mut self, bx: usize, by: usize, id: u16) {
        if bx < self.width && by < self.height {
            self.cells[by * self.width + bx] = Some(id);
        }
    }

    /// Fill block rows `from_row..` across the whole width.
    pub fn fill_rows(&mut self, from_row: usize, id: u16) {
        for by in from_row..self.height {
            for bx in 0..self.width {
                self.place(bx, by, id);
            }
        }
    }

    /// Flat ground whose surface is the top of block row `ground_row`.
    pub fn flat(width: usize, height: usize, ground_row: usize) -> Self {
        let mut terrain = Self::new(width, height);
        let full = terrain.define(Block::full());
        terrain.fill_rows(ground_row, full);
        terrain
    }

    fn block_at(&self, x: i16, y: i16) -> Option<&Block> {
        if x < 0 || y < 0 {
            return None;
        }
        let (bx, by) = ((x / BLOCK_SIZE) as usize, (y / BLOCK_SIZE) as usize);
        if bx >= self.width || by >= self.height {
            return None;
        }
        let id = self.cells[by * self.width + bx]?;
        self.blocks.get(id as usize)
    }
}

impl TerrainSampler for BlockTerrain {
    fn query(&self, x: i16, y: i16, direction: Direction, layer: SolidLayer) -> BlockSample {
        let Some(block) = self.block_at(x, y) else {
            return BlockSample::EMPTY;
        };
        let solid = match layer {
            SolidLayer::Top => block.top_solid,
            SolidLayer::Full => block.side_solid,
        };
        if !solid {
            return BlockSample::EMPTY;
        }
        let (col, row) = ((x & 15) as usize, (y & 15) as usize);
        BlockSample {
            extent: block.extent(col, row, direction),
            angle: block.angle,
        }
    }
}
