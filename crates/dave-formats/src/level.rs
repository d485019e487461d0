//! Level records
//!
//! The executable stores ten levels back to back. Each record is a 256-byte
//! monster path table, a 100x10 grid of tile indices and 24 bytes of padding.
//! The title screen has its own, shorter tile grid.

use tracing::trace;

use crate::error::FormatResult;
use crate::source::ByteSource;

/// Number of playable levels
pub const LEVEL_COUNT: usize = 10;

/// Size of the monster path table
pub const LEVEL_PATH_SIZE: usize = 256;

/// Grid width in tiles
pub const LEVEL_WIDTH: usize = 100;

/// Grid height in tiles
pub const LEVEL_HEIGHT: usize = 10;

/// Size of the tile grid
pub const LEVEL_TILES_SIZE: usize = LEVEL_WIDTH * LEVEL_HEIGHT;

/// Trailing padding of each record
pub const LEVEL_PADDING_SIZE: usize = 24;

/// Size of one level record
pub const LEVEL_SIZE: usize = LEVEL_PATH_SIZE + LEVEL_TILES_SIZE + LEVEL_PADDING_SIZE;

/// Size of the title screen tile grid
pub const TITLE_TILES_SIZE: usize = 70;

/// One level record, kept byte-for-byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    /// Monster movement table
    pub path: [u8; LEVEL_PATH_SIZE],
    /// Tile indices, row-major
    pub tiles: [u8; LEVEL_TILES_SIZE],
    /// Unused trailing bytes
    pub padding: [u8; LEVEL_PADDING_SIZE],
}

impl Level {
    /// Read a record at the source's current position
    pub fn read<S: ByteSource>(mut source: S) -> FormatResult<Self> {
        let offset = source.position();

        let mut path = [0u8; LEVEL_PATH_SIZE];
        let mut tiles = [0u8; LEVEL_TILES_SIZE];
        let mut padding = [0u8; LEVEL_PADDING_SIZE];
        source.read_exact(&mut path)?;
        source.read_exact(&mut tiles)?;
        source.read_exact(&mut padding)?;

        trace!("Read level record at {offset:#x}");
        Ok(Self {
            path,
            tiles,
            padding,
        })
    }

    /// Read all ten records at the source's current position
    pub fn read_all<S: ByteSource>(mut source: S) -> FormatResult<Vec<Self>> {
        (0..LEVEL_COUNT).map(|_| Self::read(&mut source)).collect()
    }

    /// Tile index at grid position `(x, y)`
    pub fn tile_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= LEVEL_WIDTH || y >= LEVEL_HEIGHT {
            return None;
        }
        Some(self.tiles[y * LEVEL_WIDTH + x])
    }

    /// The record exactly as stored
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(LEVEL_SIZE);
        data.extend_from_slice(&self.path);
        data.extend_from_slice(&self.tiles);
        data.extend_from_slice(&self.padding);
        data
    }
}

/// Tile grid of the title screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLevel {
    /// Tile indices
    pub tiles: [u8; TITLE_TILES_SIZE],
}

impl TitleLevel {
    /// Read the grid at the source's current position
    pub fn read<S: ByteSource>(mut source: S) -> FormatResult<Self> {
        let mut tiles = [0u8; TITLE_TILES_SIZE];
        source.read_exact(&mut tiles)?;
        Ok(Self { tiles })
    }

    /// The grid exactly as stored
    pub fn to_bytes(&self) -> Vec<u8> {
        self.tiles.to_vec()
    }
}
