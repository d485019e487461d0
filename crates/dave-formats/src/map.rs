//! Overview image of all levels
//!
//! Every level is drawn as a 100x10 grid of 16x16 cells and the ten levels
//! are stacked vertically, giving one 1600x1600 picture. Cells take their
//! pixels from the tile bitmaps; larger tiles are clipped to the cell and
//! cells without a tile stay black.

use tracing::trace;

use crate::bitmap::{self, BitmapFile, ChannelOrder};
use crate::error::FormatResult;
use crate::level::{LEVEL_COUNT, LEVEL_HEIGHT, LEVEL_WIDTH, Level};

/// Edge length of one grid cell in pixels
pub const CELL_SIZE: u32 = 16;

/// Width of the composite image
pub const MAP_WIDTH: u32 = LEVEL_WIDTH as u32 * CELL_SIZE;

/// Height of the composite image
pub const MAP_HEIGHT: u32 = (LEVEL_COUNT * LEVEL_HEIGHT) as u32 * CELL_SIZE;

/// BGRA canvas holding every level side by side with its neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    pixels: Vec<u8>,
}

impl Default for LevelMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelMap {
    /// Black canvas
    pub fn new() -> Self {
        Self {
            pixels: vec![0; MAP_WIDTH as usize * MAP_HEIGHT as usize * 4],
        }
    }

    /// Draw `levels` using `tile` to look up the bitmap for a tile index.
    ///
    /// Level `k` occupies rows `k * 160..(k + 1) * 160`. Levels past the
    /// tenth are ignored.
    pub fn compose<'a, F>(levels: &[Level], mut tile: F) -> Self
    where
        F: FnMut(u8) -> Option<&'a BitmapFile>,
    {
        let mut map = Self::new();
        for (k, level) in levels.iter().take(LEVEL_COUNT).enumerate() {
            for y in 0..LEVEL_HEIGHT {
                for x in 0..LEVEL_WIDTH {
                    let Some(index) = level.tile_at(x, y) else {
                        continue;
                    };
                    let px = x as u32 * CELL_SIZE;
                    let py = (k * LEVEL_HEIGHT + y) as u32 * CELL_SIZE;
                    match tile(index) {
                        Some(bmp) => map.blit(bmp, px, py),
                        None => trace!("Level {k} cell ({x}, {y}): no bitmap for tile {index}"),
                    }
                }
            }
        }
        map
    }

    /// Copy `tile` with its top-left corner at `(x, y)`, clipped to one cell
    /// and to the canvas
    pub fn blit(&mut self, tile: &BitmapFile, x: u32, y: u32) {
        let w = tile.width().min(CELL_SIZE).min(MAP_WIDTH.saturating_sub(x));
        let h = tile.height().min(CELL_SIZE).min(MAP_HEIGHT.saturating_sub(y));

        for ty in 0..h {
            for tx in 0..w {
                if let Some([b, g, r]) = tile.pixel(tx, ty) {
                    let p = ((y + ty) as usize * MAP_WIDTH as usize + (x + tx) as usize) * 4;
                    self.pixels[p..p + 4].copy_from_slice(&[b, g, r, 0xFF]);
                }
            }
        }
    }

    /// B, G, R, A at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= MAP_WIDTH || y >= MAP_HEIGHT {
            return None;
        }
        let p = (y as usize * MAP_WIDTH as usize + x as usize) * 4;
        self.pixels
            .get(p..p + 4)
            .map(|bgra| [bgra[0], bgra[1], bgra[2], bgra[3]])
    }

    /// Raw BGRA rows
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode as a 24-bit top-down bitmap
    pub fn to_bitmap(&self) -> FormatResult<Vec<u8>> {
        bitmap::encode(&self.pixels, MAP_WIDTH, MAP_HEIGHT, &ChannelOrder::bgra())
    }
}
