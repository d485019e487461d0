//! Asset formats embedded in the Dangerous Dave executable
//!
#![allow(clippy::cast_possible_truncation)] // Offsets and lengths are bounded by the format
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // VGA/DAC terms don't need backticks
//! This crate reads the graphics, level and text data that the original game
//! keeps at fixed offsets inside its executable, and writes the graphics back
//! out as ordinary bitmaps.
//!
//! # Supported Formats
//!
//! - **Byte sources**: positioned readers over a file or an in-memory buffer
//! - **RLE**: the run-length codec wrapping the VGA tile blob
//! - **Tile table**: offset table and per-tile size headers inside the blob
//! - **Palette**: 6-bit VGA DAC palette widened to 8-bit color
//! - **Bitmap**: 24-bit uncompressed top-down BMP container
//! - **Levels** and **text**: fixed-size records copied out verbatim
//! - **Level map**: all ten levels drawn from the tile bitmaps into one image
//!
//! # Example
//!
//! ```
//! use dave_formats::palette::{PALETTE_SIZE, Palette};
//! use dave_formats::rle;
//! use dave_formats::source::MemorySource;
//! use dave_formats::tiles::{TileImage, TileTable};
//!
//! // One 2x1 tile with an embedded size header
//! let mut buffer = Vec::new();
//! buffer.extend_from_slice(&1u32.to_le_bytes());
//! buffer.extend_from_slice(&8u32.to_le_bytes());
//! buffer.extend_from_slice(&[0x02, 0x00, 0x01, 0x00, 0x01, 0x02]);
//!
//! let blob = rle::compress(&buffer).unwrap();
//! let decompressed = rle::decompress(MemorySource::new(&blob)).unwrap();
//!
//! let table = TileTable::parse(&decompressed).unwrap();
//! let palette = Palette::from_vga(&[0x3F; PALETTE_SIZE]).unwrap();
//! let entry = table.entry(0, &decompressed).unwrap();
//! let image = TileImage::decode(&entry, &decompressed, &palette).unwrap();
//! assert_eq!((image.width, image.height), (2, 1));
//!
//! let bmp = image.to_bitmap().unwrap();
//! assert_eq!(&bmp[..2], b"BM");
//! ```

#![warn(missing_docs)]

pub mod bitmap;
pub mod error;
pub mod layout;
pub mod level;
pub mod map;
pub mod palette;
pub mod rle;
pub mod source;
pub mod text;
pub mod tiles;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use bitmap::{BitmapFile, ChannelOrder};
pub use error::{FormatError, FormatResult};
pub use level::{Level, TitleLevel};
pub use map::LevelMap;
pub use palette::{Palette, Rgb};
pub use source::{ByteSource, FileSource, MemorySource};
pub use tiles::{TileEntry, TileImage, TileTable};
