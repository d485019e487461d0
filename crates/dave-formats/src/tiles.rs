//! Tile table inside the decompressed VGA blob
//!
//! Layout of the decompressed buffer:
//!
//! ```text
//! [u32 tile_count][tile_count x u32 offset][tile payloads...]
//! ```
//!
//! Offsets are absolute positions in the buffer. The buffer length is
//! appended as a sentinel, so tile `i` spans `offsets[i]..offsets[i + 1]`.
//!
//! Payloads are palette indices, one byte per pixel. Most tiles are 16x16.
//! Sprites with other sizes start with a `[width, 0, height, 0]` header that
//! is detected by value ranges rather than flagged explicitly.

use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::bitmap::{self, ChannelOrder};
use crate::error::{FormatError, FormatResult};
use crate::palette::Palette;
use crate::source::{ByteSource, MemorySource};

/// Width used when a tile has no embedded header
pub const DEFAULT_TILE_WIDTH: u16 = 16;

/// Height used when a tile has no embedded header
pub const DEFAULT_TILE_HEIGHT: u16 = 16;

/// Offsets above this value point one byte before the real payload
pub const OFFSET_QUIRK_THRESHOLD: u32 = 0xFF00;

/// Size of an embedded `[width, 0, height, 0]` header
pub const TILE_HEADER_SIZE: usize = 4;

/// Header widths must be below this value
const HEADER_WIDTH_LIMIT: u8 = 0xBF;

/// Header heights must be below this value
const HEADER_HEIGHT_LIMIT: u8 = 0x64;

/// Offset table of a decompressed VGA blob, sentinel included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTable {
    offsets: Vec<u32>,
}

impl TileTable {
    /// Parse the table at the start of a decompressed buffer.
    ///
    /// The buffer length becomes the sentinel offset.
    pub fn parse(buffer: &[u8]) -> FormatResult<Self> {
        let total = u32::try_from(buffer.len())
            .map_err(|_| FormatError::InputTooLarge(buffer.len()))?;
        Self::read(MemorySource::new(buffer), total)
    }

    /// Read a tile count and offset table from `source`, closing it with
    /// `total_len` as the sentinel
    pub fn read<S: ByteSource>(mut source: S, total_len: u32) -> FormatResult<Self> {
        let count = source.read_u32_le()? as usize;
        debug!("Tile table declares {count} tiles");

        // Cap the reservation so a bogus count fails on read instead of
        // allocating up front
        let mut offsets = Vec::with_capacity(count.min(total_len as usize / 4) + 1);
        for _ in 0..count {
            offsets.push(source.read_u32_le()?);
        }
        offsets.push(total_len);

        Ok(Self { offsets })
    }

    /// Build a table directly from offsets and the sentinel
    pub fn from_offsets(mut offsets: Vec<u32>, total_len: u32) -> Self {
        offsets.push(total_len);
        Self { offsets }
    }

    /// Number of tiles
    pub fn tile_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Whether the table holds no tiles
    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    /// Raw offsets followed by the sentinel
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Resolve the payload range and dimensions of tile `index` in `buffer`
    pub fn entry(&self, index: usize, buffer: &[u8]) -> FormatResult<TileEntry> {
        if index >= self.tile_count() {
            return Err(FormatError::TileIndexOutOfRange(index, self.tile_count()));
        }

        let raw = self.offsets[index];
        let mut start = raw as usize;
        if raw > OFFSET_QUIRK_THRESHOLD {
            start += 1;
        }
        let end = self.offsets[index + 1] as usize;

        if end > buffer.len() {
            return Err(FormatError::TileOutOfRange {
                index,
                start,
                end,
                len: buffer.len(),
            });
        }

        if start > end {
            warn!("Tile {index} starts at {start:#x} past its end {end:#x}, treating as empty");
            return Ok(TileEntry {
                index,
                range: end..end,
                width: u32::from(DEFAULT_TILE_WIDTH),
                height: u32::from(DEFAULT_TILE_HEIGHT),
                has_header: false,
            });
        }

        // Header bytes may run into the next tile, but never past the buffer
        let header = buffer
            .get(start..start + TILE_HEADER_SIZE)
            .and_then(detect_header);

        let entry = match header {
            Some((width, height)) => TileEntry {
                index,
                range: (start + TILE_HEADER_SIZE).min(end)..end,
                width: u32::from(width),
                height: u32::from(height),
                has_header: true,
            },
            None => {
                trace!("Tile {index} has no size header, using default size");
                TileEntry {
                    index,
                    range: start..end,
                    width: u32::from(DEFAULT_TILE_WIDTH),
                    height: u32::from(DEFAULT_TILE_HEIGHT),
                    has_header: false,
                }
            }
        };

        trace!(
            "Tile {index}: {}x{} payload {:#x}..{:#x}",
            entry.width, entry.height, entry.range.start, entry.range.end
        );
        Ok(entry)
    }

    /// Resolve every tile in index order
    pub fn entries<'a>(
        &'a self,
        buffer: &'a [u8],
    ) -> impl Iterator<Item = FormatResult<TileEntry>> + 'a {
        (0..self.tile_count()).map(move |index| self.entry(index, buffer))
    }
}

/// Recognize an embedded `[width, 0, height, 0]` header.
///
/// Returns `None` unless both padding bytes are zero, the width is in
/// `1..0xBF` and the height is in `1..0x64`.
pub fn detect_header(bytes: &[u8]) -> Option<(u8, u8)> {
    let &[width, 0, height, 0, ..] = bytes else {
        return None;
    };

    let width_ok = width > 0 && width < HEADER_WIDTH_LIMIT;
    let height_ok = height > 0 && height < HEADER_HEIGHT_LIMIT;
    (width_ok && height_ok).then_some((width, height))
}

/// Resolved location and size of one tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntry {
    /// Position in the tile table
    pub index: usize,
    /// Pixel payload within the decompressed buffer, header excluded
    pub range: Range<usize>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether the size came from an embedded header
    pub has_header: bool,
}

impl TileEntry {
    /// Pixel payload of this tile within `buffer`
    pub fn payload<'a>(&self, buffer: &'a [u8]) -> FormatResult<&'a [u8]> {
        buffer
            .get(self.range.clone())
            .ok_or(FormatError::TileOutOfRange {
                index: self.index,
                start: self.range.start,
                end: self.range.end,
                len: buffer.len(),
            })
    }

    /// Number of pixels the dimensions call for
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A decoded tile: dimensions plus opaque BGRA pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Four bytes per pixel in B, G, R, A order
    pub pixels: Vec<u8>,
}

impl TileImage {
    /// Map an indexed payload through `palette`
    pub fn from_indexed(width: u32, height: u32, payload: &[u8], palette: &Palette) -> Self {
        Self {
            width,
            height,
            pixels: palette.indexed_to_bgra(payload),
        }
    }

    /// Decode tile `entry` from `buffer`
    pub fn decode(entry: &TileEntry, buffer: &[u8], palette: &Palette) -> FormatResult<Self> {
        let payload = entry.payload(buffer)?;
        Ok(Self::from_indexed(entry.width, entry.height, payload, palette))
    }

    /// Encode as a 24-bit top-down bitmap
    pub fn to_bitmap(&self) -> FormatResult<Vec<u8>> {
        bitmap::encode(&self.pixels, self.width, self.height, &ChannelOrder::bgra())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{gray_palette, tile_buffer};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_tile_and_sentinel() {
        // tile_count = 2, offsets = [8, 8], sentinel 12
        let buffer = [2, 0, 0, 0, 8, 0, 0, 0, 8, 0, 0, 0];
        let table = TileTable::parse(&buffer).unwrap();
        assert_eq!(table.tile_count(), 2);
        assert_eq!(table.offsets(), &[8, 8, 12]);

        let tile0 = table.entry(0, &buffer).unwrap();
        assert_eq!(tile0.range, 8..8);
        assert!(tile0.payload(&buffer).unwrap().is_empty());

        let tile1 = table.entry(1, &buffer).unwrap();
        assert_eq!(tile1.range, 8..12);
        assert!(!tile1.has_header);
    }

    #[test]
    fn test_embedded_header() {
        let mut payload = vec![0x05, 0x00, 0x03, 0x00];
        payload.extend(1..=15u8);
        let buffer = tile_buffer(&[payload]);

        let table = TileTable::parse(&buffer).unwrap();
        let entry = table.entry(0, &buffer).unwrap();
        assert_eq!((entry.width, entry.height), (5, 3));
        assert!(entry.has_header);
        assert_eq!(entry.range, 12..27);
        assert_eq!(entry.payload(&buffer).unwrap(), (1..=15u8).collect::<Vec<_>>());
        assert_eq!(entry.pixel_count(), 15);
    }

    #[test]
    fn test_header_not_recognized() {
        let payload = vec![0xFF, 0x01, 0x10, 0x00, 0x22];
        let buffer = tile_buffer(&[payload]);

        let table = TileTable::parse(&buffer).unwrap();
        let entry = table.entry(0, &buffer).unwrap();
        assert_eq!((entry.width, entry.height), (16, 16));
        assert!(!entry.has_header);
        assert_eq!(entry.range, 8..13);
    }

    #[test]
    fn test_detect_header_ranges() {
        assert_eq!(detect_header(&[0x01, 0, 0x01, 0]), Some((1, 1)));
        assert_eq!(detect_header(&[0xBE, 0, 0x63, 0]), Some((0xBE, 0x63)));
        assert_eq!(detect_header(&[0xBF, 0, 0x10, 0]), None);
        assert_eq!(detect_header(&[0x10, 0, 0x64, 0]), None);
        assert_eq!(detect_header(&[0x00, 0, 0x10, 0]), None);
        assert_eq!(detect_header(&[0x10, 0, 0x00, 0]), None);
        assert_eq!(detect_header(&[0x10, 0, 0x10, 1]), None);
        assert_eq!(detect_header(&[0x10, 0, 0x10]), None);
    }

    #[test]
    fn test_short_tile_takes_header_from_next_bytes() {
        // A 2-byte tile whose first bytes plus the next tile's read as a header
        let buffer = tile_buffer(&[vec![0x04, 0x00], vec![0x02, 0x00, 0x02, 0x00, 1, 2, 3, 4]]);
        let table = TileTable::parse(&buffer).unwrap();

        let first = table.entry(0, &buffer).unwrap();
        assert!(first.has_header);
        assert_eq!((first.width, first.height), (4, 2));
        assert_eq!(first.range, 14..14);
        assert!(first.payload(&buffer).unwrap().is_empty());

        let second = table.entry(1, &buffer).unwrap();
        assert!(second.has_header);
        assert_eq!((second.width, second.height), (2, 2));
        assert_eq!(second.range, 18..22);
    }

    #[test]
    fn test_header_read_stops_at_buffer_end() {
        // Only two bytes left, so no header can be read
        let buffer = tile_buffer(&[vec![0x04, 0x00]]);
        let table = TileTable::parse(&buffer).unwrap();

        let entry = table.entry(0, &buffer).unwrap();
        assert!(!entry.has_header);
        assert_eq!((entry.width, entry.height), (16, 16));
        assert_eq!(entry.range, 8..10);
    }

    #[test]
    fn test_offset_quirk_above_threshold() {
        let mut buffer = vec![0u8; 0xFF10];
        buffer[..4].copy_from_slice(&1u32.to_le_bytes());
        buffer[4..8].copy_from_slice(&0xFF01u32.to_le_bytes());
        // Header sits one byte after the stored offset
        buffer[0xFF02..0xFF06].copy_from_slice(&[0x02, 0x00, 0x01, 0x00]);

        let table = TileTable::parse(&buffer).unwrap();
        let entry = table.entry(0, &buffer).unwrap();
        assert!(entry.has_header);
        assert_eq!((entry.width, entry.height), (2, 1));
        assert_eq!(entry.range, 0xFF06..0xFF10);
    }

    #[test]
    fn test_offset_at_threshold_is_not_adjusted() {
        let table = TileTable::from_offsets(vec![0xFF00], 0xFF08);
        let buffer = vec![0u8; 0xFF08];
        let entry = table.entry(0, &buffer).unwrap();
        assert_eq!(entry.range, 0xFF00..0xFF08);
    }

    #[test]
    fn test_range_outside_buffer() {
        let table = TileTable::from_offsets(vec![4], 64);
        let err = table.entry(0, &[0u8; 16]).unwrap_err();
        assert!(
            matches!(
                err,
                FormatError::TileOutOfRange {
                    index: 0,
                    end: 64,
                    len: 16,
                    ..
                }
            ),
            "actual error: {err:?}"
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let buffer = tile_buffer(&[vec![1, 2, 3]]);
        let table = TileTable::parse(&buffer).unwrap();
        assert!(matches!(
            table.entry(1, &buffer),
            Err(FormatError::TileIndexOutOfRange(1, 1))
        ));
    }

    #[test]
    fn test_truncated_offset_table() {
        // Declares 3 tiles but only holds one offset
        let buffer = [3, 0, 0, 0, 8, 0, 0, 0];
        assert!(matches!(
            TileTable::parse(&buffer),
            Err(FormatError::SourceExhausted { .. })
        ));
    }

    #[test]
    fn test_entries_iterates_all_tiles() {
        let buffer = tile_buffer(&[vec![1; 256], vec![0x03, 0x00, 0x02, 0x00, 9, 9, 9, 9, 9, 9]]);
        let table = TileTable::parse(&buffer).unwrap();
        let entries: Vec<_> = table.entries(&buffer).collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pixel_count(), 256);
        assert_eq!(entries[1].pixel_count(), 6);
    }

    #[test]
    fn test_tile_image_decode() {
        let buffer = tile_buffer(&[vec![0x02, 0x00, 0x01, 0x00, 0x01, 0x02]]);
        let table = TileTable::parse(&buffer).unwrap();
        let entry = table.entry(0, &buffer).unwrap();

        let image = TileImage::decode(&entry, &buffer, &gray_palette()).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, [4, 4, 4, 0xFF, 8, 8, 8, 0xFF]);

        let bmp = image.to_bitmap().unwrap();
        assert_eq!(bmp.len(), 54 + 8);
        assert_eq!(&bmp[54..], &[4, 4, 4, 8, 8, 8, 0, 0]);
    }
}
