//! VGA DAC palette
//!
//! The executable stores its palette as 256 RGB triplets with 6 bits per
//! channel. Each channel is widened with a plain left shift by two, so the
//! brightest stored value 63 becomes 252 and full white is never reached.
//! Output from this crate keeps that scale.

use tracing::debug;

use crate::error::{FormatError, FormatResult};
use crate::source::ByteSource;

/// Number of palette entries
pub const PALETTE_ENTRIES: usize = 256;

/// Raw palette size in bytes
pub const PALETTE_SIZE: usize = PALETTE_ENTRIES * 3;

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fully opaque pixel in B, G, R, A byte order
    pub const fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, 0xFF]
    }
}

/// 256-entry palette already widened to 8-bit channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_ENTRIES],
}

impl Palette {
    /// Widen a raw 6-bit palette table.
    ///
    /// `raw` must be exactly [`PALETTE_SIZE`] bytes.
    pub fn from_vga(raw: &[u8]) -> FormatResult<Self> {
        if raw.len() != PALETTE_SIZE {
            return Err(FormatError::InvalidPaletteLength {
                expected: PALETTE_SIZE,
                actual: raw.len(),
            });
        }

        let mut colors = [Rgb::default(); PALETTE_ENTRIES];
        for (color, triplet) in colors.iter_mut().zip(raw.chunks_exact(3)) {
            *color = Rgb::new(
                widen(triplet[0]),
                widen(triplet[1]),
                widen(triplet[2]),
            );
        }

        Ok(Self { colors })
    }

    /// Read and widen a palette at the source's current position
    pub fn read<S: ByteSource>(mut source: S) -> FormatResult<Self> {
        let offset = source.position();
        let raw = source.read_bytes(PALETTE_SIZE)?;
        debug!("Loaded VGA palette from {offset:#x}");
        Self::from_vga(&raw)
    }

    /// Color for a palette index
    #[inline]
    pub const fn lookup(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    /// All 256 colors in index order
    pub const fn colors(&self) -> &[Rgb; PALETTE_ENTRIES] {
        &self.colors
    }

    /// Map indexed pixels to opaque BGRA, four bytes per input byte
    pub fn indexed_to_bgra(&self, indices: &[u8]) -> Vec<u8> {
        indices
            .iter()
            .flat_map(|&i| self.lookup(i).to_bgra())
            .collect()
    }
}

/// 6-bit channel to 8-bit channel
#[inline]
const fn widen(value: u8) -> u8 {
    value << 2
}
