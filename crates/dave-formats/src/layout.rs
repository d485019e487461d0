//! Fixed offsets of the assets inside the unpacked `DAVE.EXE`
//!
//! The executable is never parsed as an MZ image. Every asset sits at a
//! known file offset, so extraction is a matter of seeking there.

/// RLE-packed VGA tile blob
pub const VGA_DATA_OFFSET: u64 = 0x120f0;

/// Raw 6-bit VGA palette (768 bytes)
pub const VGA_PALETTE_OFFSET: u64 = 0x26b0a;

/// First of the ten consecutive level records
pub const LEVEL_OFFSET: u64 = 0x26e0a;

/// Tile grid of the title screen
pub const TITLE_LEVEL_OFFSET: u64 = 0x25ea4;

/// Game title string
pub const TITLE_TEXT_OFFSET: u64 = 0x2643f;

/// Subtitle string
pub const SUBTITLE_TEXT_OFFSET: u64 = 0x26451;

/// "Press F1 for help" prompt
pub const HELP_PROMPT_TEXT_OFFSET: u64 = 0x2646b;

/// Number of tiles in the shipped VGA blob
pub const TILE_COUNT: usize = 158;
