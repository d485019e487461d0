//! Error types for asset parsing and encoding

use thiserror::Error;

/// Error type shared by every format in this crate
#[derive(Debug, Error)]
pub enum FormatError {
    /// A read went past the end of a byte source
    #[error("source exhausted at offset {offset:#x}: requested {requested} bytes")]
    SourceExhausted {
        /// Position of the cursor when the read was attempted
        offset: u64,
        /// Number of bytes the read needed
        requested: usize,
    },

    /// The RLE opcode stream does not add up to its declared length
    #[error("corrupt RLE stream: declared {declared} bytes, produced {produced}")]
    DecodeCorruption {
        /// Length from the stream header
        declared: u32,
        /// Bytes produced before the stream ended or overshot
        produced: usize,
    },

    /// Input too large to describe with the RLE length prefix
    #[error("input of {0} bytes does not fit a 32-bit length prefix")]
    InputTooLarge(usize),

    /// A tile's payload range does not fit inside the decompressed buffer
    #[error("tile {index} payload {start:#x}..{end:#x} is outside the {len}-byte buffer")]
    TileOutOfRange {
        /// Tile index
        index: usize,
        /// Resolved payload start
        start: usize,
        /// Payload end (next offset or sentinel)
        end: usize,
        /// Length of the decompressed buffer
        len: usize,
    },

    /// Tile index past the end of the table
    #[error("tile index {0} is out of range, must be less than {1}")]
    TileIndexOutOfRange(usize, usize),

    /// Channel order string contains an unknown channel
    #[error("invalid channel order {0:?}: expected only 'r', 'g', 'b' and 'a'")]
    InvalidChannelOrder(String),

    /// Palette table has the wrong size
    #[error("invalid palette length: expected {expected} bytes, got {actual}")]
    InvalidPaletteLength {
        /// Required length
        expected: usize,
        /// Provided length
        actual: usize,
    },

    /// Bitmap dimensions are zero or too large for the container
    #[error("invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Bitmap container is not one this crate writes
    #[error("unsupported bitmap: {0}")]
    UnsupportedBitmap(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;
