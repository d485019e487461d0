//! Error types for the extractor.
//!
//! Every variant of [`ExtractError`] names the stage that failed, so a run
//! ends with one message saying where it stopped.

use std::path::PathBuf;

use dave_formats::FormatError;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No executable given on the command line or in the config file
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Executable path does not exist
    #[error("Executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON
    #[error("Invalid JSON in config file {path}: {source}")]
    InvalidJson {
        /// Path to the config file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Offset argument could not be parsed
    #[error("Invalid offset '{0}': expected decimal or 0x-prefixed hex")]
    InvalidOffset(String),

    /// Two offsets point at the same asset
    #[error("Resource offset and palette offset are both {0:#x}")]
    OverlappingOffsets(u64),
}

/// Extraction errors, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Executable could not be opened or positioned
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path to the executable
        path: PathBuf,
        /// Underlying error
        #[source]
        source: FormatError,
    },

    /// RLE blob failed to decode
    #[error("Failed to decompress resource blob at {offset:#x}: {source}")]
    Decompress {
        /// Offset of the blob
        offset: u64,
        /// Underlying error
        #[source]
        source: FormatError,
    },

    /// Tile offset table is malformed
    #[error("Failed to read tile table: {0}")]
    TileTable(#[source] FormatError),

    /// Palette could not be loaded
    #[error("Failed to load palette at {offset:#x}: {source}")]
    Palette {
        /// Offset of the palette
        offset: u64,
        /// Underlying error
        #[source]
        source: FormatError,
    },

    /// A single tile failed to decode or encode
    #[error("Failed to convert tile {index}: {source}")]
    Tile {
        /// Tile index
        index: usize,
        /// Underlying error
        #[source]
        source: FormatError,
    },

    /// Level records could not be read
    #[error("Failed to read level data: {0}")]
    Levels(#[source] FormatError),

    /// Level map could not be encoded
    #[error("Failed to build level map: {0}")]
    Map(#[source] FormatError),

    /// Text fields could not be read
    #[error("Failed to read {field} text: {source}")]
    Text {
        /// Field name
        field: &'static str,
        /// Underlying error
        #[source]
        source: FormatError,
    },

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_stage() {
        let err = ExtractError::Tile {
            index: 7,
            source: FormatError::TileIndexOutOfRange(7, 3),
        };
        assert_eq!(
            err.to_string(),
            "Failed to convert tile 7: tile index 7 is out of range, must be less than 3"
        );

        let err = ExtractError::Decompress {
            offset: 0x120f0,
            source: FormatError::DecodeCorruption {
                declared: 10,
                produced: 4,
            },
        };
        assert!(err.to_string().starts_with("Failed to decompress resource blob at 0x120f0"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ExtractError = ConfigError::MissingRequired("exe".to_string()).into();
        assert!(err.to_string().contains("Missing required configuration"));
    }
}
