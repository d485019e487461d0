//! Asset extractor for the Dangerous Dave executable.
//!
//! Pulls the tile graphics, level records and title screen strings out of
//! an unpacked `DAVE.EXE` and writes them as plain files:
//! - `tiles/tile{N}.bmp`: 24-bit bitmaps decoded from the VGA tile blob
//! - `levels/level{N}.dat`, `levels/leveltitle.dat`: raw level records
//! - `tiles/map.bmp`: every level drawn from the tile bitmaps
//! - `text/title.txt`, `text/subtitle.txt`, `text/helpprompt.txt`
//!
//! # Architecture
//!
//! - `config`: CLI arguments, environment variables and the JSON config file
//! - `extractor`: runs the selected extractors against one executable
//! - `tiles`, `levels`, `text`: one pipeline per asset kind
//! - `error`: stage-identifying error types
//!
//! # Example
//!
//! ```no_run
//! use dave_extract::{ExtractConfig, Extractor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ExtractConfig::from_args();
//!     let extractor = Extractor::new(config)?;
//!     extractor.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod extractor;
pub mod levels;
pub mod output;
pub mod text;
pub mod tiles;

pub use config::{Command, ExtractConfig};
pub use error::{ConfigError, ExtractError, ExtractResult};
pub use extractor::{Extractor, RunSummary};
pub use levels::LevelReport;
pub use tiles::{TileExtractor, TileReport};
