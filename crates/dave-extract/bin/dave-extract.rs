//! dave-extract binary entry point.
//!
//! Thin wrapper around the dave-extract library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates configuration
//! 4. Runs the selected extractors

use anyhow::Result;
use dave_extract::{ExtractConfig, Extractor};

fn main() -> Result<()> {
    let config = ExtractConfig::from_args();

    // RUST_LOG wins over --verbose
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!(
        "Configuration loaded: command={:?}, output={}",
        config.command,
        config.output.display()
    );

    let extractor = Extractor::new(config)?;
    let summary = extractor.run()?;

    if let Some(tiles) = &summary.tiles {
        tracing::info!(
            "{} tiles from {} decompressed bytes",
            tiles.tile_count,
            tiles.decompressed_size
        );
    }

    Ok(())
}
