//! Runs the extractors selected on the command line.

use std::path::{Path, PathBuf};

use dave_formats::layout::TILE_COUNT;

use crate::config::{Command, ExtractConfig};
use crate::error::ExtractResult;
use crate::levels::{extract_levels, write_level_map};
use crate::output::ensure_dir;
use crate::text::extract_text;
use crate::tiles::{TileExtractor, TileReport, tiles_present};

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tile pipeline outcome, `None` if it did not run or was skipped
    pub tiles: Option<TileReport>,
    /// Level files written
    pub levels: Vec<PathBuf>,
    /// Level overview image, `None` if no tile bitmaps were available
    pub map: Option<PathBuf>,
    /// Text files written
    pub text: Vec<PathBuf>,
}

impl RunSummary {
    /// Total number of files written
    #[must_use]
    pub fn files_written(&self) -> usize {
        self.tiles.as_ref().map_or(0, |t| t.files_written.len())
            + self.levels.len()
            + usize::from(self.map.is_some())
            + self.text.len()
    }
}

/// Validated configuration bound to one executable.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
    exe: PathBuf,
}

impl Extractor {
    /// Validate `config` and locate the executable.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Config` if validation fails.
    pub fn new(config: ExtractConfig) -> ExtractResult<Self> {
        let exe = config.validate()?;
        tracing::debug!("Using executable {}", exe.display());
        Ok(Self { config, exe })
    }

    /// Path of the executable being read
    #[must_use]
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Run the configured command.
    ///
    /// Output directories are created as needed. The first failure stops
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns the `ExtractError` of the first stage that failed.
    pub fn run(&self) -> ExtractResult<RunSummary> {
        let mut summary = RunSummary::default();

        match self.config.command {
            Command::Tiles => summary.tiles = self.run_tiles()?,
            Command::Levels => self.run_levels(&mut summary)?,
            Command::Text => summary.text = self.run_text()?,
            Command::All => {
                summary.tiles = self.run_tiles()?;
                self.run_levels(&mut summary)?;
                summary.text = self.run_text()?;
            }
        }

        tracing::info!("Extraction finished: {} files written", summary.files_written());
        Ok(summary)
    }

    fn run_tiles(&self) -> ExtractResult<Option<TileReport>> {
        let dir = self.config.tiles_dir();
        if self.config.skip_existing && tiles_present(&dir, TILE_COUNT) {
            tracing::info!("All {TILE_COUNT} tiles present in {}, skipping", dir.display());
            return Ok(None);
        }

        ensure_dir(&dir)?;
        let report = TileExtractor::new(&self.exe)
            .with_vga_offset(self.config.vga_offset)
            .with_palette_offset(self.config.palette_offset)
            .extract(&dir)?;

        if report.tile_count != TILE_COUNT {
            tracing::warn!(
                "Expected {TILE_COUNT} tiles, blob declares {}",
                report.tile_count
            );
        }
        Ok(Some(report))
    }

    fn run_levels(&self, summary: &mut RunSummary) -> ExtractResult<()> {
        let dir = self.config.levels_dir();
        ensure_dir(&dir)?;
        let report = extract_levels(&self.exe, &dir)?;
        summary.levels = report.files_written;
        summary.map = write_level_map(&report.levels, &self.config.tiles_dir())?;
        Ok(())
    }

    fn run_text(&self) -> ExtractResult<Vec<PathBuf>> {
        let dir = self.config.text_dir();
        ensure_dir(&dir)?;
        extract_text(&self.exe, &dir)
    }
}
