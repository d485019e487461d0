//! Tile extraction pipeline.
//!
//! Opens the executable at the tile blob, decompresses it, reads the tile
//! table from the decompressed buffer, loads the palette and writes one
//! bitmap per tile. The first failing tile aborts the run.

use std::path::{Path, PathBuf};

use dave_formats::layout::{VGA_DATA_OFFSET, VGA_PALETTE_OFFSET};
use dave_formats::source::{ByteSource, FileSource};
use dave_formats::{BitmapFile, Palette, TileImage, TileTable, rle};

use crate::error::{ExtractError, ExtractResult};
use crate::output::write_output;

/// Outcome of a tile extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileReport {
    /// Number of tiles in the table
    pub tile_count: usize,
    /// Bitmaps written, in tile order
    pub files_written: Vec<PathBuf>,
    /// Size of the decompressed blob in bytes
    pub decompressed_size: usize,
}

/// Extracts every tile of the VGA blob into `tile{index}.bmp` files.
#[derive(Debug, Clone)]
pub struct TileExtractor {
    exe: PathBuf,
    vga_offset: u64,
    palette_offset: u64,
}

impl TileExtractor {
    /// Create an extractor using the shipped offsets.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            vga_offset: VGA_DATA_OFFSET,
            palette_offset: VGA_PALETTE_OFFSET,
        }
    }

    /// Override the tile blob offset.
    #[must_use]
    pub const fn with_vga_offset(mut self, offset: u64) -> Self {
        self.vga_offset = offset;
        self
    }

    /// Override the palette offset.
    #[must_use]
    pub const fn with_palette_offset(mut self, offset: u64) -> Self {
        self.palette_offset = offset;
        self
    }

    /// Run the pipeline, writing bitmaps into `out_dir`.
    ///
    /// `out_dir` must already exist.
    ///
    /// # Errors
    ///
    /// Returns an `ExtractError` naming the stage that failed. Bitmaps
    /// written before the failure are left on disk.
    pub fn extract(&self, out_dir: &Path) -> ExtractResult<TileReport> {
        let mut source = FileSource::open_at(&self.exe, self.vga_offset).map_err(|source| {
            ExtractError::Open {
                path: self.exe.clone(),
                source,
            }
        })?;

        let buffer =
            rle::decompress(&mut source).map_err(|source| ExtractError::Decompress {
                offset: self.vga_offset,
                source,
            })?;
        tracing::debug!(
            "Decompressed {} bytes from {:#x}",
            buffer.len(),
            self.vga_offset
        );

        let table = TileTable::parse(&buffer).map_err(ExtractError::TileTable)?;

        let palette = source
            .seek(self.palette_offset)
            .and_then(|()| Palette::read(&mut source))
            .map_err(|source| ExtractError::Palette {
                offset: self.palette_offset,
                source,
            })?;

        let mut files_written = Vec::with_capacity(table.tile_count());
        for index in 0..table.tile_count() {
            let bitmap = table
                .entry(index, &buffer)
                .and_then(|entry| TileImage::decode(&entry, &buffer, &palette))
                .and_then(|image| image.to_bitmap())
                .map_err(|source| ExtractError::Tile { index, source })?;

            let path = out_dir.join(tile_file_name(index));
            write_output(&path, &bitmap)?;
            files_written.push(path);
        }

        tracing::info!(
            "Wrote {} tiles to {}",
            files_written.len(),
            out_dir.display()
        );

        Ok(TileReport {
            tile_count: table.tile_count(),
            files_written,
            decompressed_size: buffer.len(),
        })
    }
}

/// Output file name of tile `index`
pub fn tile_file_name(index: usize) -> String {
    format!("tile{index}.bmp")
}

/// Whether `out_dir` already holds `count` readable tile bitmaps.
pub fn tiles_present(out_dir: &Path, count: usize) -> bool {
    (0..count).all(|index| {
        let path = out_dir.join(tile_file_name(index));
        match std::fs::read(&path) {
            Ok(data) => match BitmapFile::parse(&data) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("{} is not a valid bitmap: {e}", path.display());
                    false
                }
            },
            Err(_) => {
                tracing::debug!("{} is missing", path.display());
                false
            }
        }
    })
}
