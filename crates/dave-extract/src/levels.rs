//! Level extraction.
//!
//! Copies the ten level records and the title screen grid out of the
//! executable without interpreting them, then draws every level from the
//! tile bitmaps into `map.bmp`.

use std::path::{Path, PathBuf};

use dave_formats::layout::{LEVEL_OFFSET, TILE_COUNT, TITLE_LEVEL_OFFSET};
use dave_formats::source::{ByteSource, FileSource};
use dave_formats::{BitmapFile, Level, LevelMap, TitleLevel};

use crate::error::{ExtractError, ExtractResult};
use crate::output::write_output;
use crate::tiles::tile_file_name;

/// Output file name of the title screen grid
pub const TITLE_LEVEL_FILE: &str = "leveltitle.dat";

/// Output file name of the level overview, written next to the tiles
pub const MAP_FILE: &str = "map.bmp";

/// Outcome of a level extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelReport {
    /// Level records in file order
    pub levels: Vec<Level>,
    /// Files written
    pub files_written: Vec<PathBuf>,
}

/// Output file name of level `index`
pub fn level_file_name(index: usize) -> String {
    format!("level{index}.dat")
}

/// Write `level{N}.dat` for every level and `leveltitle.dat` into `out_dir`.
///
/// # Errors
///
/// Returns `ExtractError::Open` if the executable cannot be opened,
/// `ExtractError::Levels` if it is too short, or `ExtractError::Write`.
pub fn extract_levels(exe: &Path, out_dir: &Path) -> ExtractResult<LevelReport> {
    let mut source = FileSource::open_at(exe, LEVEL_OFFSET).map_err(|source| {
        ExtractError::Open {
            path: exe.to_path_buf(),
            source,
        }
    })?;

    let levels = Level::read_all(&mut source).map_err(ExtractError::Levels)?;
    let title = source
        .seek(TITLE_LEVEL_OFFSET)
        .and_then(|()| TitleLevel::read(&mut source))
        .map_err(ExtractError::Levels)?;

    let mut files_written = Vec::with_capacity(levels.len() + 1);
    for (index, level) in levels.iter().enumerate() {
        let path = out_dir.join(level_file_name(index));
        write_output(&path, &level.to_bytes())?;
        files_written.push(path);
    }

    let path = out_dir.join(TITLE_LEVEL_FILE);
    write_output(&path, &title.to_bytes())?;
    files_written.push(path);

    tracing::info!(
        "Wrote {} level files to {}",
        files_written.len(),
        out_dir.display()
    );
    Ok(LevelReport {
        levels,
        files_written,
    })
}

/// Load whichever of the `TILE_COUNT` tile bitmaps in `tiles_dir` parse
fn load_tiles(tiles_dir: &Path) -> Vec<Option<BitmapFile>> {
    (0..TILE_COUNT)
        .map(|index| {
            let path = tiles_dir.join(tile_file_name(index));
            let data = std::fs::read(&path).ok()?;
            BitmapFile::parse(&data)
                .map_err(|e| tracing::warn!("Ignoring {}: {e}", path.display()))
                .ok()
        })
        .collect()
}

/// Draw `levels` from the bitmaps in `tiles_dir` and save `map.bmp` there.
///
/// Returns `None` without writing anything when `tiles_dir` holds no tile
/// bitmaps. Cells whose tile bitmap is missing stay black.
///
/// # Errors
///
/// Returns `ExtractError::Map` if the image cannot be encoded, or
/// `ExtractError::Write`.
pub fn write_level_map(levels: &[Level], tiles_dir: &Path) -> ExtractResult<Option<PathBuf>> {
    let tiles = load_tiles(tiles_dir);
    let loaded = tiles.iter().flatten().count();
    if loaded == 0 {
        tracing::warn!(
            "No tile bitmaps in {}, skipping level map",
            tiles_dir.display()
        );
        return Ok(None);
    }
    if loaded < TILE_COUNT {
        tracing::warn!("Only {loaded} of {TILE_COUNT} tile bitmaps found, missing cells stay black");
    }

    let map = LevelMap::compose(levels, |index| {
        tiles.get(usize::from(index)).and_then(Option::as_ref)
    });
    let bitmap = map.to_bitmap().map_err(ExtractError::Map)?;

    let path = tiles_dir.join(MAP_FILE);
    write_output(&path, &bitmap)?;
    tracing::info!("Wrote level map to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dave_formats::ChannelOrder;
    use dave_formats::bitmap::encode;

    #[test]
    fn test_short_executable() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("DAVE.EXE");
        std::fs::write(&exe, vec![0u8; 64]).unwrap();

        let err = extract_levels(&exe, dir.path()).unwrap_err();
        assert!(
            matches!(err, ExtractError::Levels(_)),
            "actual error: {err:?}"
        );
    }

    #[test]
    fn test_map_skipped_without_tiles() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(write_level_map(&[], dir.path()).unwrap(), None);
        assert!(!dir.path().join(MAP_FILE).exists());
    }

    #[test]
    fn test_map_ignores_broken_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let bmp = encode(&[0x40; 16 * 16 * 4], 16, 16, &ChannelOrder::bgra()).unwrap();
        std::fs::write(dir.path().join("tile0.bmp"), &bmp).unwrap();
        std::fs::write(dir.path().join("tile1.bmp"), b"BM").unwrap();

        let tiles = load_tiles(dir.path());
        assert_eq!(tiles.len(), TILE_COUNT);
        assert!(tiles[0].is_some());
        assert!(tiles[1].is_none());

        let path = write_level_map(&[], dir.path()).unwrap().unwrap();
        let map = BitmapFile::parse(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!((map.width(), map.height()), (1600, 1600));
    }
}
