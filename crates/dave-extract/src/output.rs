//! Output file helpers

use std::path::Path;

use crate::error::{ExtractError, ExtractResult};

/// Write `data` to `path`, replacing any existing file
pub fn write_output(path: &Path, data: &[u8]) -> ExtractResult<()> {
    std::fs::write(path, data).map_err(|source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::trace!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Create `dir` and any missing parents
pub fn ensure_dir(dir: &Path) -> ExtractResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| ExtractError::Write {
        path: dir.to_path_buf(),
        source,
    })
}
