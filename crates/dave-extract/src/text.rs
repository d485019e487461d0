//! Title screen text extraction

use std::path::{Path, PathBuf};

use dave_formats::source::FileSource;
use dave_formats::text::TEXT_FIELDS;

use crate::error::{ExtractError, ExtractResult};
use crate::output::write_output;

/// Write each known string to its own text file in `out_dir`.
///
/// # Errors
///
/// Returns `ExtractError::Text` naming the first field that could not be
/// read, or `ExtractError::Write`.
pub fn extract_text(exe: &Path, out_dir: &Path) -> ExtractResult<Vec<PathBuf>> {
    let mut source = FileSource::new(exe);
    let mut written = Vec::with_capacity(TEXT_FIELDS.len());

    for field in &TEXT_FIELDS {
        let text = field
            .read(&mut source)
            .map_err(|source| ExtractError::Text {
                field: field.name,
                source,
            })?;
        tracing::debug!("{}: {text:?}", field.name);

        let path = out_dir.join(field.file_name);
        write_output(&path, text.as_bytes())?;
        written.push(path);
    }

    tracing::info!("Wrote {} text files to {}", written.len(), out_dir.display());
    Ok(written)
}
