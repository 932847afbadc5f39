//! Whole-file writes through a `.part` sibling and a rename.

use crate::error::{LoadError, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename into place.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `app.css` → `app.css.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `data` to `final_path`, replacing any existing file.
///
/// Bytes go to the temp path first and are renamed over the destination, so a
/// failed write never leaves a truncated file under the final name.
pub fn write_file(final_path: &Path, data: &[u8]) -> Result<()> {
    let tp = temp_path(final_path);
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tp)
        .map_err(|e| LoadError::filesystem("open", &tp, e))?;
    file.write_all(data)
        .map_err(|e| LoadError::filesystem("write", &tp, e))?;
    drop(file);

    std::fs::rename(&tp, final_path).map_err(|e| LoadError::filesystem("rename", final_path, e))?;
    tracing::debug!(path = %final_path.display(), bytes = data.len(), "wrote file");
    Ok(())
}
