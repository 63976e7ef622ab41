//! Input discovery: list the `*.pdf` files directly inside a directory.
//!
//! Matching is non-recursive and case-sensitive. The `glob` crate yields
//! paths in sorted order, so a given directory is always processed in the
//! same order and repeated runs produce identical output files.

use crate::error::GazetteError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File pattern matched inside the input directory.
pub const PDF_PATTERN: &str = "*.pdf";

/// Enumerate the PDF files in `dir`.
///
/// An empty vector is a normal result, not an error.
///
/// # Errors
/// Returns [`GazetteError::InputDirectoryNotFound`] or
/// [`GazetteError::InputNotADirectory`] when `dir` is unusable.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, GazetteError> {
    if !dir.exists() {
        return Err(GazetteError::InputDirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(GazetteError::InputNotADirectory {
            path: dir.to_path_buf(),
        });
    }

    // Directory names may legitimately contain `[`, `*` or `?`.
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(PDF_PATTERN);
    let pattern = pattern.to_string_lossy();

    let matches = glob::glob(&pattern).map_err(|e| GazetteError::InvalidGlob {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;

    let mut pdfs = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) if path.is_file() => pdfs.push(path),
            Ok(path) => debug!("Skipping non-file match: {}", path.display()),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }

    debug!("Discovered {} PDF(s) in {}", pdfs.len(), dir.display());
    Ok(pdfs)
}

/// The base name of `path`, used as the `filename` of its result record.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
