//! Source loading for runjs
//!
//! Resolves `user_code.js` inside a job's code directory, reads it once and
//! decodes it into a `SourceUnit` ready for evaluation.

use runjs_core::{Job, RunError, SourceUnit, SOURCE_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};

// Text normalisation applied after decoding
pub mod text;

/// Join the code directory with the literal source file name
#[must_use]
pub fn resolve_source_path(code_directory: &Path) -> PathBuf {
    code_directory.join(SOURCE_FILE_NAME)
}

/// Load the source unit for a job
///
/// # Errors
///
/// Returns `RunError::Read` if the file cannot be opened or read,
/// `RunError::NotAFile` if the path names a directory, and
/// `RunError::Decode` if the contents are not valid UTF-8
pub fn load(job: &Job) -> Result<SourceUnit, RunError> {
    load_path(&resolve_source_path(job.code_directory()))
}

/// Load a source unit from an explicit file path
///
/// # Errors
///
/// Same as [`load`]
pub fn load_path(path: &Path) -> Result<SourceUnit, RunError> {
    log::debug!("reading user code from {}", path.display());

    let metadata = fs::metadata(path).map_err(|e| RunError::read(path, e))?;
    if metadata.is_dir() {
        return Err(RunError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|e| RunError::read(path, e))?;
    let text = decode(path, bytes)?;

    log::debug!("loaded {} bytes of user code", text.len());
    Ok(SourceUnit::new(path, text::prepare(text)))
}

/// Strict UTF-8 decoding; lossy replacement would change program text
///
/// # Errors
///
/// Returns `RunError::Decode` with the offset of the first invalid byte
pub fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, RunError> {
    String::from_utf8(bytes).map_err(|e| RunError::Decode {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}
