use crate::errors::{AppError, AppResult};
use crate::models::ApplicationRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::file_finder::find_batch_files;

/// Outcome of validating a single batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCheck {
    pub path: PathBuf,
    /// Number of app records on success, parse failure message otherwise.
    pub status: Result<usize, String>,
}

impl BatchCheck {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Parses one batch file into its app records.
///
/// The file must hold a JSON array whose elements are all objects.
fn read_batch(path: &Path) -> AppResult<Vec<ApplicationRecord>> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::IoError(format!("Failed to read batch file {}: {e}", path.display()))
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::ParseError(format!("{}: {e}", path.display())))
}

/// Parses every file and concatenates the records in the given file order.
///
/// Any unreadable or malformed file aborts the whole load; no partial result
/// is returned.
pub fn load_batches(files: &[PathBuf]) -> AppResult<Vec<ApplicationRecord>> {
    let mut records = Vec::new();
    for path in files {
        let batch = read_batch(path)?;
        debug!(file = %path.display(), records = batch.len(), "Loaded batch file");
        records.extend(batch);
    }
    Ok(records)
}

/// Records merged from every batch file of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedBatches {
    /// Files read, in merge order.
    pub files: Vec<PathBuf>,
    pub records: Vec<ApplicationRecord>,
}

/// Discovers batch files in `dir` and loads them in lexicographic order.
///
/// # Errors
///
/// Returns `NoInput` when no file matches `pattern`, `ParseError` when any
/// file holds malformed content.
pub fn load_from_dir(dir: &Path, pattern: &str) -> AppResult<LoadedBatches> {
    let files = find_batch_files(dir, pattern)?;
    if files.is_empty() {
        return Err(AppError::NoInput {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    info!(files = files.len(), dir = %dir.display(), "Merging batch files");
    let records = load_batches(&files)?;
    info!(
        files = files.len(),
        applications = records.len(),
        "Batch files merged"
    );
    Ok(LoadedBatches { files, records })
}

/// Parses every file independently, collecting a status per file.
///
/// Unlike [`load_batches`], a bad file does not stop the scan.
pub fn check_batches(files: &[PathBuf]) -> Vec<BatchCheck> {
    files
        .iter()
        .map(|path| {
            let status = read_batch(path)
                .map(|records| records.len())
                .map_err(|e| e.to_string());
            if let Err(reason) = &status {
                warn!(file = %path.display(), error = %reason, "Batch file failed to parse");
            }
            BatchCheck {
                path: path.clone(),
                status,
            }
        })
        .collect()
}
