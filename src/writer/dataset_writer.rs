use crate::config::ResolvedConfig;
use crate::constants::{APPS_ARTIFACT, REVIEWS_ARTIFACT, RUN_STAMP_FORMAT};
use crate::errors::{AppError, AppResult};
use crate::splitter::SplitOutput;
use crate::utils::{mb_from_bytes, round_two_decimals};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::flatten::records_to_dataframe;

/// Files produced by one run, plus the tables handed to the reporter.
#[derive(Default)]
pub struct WrittenArtifacts {
    /// Stamp embedded in every file name of this run.
    pub stamp: String,
    pub files: Vec<PathBuf>,
    /// `None` when the app records could not be flattened.
    pub apps_table: Option<DataFrame>,
    /// `None` when the review records could not be flattened.
    pub reviews_table: Option<DataFrame>,
    /// Tabular export failures that were downgraded to warnings.
    pub warnings: Vec<String>,
}

/// Current local time formatted as a run stamp (`YYYYMMDD_HHMMSS`).
pub fn run_stamp() -> String {
    chrono::Local::now().format(RUN_STAMP_FORMAT).to_string()
}

fn artifact_path(dir: &Path, name: &str, stamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{name}_{stamp}.{ext}"))
}

fn candidate_paths(dir: &Path, stamp: &str, with_parquet: bool) -> Vec<PathBuf> {
    let mut exts = vec!["json", "csv"];
    if with_parquet {
        exts.push("parquet");
    }
    exts.iter()
        .flat_map(|ext| {
            [APPS_ARTIFACT, REVIEWS_ARTIFACT]
                .into_iter()
                .map(move |name| artifact_path(dir, name, stamp, ext))
        })
        .collect()
}

/// Picks a stamp for which no artifact exists yet in `dir`.
///
/// Starts from `base` and appends `_1`, `_2`, ... until every candidate path is free,
/// so repeated runs within the same second never overwrite each other.
pub fn unique_stamp(dir: &Path, base: &str, with_parquet: bool) -> String {
    let mut suffix = 0usize;
    loop {
        let stamp = if suffix == 0 {
            base.to_string()
        } else {
            format!("{base}_{suffix}")
        };
        if candidate_paths(dir, &stamp, with_parquet)
            .iter()
            .all(|p| !p.exists())
        {
            return stamp;
        }
        suffix += 1;
    }
}

/// Writes records as a pretty-printed JSON array (2-space indent, UTF-8 unescaped).
pub fn write_json<T: Serialize>(records: &[T], path: &Path) -> AppResult<()> {
    let file = File::create(path).map_err(|e| {
        AppError::SerializationError(format!("Failed to create {}: {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| {
        AppError::SerializationError(format!("Failed to write {}: {e}", path.display()))
    })?;
    writer.flush().map_err(|e| {
        AppError::SerializationError(format!("Failed to flush {}: {e}", path.display()))
    })?;
    Ok(())
}

/// Writes a table as CSV with a header row. A failed write leaves no file behind.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> AppResult<()> {
    let result = File::create(path)
        .map_err(|e| AppError::TabularError(format!("Failed to create {}: {e}", path.display())))
        .and_then(|mut file| {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .map_err(|e| AppError::TabularError(format!("Failed to write CSV: {e}")))
        });
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

/// Writes a table as Parquet. A failed write leaves no file behind.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> AppResult<()> {
    let result = File::create(path)
        .map_err(|e| AppError::TabularError(format!("Failed to create {}: {e}", path.display())))
        .and_then(|mut file| {
            ParquetWriter::new(&mut file)
                .finish(df)
                .map(|_| ())
                .map_err(|e| AppError::TabularError(format!("Failed to write Parquet: {e}")))
        });
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Flattens and writes one dataset's tabular exports.
///
/// Failures are recorded in `artifacts.warnings` and never propagate.
/// Returns the table when flattening succeeded, even if a file write failed.
fn export_table<'a, I>(
    name: &str,
    records: I,
    dir: &Path,
    config: &ResolvedConfig,
    artifacts: &mut WrittenArtifacts,
) -> Option<DataFrame>
where
    I: IntoIterator<Item = &'a crate::models::Fields>,
{
    let mut df = match records_to_dataframe(records) {
        Ok(df) => df,
        Err(e) => {
            warn!(dataset = name, error = %e, "Tabular export skipped, JSON is still available");
            artifacts.warnings.push(format!("{name}: {e}"));
            return None;
        }
    };

    let csv_path = artifact_path(dir, name, &artifacts.stamp, "csv");
    match write_csv(&mut df, &csv_path) {
        Ok(()) => {
            info!(
                dataset = name,
                file = %csv_path.display(),
                rows = df.height(),
                columns = df.width(),
                "CSV written"
            );
            artifacts.files.push(csv_path);
        }
        Err(e) => {
            warn!(dataset = name, error = %e, "CSV export failed, JSON is still available");
            artifacts.warnings.push(format!("{name}: {e}"));
        }
    }

    if config.export_parquet {
        let parquet_path = artifact_path(dir, name, &artifacts.stamp, "parquet");
        match write_parquet(&mut df, &parquet_path) {
            Ok(()) => {
                info!(dataset = name, file = %parquet_path.display(), "Parquet written");
                artifacts.files.push(parquet_path);
            }
            Err(e) => {
                warn!(dataset = name, error = %e, "Parquet export failed");
                artifacts.warnings.push(format!("{name}: {e}"));
            }
        }
    }

    Some(df)
}

/// Persists the split datasets under `config.output_dir`.
///
/// Writes, in order:
/// - `apps_metadata_<stamp>.json` and `reviews_metadata_<stamp>.json` (fatal on failure)
/// - `apps_metadata_<stamp>.csv` and `reviews_metadata_<stamp>.csv` (warning on failure)
/// - the matching `.parquet` files when `export_parquet` is set (warning on failure)
///
/// # Errors
///
/// Returns `IoError` if the output directory cannot be created and
/// `SerializationError` if either JSON file cannot be written.
pub fn write_datasets(
    split: &SplitOutput,
    config: &ResolvedConfig,
    base_stamp: &str,
) -> AppResult<WrittenArtifacts> {
    let dir = config.output_dir.as_path();
    fs::create_dir_all(dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut artifacts = WrittenArtifacts {
        stamp: unique_stamp(dir, base_stamp, config.export_parquet),
        ..WrittenArtifacts::default()
    };

    let apps_json = artifact_path(dir, APPS_ARTIFACT, &artifacts.stamp, "json");
    write_json(&split.applications, &apps_json)?;
    let reviews_json = artifact_path(dir, REVIEWS_ARTIFACT, &artifacts.stamp, "json");
    write_json(&split.reviews, &reviews_json)?;

    let json_mb = mb_from_bytes(file_size(&apps_json) + file_size(&reviews_json));
    info!(
        applications = split.applications.len(),
        reviews = split.reviews.len(),
        output_size_mb = round_two_decimals(json_mb),
        "JSON datasets written"
    );
    artifacts.files.push(apps_json);
    artifacts.files.push(reviews_json);

    artifacts.apps_table = export_table(
        APPS_ARTIFACT,
        split.applications.iter().map(|a| a.fields()),
        dir,
        config,
        &mut artifacts,
    );
    artifacts.reviews_table = export_table(
        REVIEWS_ARTIFACT,
        split.reviews.iter().map(|r| r.fields()),
        dir,
        config,
        &mut artifacts,
    );

    Ok(artifacts)
}
