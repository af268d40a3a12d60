use crate::constants::{
    DEFAULT_BATCH_PATTERN, DEFAULT_OUTPUT_DIR, DEFAULT_REVIEWS_FIELD, DEFAULT_SOURCE_DIR,
};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved configuration with all values filled in (no Options).
///
/// This struct is passed to [`crate::pipeline::Pipeline::new`] and can be deserialized
/// by the TOML loader. All fields have concrete values, making it safe to access
/// directly without unwrapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Directory holding the raw `apps_batch_*` files
    pub source_dir: PathBuf,
    /// Directory receiving the merged JSON/CSV artifacts
    pub output_dir: PathBuf,
    /// Glob matched against file names in `source_dir` (`*` and `?` wildcards)
    pub batch_pattern: String,
    /// Field on each app record holding its embedded reviews
    pub reviews_field: String,
    /// Whether to also write a Parquet copy of each table.
    pub export_parquet: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            batch_pattern: DEFAULT_BATCH_PATTERN.to_string(),
            reviews_field: DEFAULT_REVIEWS_FIELD.to_string(),
            export_parquet: false,
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// Every key is optional; missing keys fall back to [`ResolvedConfig::default`].
    /// The parser rejects unknown keys to catch typos.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `InvalidInput` if the TOML is
    /// malformed, unknown keys are present, or the pattern/field names are empty.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.batch_pattern.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Batch pattern must not be empty".into(),
            ));
        }
        if self.reviews_field.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Reviews field name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
