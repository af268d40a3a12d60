//! Linear merge pipeline: Loading → Splitting → Writing → Reporting → Done.

use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::loader::load_from_dir;
use crate::report::{explore, ExplorationReport};
use crate::splitter::split_records;
use crate::utils::format_duration;
use crate::writer::{run_stamp, write_datasets};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// States of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Splitting,
    Writing,
    Reporting,
    Done,
    Aborted,
}

impl Stage {
    /// Unconditional successor; `Done` and `Aborted` are terminal.
    pub fn next(self) -> Stage {
        match self {
            Stage::Loading => Stage::Splitting,
            Stage::Splitting => Stage::Writing,
            Stage::Writing => Stage::Reporting,
            Stage::Reporting => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Aborted => Stage::Aborted,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Splitting => "splitting",
            Stage::Writing => "writing",
            Stage::Reporting => "reporting",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub batch_files: usize,
    pub applications: usize,
    pub reviews: usize,
    pub unidentified_apps: usize,
    pub orphan_reviews: usize,
    pub skipped_reviews: usize,
    pub malformed_review_fields: usize,
    pub stamp: String,
    pub artifacts: Vec<PathBuf>,
    /// Tabular export failures downgraded to warnings.
    pub warnings: Vec<String>,
    pub report: ExplorationReport,
    /// States visited, in order, ending with `Done`.
    pub stages: Vec<Stage>,
}

/// One end-to-end merge run over an explicit configuration.
pub struct Pipeline {
    config: ResolvedConfig,
}

impl Pipeline {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Runs every stage with a stamp taken from the local clock.
    pub fn run(&self) -> AppResult<RunSummary> {
        self.run_with_stamp(&run_stamp())
    }

    /// Runs every stage, naming output files after `stamp`.
    ///
    /// # Errors
    ///
    /// Returns `NoInput` when no batch file matches (nothing is written),
    /// `ParseError` for malformed batch content and `SerializationError`/`IoError`
    /// when the JSON datasets cannot be persisted. Tabular export failures are
    /// reported in [`RunSummary::warnings`] instead.
    pub fn run_with_stamp(&self, stamp: &str) -> AppResult<RunSummary> {
        self.config.validate()?;
        let start = Instant::now();
        let mut stages = Vec::with_capacity(5);
        let mut stage = Stage::Loading;
        enter(&mut stages, stage);

        let loaded = load_from_dir(&self.config.source_dir, &self.config.batch_pattern)
            .map_err(|e| abort(&mut stages, e))?;
        let batch_files = loaded.files.len();

        stage = stage.next();
        enter(&mut stages, stage);
        let split = split_records(&loaded.records, &self.config.reviews_field);
        drop(loaded);
        info!(
            applications = split.applications.len(),
            reviews = split.reviews.len(),
            "Reviews split from applications"
        );

        stage = stage.next();
        enter(&mut stages, stage);
        let artifacts =
            write_datasets(&split, &self.config, stamp).map_err(|e| abort(&mut stages, e))?;

        stage = stage.next();
        enter(&mut stages, stage);
        let report = explore(
            artifacts.apps_table.as_ref(),
            split.applications.len(),
            artifacts.reviews_table.as_ref(),
            split.reviews.len(),
        );

        stage = stage.next();
        enter(&mut stages, stage);
        for warning in &artifacts.warnings {
            warn!(warning = %warning, "Completed with tabular export warning");
        }
        info!(
            applications = split.applications.len(),
            reviews = split.reviews.len(),
            files_written = artifacts.files.len(),
            output_dir = %self.config.output_dir.display(),
            elapsed = format_duration(start.elapsed()),
            "Pipeline completed"
        );

        Ok(RunSummary {
            batch_files,
            applications: split.applications.len(),
            reviews: split.reviews.len(),
            unidentified_apps: split.unidentified_apps,
            orphan_reviews: split.orphan_reviews,
            skipped_reviews: split.skipped_reviews,
            malformed_review_fields: split.malformed_review_fields,
            stamp: artifacts.stamp,
            artifacts: artifacts.files,
            warnings: artifacts.warnings,
            report,
            stages,
        })
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    info!(stage = %stage, "Entering stage");
    stages.push(stage);
}

fn abort(stages: &mut Vec<Stage>, err: AppError) -> AppError {
    let from = stages.last().copied().unwrap_or(Stage::Loading);
    error!(from = %from, error = %err, "Pipeline aborted");
    stages.push(Stage::Aborted);
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_transitions_are_linear() {
        let mut stage = Stage::Loading;
        let mut visited = vec![stage];
        while !stage.is_terminal() {
            stage = stage.next();
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                Stage::Loading,
                Stage::Splitting,
                Stage::Writing,
                Stage::Reporting,
                Stage::Done
            ]
        );
        assert_eq!(Stage::Aborted.next(), Stage::Aborted);
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::Splitting.to_string(), "splitting");
        assert_eq!(Stage::Aborted.to_string(), "aborted");
    }

    #[test]
    fn run_rejects_invalid_config() {
        let config = ResolvedConfig {
            reviews_field: String::new(),
            ..ResolvedConfig::default()
        };
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
