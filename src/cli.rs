use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::loader::{check_batches, find_batch_files};
use crate::pipeline::Pipeline;
use crate::report::render_report;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// What the parsed command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Run the full merge pipeline.
    Merge(ResolvedConfig),
    /// Validate batch files without merging.
    Check { source_dir: PathBuf, pattern: String },
}

fn source_arg() -> Arg<'static> {
    Arg::new("source")
        .short('s')
        .long("source")
        .help("Directory holding the apps_batch_* files")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn pattern_arg() -> Arg<'static> {
    Arg::new("pattern")
        .short('p')
        .long("pattern")
        .help("File name glob for batch files")
        .action(ArgAction::Set)
}

/// Builds the `apps-merge` command tree.
pub fn build_command() -> Command<'static> {
    Command::new("apps-merge")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .after_help("Without a subcommand, merges data/raw/apps_batch_*.json into data/processed.")
        .subcommand(
            Command::new("merge")
                .about("Merge batch files into app and review datasets")
                .after_help("Example:\n  apps-merge merge -s data/raw -d data/processed --parquet")
                .arg(source_arg())
                .arg(
                    Arg::new("dest")
                        .short('d')
                        .long("dest")
                        .help("Directory receiving the merged JSON/CSV files")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(pattern_arg())
                .arg(
                    Arg::new("parquet")
                        .long("parquet")
                        .help("Also write a Parquet copy of each table")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run the merge using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check that every batch file parses, without merging")
                .arg(source_arg())
                .arg(pattern_arg()),
        )
}

/// Resolves parsed arguments into an [`Action`].
///
/// # Errors
///
/// Returns an error if the TOML configuration cannot be loaded or the
/// resulting configuration is invalid.
pub fn action_from_matches(matches: &ArgMatches) -> AppResult<Action> {
    let defaults = ResolvedConfig::default();
    match matches.subcommand() {
        Some(("merge", sub)) => {
            let mut config = defaults;
            if let Some(source) = sub.get_one::<PathBuf>("source") {
                config.source_dir = source.clone();
            }
            if let Some(dest) = sub.get_one::<PathBuf>("dest") {
                config.output_dir = dest.clone();
            }
            if let Some(pattern) = sub.get_one::<String>("pattern") {
                config.batch_pattern = pattern.clone();
            }
            if sub.get_flag("parquet") {
                config.export_parquet = true;
            }
            config.validate()?;
            Ok(Action::Merge(config))
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::InvalidInput("config path is required".into()))?;
            Ok(Action::Merge(ResolvedConfig::from_toml_file(config_path)?))
        }
        Some(("check", sub)) => Ok(Action::Check {
            source_dir: sub
                .get_one::<PathBuf>("source")
                .cloned()
                .unwrap_or(defaults.source_dir),
            pattern: sub
                .get_one::<String>("pattern")
                .cloned()
                .unwrap_or(defaults.batch_pattern),
        }),
        _ => Ok(Action::Merge(defaults)),
    }
}

/// Parses command-line arguments and executes the requested action.
///
/// # Returns
///
/// Returns `Ok(())` when the merge completes (possibly with tabular warnings) or
/// every checked batch file parses. Returns an error if no batch file is found,
/// a batch file is malformed, or the JSON datasets cannot be written.
pub fn cli() -> AppResult<()> {
    let matches = build_command().get_matches();
    match action_from_matches(&matches)? {
        Action::Merge(config) => run_merge(config),
        Action::Check {
            source_dir,
            pattern,
        } => run_check(&source_dir, &pattern),
    }
}

fn run_merge(config: ResolvedConfig) -> AppResult<()> {
    info!(
        source_dir = %config.source_dir.display(),
        output_dir = %config.output_dir.display(),
        pattern = %config.batch_pattern,
        "Starting merge"
    );
    let summary = Pipeline::new(config).run()?;

    println!("{}", render_report(&summary.report));
    if summary.orphan_reviews > 0 {
        println!(
            "{} review(s) belong to {} app(s) without an appId",
            summary.orphan_reviews, summary.unidentified_apps
        );
    }
    if summary.malformed_review_fields > 0 {
        println!(
            "{} app(s) had a non-array reviews field and were kept without reviews",
            summary.malformed_review_fields
        );
    }
    for path in &summary.artifacts {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_check(source_dir: &std::path::Path, pattern: &str) -> AppResult<()> {
    let files = find_batch_files(source_dir, pattern)?;
    if files.is_empty() {
        return Err(AppError::NoInput {
            dir: source_dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    println!("Checking {} batch files...", files.len());
    let checks = check_batches(&files);
    let mut failed = 0usize;
    for check in &checks {
        let name = check
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        match &check.status {
            Ok(count) => println!("OK     {name} ({count} apps)"),
            Err(reason) => {
                failed += 1;
                println!("ERROR  {name}\n       {reason}");
            }
        }
    }

    if failed > 0 {
        return Err(AppError::ParseError(format!(
            "{failed} of {} batch files failed to parse",
            checks.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_for(args: &[&str]) -> Action {
        let matches = build_command()
            .try_get_matches_from(args.iter().copied())
            .unwrap();
        action_from_matches(&matches).unwrap()
    }

    #[test]
    fn no_subcommand_merges_with_defaults() {
        assert_eq!(
            action_for(&["apps-merge"]),
            Action::Merge(ResolvedConfig::default())
        );
    }

    #[test]
    fn merge_overrides_paths() {
        let action = action_for(&[
            "apps-merge",
            "merge",
            "-s",
            "in",
            "--dest",
            "out",
            "--parquet",
        ]);
        match action {
            Action::Merge(config) => {
                assert_eq!(config.source_dir, PathBuf::from("in"));
                assert_eq!(config.output_dir, PathBuf::from("out"));
                assert_eq!(config.batch_pattern, "apps_batch_*.json");
                assert!(config.export_parquet);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn merge_rejects_empty_pattern() {
        let matches = build_command()
            .try_get_matches_from(["apps-merge", "merge", "-p", ""])
            .unwrap();
        assert!(action_from_matches(&matches).is_err());
    }

    #[test]
    fn toml_command_requires_path() {
        let err = build_command().try_get_matches_from(["apps-merge", "toml"]);
        assert!(err.is_err());
    }

    #[test]
    fn check_uses_default_source() {
        assert_eq!(
            action_for(&["apps-merge", "check", "-p", "*.json"]),
            Action::Check {
                source_dir: PathBuf::from("data/raw"),
                pattern: "*.json".to_string(),
            }
        );
    }

    #[test]
    fn run_check_fails_on_empty_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = run_check(temp_dir.path(), "apps_batch_*.json").unwrap_err();
        assert!(matches!(err, AppError::NoInput { .. }));
    }
}
