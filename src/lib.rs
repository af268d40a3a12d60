//! apps-merge library
//!
//! This crate provides the core functionality for the `apps-merge` binary.
//! Keep the crate root minimal; implementation and tests live in their modules.
//!
//! ## Overview
//!
//! Scraped Play Store listings arrive as `apps_batch_*.json` files, each an array of
//! app objects with their reviews embedded. The library merges them into two
//! normalized datasets:
//!
//! - [`loader`] - Discovers batch files and concatenates their app records
//! - [`splitter`] - Moves embedded reviews into their own sequence, tagged with `appId`
//! - [`writer`] - Persists both datasets as JSON and CSV (optionally Parquet)
//! - [`report`] - Computes and renders descriptive statistics over both tables
//! - [`pipeline`] - Runs the stages in order for one configuration
//! - [`cli`] - Command-line interface
//! - [`models`] - App and review records
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use apps_merge::{config::ResolvedConfig, errors::AppResult, pipeline::Pipeline};
//! use std::path::PathBuf;
//!
//! # fn example() -> AppResult<()> {
//! let config = ResolvedConfig {
//!     source_dir: PathBuf::from("data/raw"),
//!     output_dir: PathBuf::from("data/processed"),
//!     ..ResolvedConfig::default()
//! };
//! let summary = Pipeline::new(config).run()?;
//! println!("{} apps, {} reviews", summary.applications, summary.reviews);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod splitter;
pub mod utils;
pub mod writer;
