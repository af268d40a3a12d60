use crate::utils::{mb_from_bytes, round_two_decimals};
use std::fmt::Write;

use super::stats::{AppStats, ExplorationReport, ReviewStats, TableSummary};

fn render_summary(out: &mut String, title: &str, summary: &TableSummary) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
    let _ = writeln!(out, "Rows: {}", summary.rows);
    let _ = writeln!(out, "Columns: {}", summary.columns);
    let _ = writeln!(
        out,
        "Estimated memory: {} MB",
        round_two_decimals(mb_from_bytes(summary.estimated_bytes as u64))
    );
    let _ = writeln!(out, "Missing values: {}", summary.missing_values);
}

fn render_apps(out: &mut String, stats: &AppStats) {
    render_summary(out, "Applications", &stats.summary);
    if let Some(mean) = stats.rating_mean {
        let _ = writeln!(out, "Mean rating: {}", round_two_decimals(mean));
    }
    if let Some(median) = stats.rating_median {
        let _ = writeln!(out, "Median rating: {}", round_two_decimals(median));
    }
    if let Some(installs) = stats.installs_non_null {
        let _ = writeln!(out, "Apps with install counts: {installs}");
    }
    if let Some(top) = &stats.top_categories {
        let _ = writeln!(out, "Top categories:");
        for (genre, count) in top {
            let _ = writeln!(out, "  {genre}: {count}");
        }
    }
}

fn render_reviews(out: &mut String, stats: &ReviewStats) {
    render_summary(out, "Reviews", &stats.summary);
    if let Some(mean) = stats.rating_mean {
        let _ = writeln!(out, "Mean rating: {}", round_two_decimals(mean));
    }
    if let Some(distribution) = &stats.rating_distribution {
        let _ = writeln!(out, "Rating distribution:");
        for (rating, count) in distribution {
            let _ = writeln!(out, "  {rating}: {count}");
        }
    }
    if let Some(length) = stats.mean_content_length {
        let _ = writeln!(
            out,
            "Mean review length: {} chars",
            round_two_decimals(length)
        );
    }
}

/// Renders the report as plain text. Statistics that were skipped are omitted.
pub fn render_report(report: &ExplorationReport) -> String {
    let mut out = String::new();
    match &report.applications {
        Some(stats) => render_apps(&mut out, stats),
        None => out.push_str("Applications: table unavailable\n"),
    }
    out.push('\n');
    match &report.reviews {
        Some(stats) => render_reviews(&mut out, stats),
        None => out.push_str("Reviews: table unavailable\n"),
    }
    out
}
