use crate::constants::{
    APP_CATEGORY_FIELD, APP_INSTALLS_FIELD, APP_RATING_FIELD, REVIEW_CONTENT_FIELD,
    REVIEW_RATING_FIELD, TOP_CATEGORIES,
};
use crate::utils::mean_of;
use polars::prelude::*;
use std::collections::HashMap;

/// Shape and missing-data figures shared by both tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    /// Polars' estimate of the in-memory footprint.
    pub estimated_bytes: usize,
    /// Null cells across the whole table.
    pub missing_values: usize,
    /// Null cells per column, in column order.
    pub missing_by_column: Vec<(String, usize)>,
}

impl TableSummary {
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.missing_by_column
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppStats {
    pub summary: TableSummary,
    pub rating_mean: Option<f64>,
    pub rating_median: Option<f64>,
    pub installs_non_null: Option<usize>,
    /// Most frequent categories, highest count first, ties by name.
    pub top_categories: Option<Vec<(String, usize)>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewStats {
    pub summary: TableSummary,
    pub rating_mean: Option<f64>,
    /// Count per distinct rating value, ascending by value.
    pub rating_distribution: Option<Vec<(f64, usize)>>,
    /// Mean character count of non-null review texts.
    pub mean_content_length: Option<f64>,
}

/// Statistics over both tables. A table is `None` when it could not be built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorationReport {
    pub applications: Option<AppStats>,
    pub reviews: Option<ReviewStats>,
}

/// Summarizes a table built from `records` source records.
///
/// The row count comes from `records`: a table whose records carry no fields at
/// all has no columns and therefore no height of its own.
pub fn summarize_table(df: &DataFrame, records: usize) -> TableSummary {
    let missing_by_column: Vec<(String, usize)> = df
        .get_columns()
        .iter()
        .map(|s| (s.name().to_string(), s.null_count()))
        .collect();
    TableSummary {
        rows: records.max(df.height()),
        columns: df.width(),
        estimated_bytes: df.estimated_size(),
        missing_values: missing_by_column.iter().map(|(_, n)| n).sum(),
        missing_by_column,
    }
}

/// Column cast to `Float64`; unparsable cells become null.
fn numeric_column(df: &DataFrame, name: &str) -> Option<Series> {
    df.column(name).ok()?.cast(&DataType::Float64).ok()
}

/// Column cast to `String`.
fn text_column(df: &DataFrame, name: &str) -> Option<Series> {
    df.column(name).ok()?.cast(&DataType::String).ok()
}

fn top_values(df: &DataFrame, name: &str, limit: usize) -> Option<Vec<(String, usize)>> {
    let column = text_column(df, name)?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column.str().ok()?.into_iter().flatten() {
        *counts.entry(value.to_string()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    Some(ranked)
}

fn distribution(df: &DataFrame, name: &str) -> Option<Vec<(f64, usize)>> {
    let column = numeric_column(df, name)?;
    let mut values: Vec<f64> = column.f64().ok()?.into_iter().flatten().collect();
    values.sort_by(f64::total_cmp);

    let mut out: Vec<(f64, usize)> = Vec::new();
    for value in values {
        match out.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => out.push((value, 1)),
        }
    }
    Some(out)
}

fn mean_text_length(df: &DataFrame, name: &str) -> Option<f64> {
    let column = text_column(df, name)?;
    let lengths: Vec<usize> = column
        .str()
        .ok()?
        .into_iter()
        .flatten()
        .map(|text| text.chars().count())
        .collect();
    mean_of(&lengths)
}

pub fn app_stats(df: &DataFrame, records: usize) -> AppStats {
    let rating = numeric_column(df, APP_RATING_FIELD);
    AppStats {
        summary: summarize_table(df, records),
        rating_mean: rating.as_ref().and_then(|s| s.mean()),
        rating_median: rating.as_ref().and_then(|s| s.median()),
        installs_non_null: df
            .column(APP_INSTALLS_FIELD)
            .ok()
            .map(|s| s.len() - s.null_count()),
        top_categories: top_values(df, APP_CATEGORY_FIELD, TOP_CATEGORIES),
    }
}

pub fn review_stats(df: &DataFrame, records: usize) -> ReviewStats {
    ReviewStats {
        summary: summarize_table(df, records),
        rating_mean: numeric_column(df, REVIEW_RATING_FIELD).and_then(|s| s.mean()),
        rating_distribution: distribution(df, REVIEW_RATING_FIELD),
        mean_content_length: mean_text_length(df, REVIEW_CONTENT_FIELD),
    }
}

/// Computes the exploration statistics. Every per-field statistic is skipped
/// when its column is absent; inputs are only read.
///
/// `app_records` and `review_records` are the record counts each table was built from.
pub fn explore(
    apps: Option<&DataFrame>,
    app_records: usize,
    reviews: Option<&DataFrame>,
    review_records: usize,
) -> ExplorationReport {
    ExplorationReport {
        applications: apps.map(|df| app_stats(df, app_records)),
        reviews: reviews.map(|df| review_stats(df, review_records)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apps_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("appId", &["a", "b", "c", "d"]),
            Series::new("score", &[Some(4.0), Some(3.0), None, Some(5.0)]),
            Series::new("installs", &[Some("1,000+"), None, Some("10+"), None]),
            Series::new(
                "genre",
                &[Some("Tools"), Some("Games"), Some("Tools"), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn summarize_table_counts_missing_cells() {
        let summary = summarize_table(&apps_frame(), 4);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns, 4);
        assert_eq!(summary.missing_values, 4);
        assert_eq!(summary.missing_in("installs"), Some(2));
        assert_eq!(summary.missing_in("appId"), Some(0));
        assert_eq!(summary.missing_in("absent"), None);
        assert!(summary.estimated_bytes > 0);
    }

    #[test]
    fn app_stats_rating_installs_and_genres() {
        let stats = app_stats(&apps_frame(), 4);
        assert_eq!(stats.rating_mean, Some(4.0));
        assert_eq!(stats.rating_median, Some(4.0));
        assert_eq!(stats.installs_non_null, Some(2));
        assert_eq!(
            stats.top_categories,
            Some(vec![("Tools".to_string(), 2), ("Games".to_string(), 1)])
        );
    }

    #[test]
    fn app_stats_skips_absent_fields() {
        let df = DataFrame::new(vec![Series::new("appId", &["a"])]).unwrap();
        let stats = app_stats(&df, 1);
        assert_eq!(stats.rating_mean, None);
        assert_eq!(stats.rating_median, None);
        assert_eq!(stats.installs_non_null, None);
        assert_eq!(stats.top_categories, None);
        assert_eq!(stats.summary.rows, 1);
    }

    #[test]
    fn top_categories_limited_to_five() {
        let genres: Vec<String> = (0..8).map(|i| format!("g{i}")).collect();
        let df = DataFrame::new(vec![Series::new("genre", genres)]).unwrap();
        let top = app_stats(&df, 8).top_categories.unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], ("g0".to_string(), 1));
    }

    #[test]
    fn review_stats_distribution_and_text_length() {
        let df = DataFrame::new(vec![
            Series::new("score", &[Some(5i64), Some(1), Some(5), None]),
            Series::new("content", &[Some("great"), Some("bad"), None, Some("ok")]),
            Series::new("appId", &["a", "a", "b", "b"]),
        ])
        .unwrap();

        let stats = review_stats(&df, 4);
        assert_eq!(stats.rating_distribution, Some(vec![(1.0, 1), (5.0, 2)]));
        let mean = stats.rating_mean.unwrap();
        assert!((mean - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.mean_content_length, Some(10.0 / 3.0));
        assert_eq!(stats.summary.missing_in("appId"), Some(0));
        assert_eq!(stats.summary.missing_values, 2);
    }

    #[test]
    fn review_stats_unparsable_ratings_are_ignored() {
        let df = DataFrame::new(vec![Series::new("score", &["4", "n/a", "2"])]).unwrap();
        let stats = review_stats(&df, 3);
        assert_eq!(stats.rating_mean, Some(3.0));
        assert_eq!(stats.rating_distribution, Some(vec![(2.0, 1), (4.0, 1)]));
        assert_eq!(stats.mean_content_length, None);
    }

    #[test]
    fn explore_handles_missing_tables() {
        let report = explore(None, 0, None, 0);
        assert!(report.applications.is_none());
        assert!(report.reviews.is_none());

        let df = apps_frame();
        let report = explore(Some(&df), 4, None, 0);
        assert_eq!(report.applications.unwrap().summary.rows, 4);
    }

    #[test]
    fn summarize_table_counts_field_less_records() {
        let df = DataFrame::new(Vec::<Series>::new()).unwrap();
        let summary = summarize_table(&df, 3);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 0);
        assert_eq!(summary.missing_values, 0);
    }
}
