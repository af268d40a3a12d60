mod render;
mod stats;

// Re-export public API
pub use render::render_report;
pub use stats::{
    app_stats, explore, review_stats, summarize_table, AppStats, ExplorationReport, ReviewStats,
    TableSummary,
};
