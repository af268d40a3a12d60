// Default locations
pub const DEFAULT_SOURCE_DIR: &str = "data/raw";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";
pub const DEFAULT_BATCH_PATTERN: &str = "apps_batch_*.json";

// Record fields
pub const APP_ID_FIELD: &str = "appId";
pub const DEFAULT_REVIEWS_FIELD: &str = "reviews";
pub const UNKNOWN_APP_ID: &str = "unknown";

// Fields inspected by the exploration report
pub const APP_RATING_FIELD: &str = "score";
pub const APP_INSTALLS_FIELD: &str = "installs";
pub const APP_CATEGORY_FIELD: &str = "genre";
pub const REVIEW_RATING_FIELD: &str = "score";
pub const REVIEW_CONTENT_FIELD: &str = "content";
pub const TOP_CATEGORIES: usize = 5;

// Output artifacts
pub const APPS_ARTIFACT: &str = "apps_metadata";
pub const REVIEWS_ARTIFACT: &str = "reviews_metadata";
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const FLATTEN_SEPARATOR: &str = ".";
