//! Common test utilities for integration tests

use apps_merge::config::ResolvedConfig;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Helper function to create a batch file in a directory
#[allow(dead_code)]
pub fn create_batch_file(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::File::create(dir.join(name))
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
}

/// Configuration reading from `source` and writing to `output`
#[allow(dead_code)]
pub fn config_for(source: &Path, output: &Path) -> ResolvedConfig {
    ResolvedConfig {
        source_dir: source.to_path_buf(),
        output_dir: output.to_path_buf(),
        ..ResolvedConfig::default()
    }
}

/// Batch with one app carrying two reviews
#[allow(dead_code)]
pub const BATCH_WITH_REVIEWS: &str = r#"[
  {
    "appId": "com.example.notes",
    "title": "Notes",
    "score": 4.5,
    "installs": "1,000+",
    "genre": "Productivity",
    "reviews": [
      {"reviewId": "r1", "userName": "Ana", "score": 5, "content": "Great app"},
      {"reviewId": "r2", "userName": "Bo", "score": 3, "content": "Okay"}
    ]
  }
]"#;

/// Batch with one app and no reviews
#[allow(dead_code)]
pub const BATCH_WITHOUT_REVIEWS: &str = r#"[
  {
    "appId": "com.example.timer",
    "title": "Timer",
    "score": 3.9,
    "installs": "500+",
    "genre": "Tools",
    "reviews": []
  }
]"#;

/// Batch holding an unterminated array
#[allow(dead_code)]
pub const MALFORMED_BATCH: &str = r#"[{"appId": "com.example.broken""#;
