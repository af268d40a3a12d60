use crate::errors::AppResult;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Translates a file-name glob into an anchored regex.
///
/// Only `*` (any run of characters) and `?` (exactly one character) are special;
/// everything else matches literally.
pub(crate) fn glob_to_regex(pattern: &str) -> AppResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                expr.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

/// Finds batch files directly inside `dir` whose file name matches `pattern`.
///
/// Subdirectories are not descended into. The result is sorted lexicographically
/// by file name, which fixes the merge order. A missing directory yields an empty
/// list; the caller decides whether that is an error.
///
/// # Errors
///
/// Returns `InvalidInput` if the pattern cannot be compiled.
pub fn find_batch_files(dir: &Path, pattern: &str) -> AppResult<Vec<PathBuf>> {
    let matcher = glob_to_regex(pattern)?;

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| matcher.is_match(name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "[]").unwrap();
    }

    #[test]
    fn test_glob_to_regex_wildcards() {
        let re = glob_to_regex("apps_batch_*.json").unwrap();
        assert!(re.is_match("apps_batch_20240101_120000.json"));
        assert!(re.is_match("apps_batch_.json"));
        assert!(!re.is_match("apps_batch_1.json.bak"));
        assert!(!re.is_match("apps_batch_1xjson"));
        assert!(!re.is_match("old_apps_batch_1.json"));

        let re = glob_to_regex("b?.json").unwrap();
        assert!(re.is_match("b1.json"));
        assert!(!re.is_match("b12.json"));
    }

    #[test]
    fn test_find_batch_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        touch(&dir.join("apps_batch_20240102.json"));
        touch(&dir.join("apps_batch_20240101.json"));
        touch(&dir.join("apps_merged.json"));
        touch(&dir.join("scraping_checkpoint.json"));
        touch(&dir.join("nested/apps_batch_20240103.json"));

        let files = find_batch_files(dir, "apps_batch_*.json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["apps_batch_20240101.json", "apps_batch_20240102.json"]
        );
    }

    #[test]
    fn test_find_batch_files_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = find_batch_files(&temp_dir.path().join("absent"), "*.json").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_find_batch_files_ignores_directories_matching_pattern() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("apps_batch_dir.json")).unwrap();
        let files = find_batch_files(temp_dir.path(), "apps_batch_*.json").unwrap();
        assert!(files.is_empty());
    }
}
