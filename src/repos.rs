use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::search::{parse_repo_name, RepoName};

#[derive(Debug, Error)]
pub enum RepoListError {
    #[error("Failed to read repository list {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
}

/// Read `owner/repo` names from a comma-delimited file.
pub fn load_repo_names(path: &Path) -> Result<Vec<RepoName>, RepoListError> {
    let contents = fs::read_to_string(path).map_err(|source| RepoListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_repo_list(&contents))
}

/// Only the first field of each row is used. Blank rows are skipped, and so
/// are rows whose first field is not an `owner/repo` name.
pub fn parse_repo_list(contents: &str) -> Vec<RepoName> {
    let contents = contents.trim_start_matches('\u{feff}');
    let mut names = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let field = line.split(',').next().unwrap_or_default();
        let field = field.trim().trim_matches('"').trim();
        if field.is_empty() {
            continue;
        }
        match parse_repo_name(field) {
            Ok(name) => names.push(name),
            Err(err) => warn!(line = line_no + 1, error = %err, "skipping repository row"),
        }
    }
    names
}
