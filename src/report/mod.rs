pub mod types;

pub use types::RepoSummary;

use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::crawl::CrawlResult;
use crate::search::{PostType, RepoName};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    FileWrite { path: PathBuf, source: std::io::Error },
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(path).map_err(|source| ReportError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist a repository's crawl under `root`.
///
/// Layout, with `owner/repo` stored as `owner_repo`:
///
/// ```text
/// <root>/owner_repo/issue_urls
/// <root>/owner_repo/issues/<number>
/// <root>/owner_repo/pull_request_urls
/// <root>/owner_repo/pull_requests/<number>
/// ```
///
/// Post types with nothing retained leave no files behind. Writes are not
/// atomic; a failure part way through leaves what was already written.
#[instrument(skip(result, root, repo), fields(repo = %repo))]
pub fn write_results(result: &CrawlResult, root: &Path, repo: &RepoName) -> Result<PathBuf, ReportError> {
    let repo_dir = root.join(repo.dir_name());
    create_dir(&repo_dir)?;

    for post_type in [PostType::Issue, PostType::PullRequest] {
        let retained = result.for_type(post_type);
        if retained.is_empty() {
            continue;
        }

        let urls: String = retained.iter().map(|m| format!("{}\n", m.url)).collect();
        write_file(&repo_dir.join(post_type.urls_file()), &urls)?;

        let contents_dir = repo_dir.join(post_type.contents_dir());
        create_dir(&contents_dir)?;
        for entry in retained.iter() {
            write_file(&contents_dir.join(entry.number.to_string()), &entry.contents())?;
        }
        debug!(post_type = %post_type, files = retained.len(), "wrote results");
    }

    Ok(repo_dir)
}

/// Repository name framed by `=` rules.
pub fn banner(repo: &RepoName) -> String {
    let name = repo.to_string();
    let rule = "=".repeat(name.len() + 4);
    format!("{rule}\n  {name}\n{rule}")
}

pub fn print_banner(repo: &RepoName) {
    println!("{}", banner(repo).cyan().bold());
}

/// Write results to disk, reporting progress on the console.
pub fn save(result: &CrawlResult, root: &Path, repo: &RepoName) -> Result<PathBuf, ReportError> {
    print!("Save results to files .... ");
    match write_results(result, root, repo) {
        Ok(dir) => {
            println!("{}\n", "DONE".green().bold());
            Ok(dir)
        }
        Err(err) => {
            println!("{}", "FAILED".red().bold());
            Err(err)
        }
    }
}

pub fn print_summary(summaries: &[RepoSummary]) {
    println!("{}", "═══ Summary ═══".bold());
    for summary in summaries {
        let line = format!(
            "{}: {} issues, {} pull requests",
            summary.repo, summary.issues, summary.pull_requests
        );
        if summary.total() == 0 {
            println!("  {}", line.dimmed());
        } else {
            println!("  {}", line);
        }
    }
}
