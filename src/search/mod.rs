pub mod types;

pub use types::{PostType, RepoName, SearchOption, StateFilter};

use thiserror::Error;
use url::form_urlencoded;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid repository name: {0:?} (expected owner/repo)")]
    InvalidRepo(String),

    #[error("Search needs at least one non-blank keyword")]
    NoKeywords,
}

/// Parse an `owner/repo` string.
///
/// Surrounding whitespace is ignored; anything other than exactly two
/// non-empty segments is rejected.
pub fn parse_repo_name(raw: &str) -> Result<RepoName, SearchError> {
    let trimmed = raw.trim();
    let mut segments = trimmed.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) if is_segment(owner) && is_segment(repo) => Ok(RepoName {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(SearchError::InvalidRepo(raw.to_string())),
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

/// A keyword search against one repository's issue tracker.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    base_url: String,
    repo: RepoName,
    post_type: PostType,
    state: StateFilter,
    keywords: Vec<String>,
}

impl SearchQuery {
    pub fn new(
        base_url: &str,
        repo: RepoName,
        post_type: PostType,
        state: StateFilter,
        keywords: &[String],
    ) -> Result<Self, SearchError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(SearchError::NoKeywords);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repo,
            post_type,
            state,
            keywords,
        })
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    pub fn post_type(&self) -> PostType {
        self.post_type
    }

    /// Lower-cased keywords, in configured order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Search results URL, e.g.
    /// `https://github.com/foo/bar/issues?q=crash+android+is%3Aissue`.
    pub fn url(&self) -> String {
        let mut terms: Vec<String> = self
            .keywords
            .iter()
            .map(|k| form_urlencoded::byte_serialize(k.as_bytes()).collect())
            .collect();
        terms.push(self.post_type.operator().to_string());
        if let Some(state) = self.state.operator() {
            terms.push(state.to_string());
        }
        format!("{}/{}/issues?q={}", self.base_url, self.repo, terms.join("+"))
    }

    /// URL of results page `page` (1-based).
    pub fn page_url(&self, page: u32) -> String {
        format!("{}&page={}", self.url(), page)
    }

    /// Canonical URL of an issue or pull request.
    pub fn detail_url(&self, number: u64) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.repo,
            self.post_type.path_segment(),
            number
        )
    }
}
