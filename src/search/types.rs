use serde::Deserialize;

/// One entry of the `search.options` config list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOption {
    Issue,
    PullRequest,
    Open,
    Closed,
}

/// Kind of post a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostType {
    Issue,
    PullRequest,
}

impl PostType {
    /// Escaped `is:` qualifier used in the search query.
    pub fn operator(self) -> &'static str {
        match self {
            PostType::Issue => "is%3Aissue",
            PostType::PullRequest => "is%3Apr",
        }
    }

    /// Path segment of a detail page (`/issues/12`, `/pull/12`).
    pub fn path_segment(self) -> &'static str {
        match self {
            PostType::Issue => "issues",
            PostType::PullRequest => "pull",
        }
    }

    /// Name of the URL list written for this type.
    pub fn urls_file(self) -> &'static str {
        match self {
            PostType::Issue => "issue_urls",
            PostType::PullRequest => "pull_request_urls",
        }
    }

    /// Directory holding one content file per retained post.
    pub fn contents_dir(self) -> &'static str {
        match self {
            PostType::Issue => "issues",
            PostType::PullRequest => "pull_requests",
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostType::Issue => write!(f, "Issues"),
            PostType::PullRequest => write!(f, "Pull Requests"),
        }
    }
}

/// Open/closed restriction appended to the search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    #[default]
    Any,
    Open,
    Closed,
}

impl StateFilter {
    pub fn operator(self) -> Option<&'static str> {
        match self {
            StateFilter::Any => None,
            StateFilter::Open => Some("is%3Aopen"),
            StateFilter::Closed => Some("is%3Aclosed"),
        }
    }
}

/// A validated `owner/repo` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    pub owner: String,
    pub repo: String,
}

impl RepoName {
    /// Directory name under the output root (`owner_repo`).
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
