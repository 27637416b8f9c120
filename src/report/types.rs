use crate::crawl::CrawlResult;
use crate::search::RepoName;

/// Per-repository line of the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    pub repo: String,
    pub issues: usize,
    pub pull_requests: usize,
}

impl RepoSummary {
    pub fn new(repo: &RepoName, result: &CrawlResult) -> Self {
        Self {
            repo: repo.to_string(),
            issues: result.issues.len(),
            pull_requests: result.pull_requests.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.issues + self.pull_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::MatchResult;
    use crate::search::parse_repo_name;

    #[test]
    fn test_summary_counts() {
        let mut result = CrawlResult::default();
        result.issues.insert(MatchResult {
            number: 1,
            url: "https://github.com/foo/bar/issues/1".to_string(),
            fragments: vec![],
        });
        let summary = RepoSummary::new(&parse_repo_name("foo/bar").unwrap(), &result);
        assert_eq!(summary.repo, "foo/bar");
        assert_eq!(summary.issues, 1);
        assert_eq!(summary.pull_requests, 0);
        assert_eq!(summary.total(), 1);
    }
}
