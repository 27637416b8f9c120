use std::collections::HashMap;

use crate::search::PostType;

/// A retained issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Issue or PR number
    pub number: u64,
    /// Canonical detail-page URL
    pub url: String,
    /// Lower-cased title followed by each comment body
    pub fragments: Vec<String>,
}

impl MatchResult {
    /// Fragments joined without separator, as written to disk.
    pub fn contents(&self) -> String {
        self.fragments.concat()
    }
}

/// Outcome of checking one detail page against the keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relevance {
    pub related: bool,
    pub fragments: Vec<String>,
}

/// Number → MatchResult mapping that iterates in insertion order.
///
/// Inserting a number that is already present replaces its value but keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct ResultMap {
    entries: Vec<MatchResult>,
    index: HashMap<u64, usize>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: MatchResult) {
        match self.index.get(&result.number) {
            Some(&pos) => self.entries[pos] = result,
            None => {
                self.index.insert(result.number, self.entries.len());
                self.entries.push(result);
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, number: u64) -> Option<&MatchResult> {
        self.index.get(&number).map(|&pos| &self.entries[pos])
    }

    #[cfg(test)]
    pub fn contains(&self, number: u64) -> bool {
        self.index.contains_key(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn numbers(&self) -> Vec<u64> {
        self.entries.iter().map(|m| m.number).collect()
    }
}

/// Everything retained for one repository.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub issues: ResultMap,
    pub pull_requests: ResultMap,
}

impl CrawlResult {
    pub fn for_type(&self, post_type: PostType) -> &ResultMap {
        match post_type {
            PostType::Issue => &self.issues,
            PostType::PullRequest => &self.pull_requests,
        }
    }

    pub fn for_type_mut(&mut self, post_type: PostType) -> &mut ResultMap {
        match post_type {
            PostType::Issue => &mut self.issues,
            PostType::PullRequest => &mut self.pull_requests,
        }
    }
}
