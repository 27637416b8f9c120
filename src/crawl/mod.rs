pub mod candidates;
pub mod pagination;
pub mod relevance;
pub mod types;

pub use types::{CrawlResult, MatchResult, ResultMap};

use colored::Colorize;
use std::collections::BTreeSet;
use std::num::ParseIntError;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::CrawlConfig;
use crate::fetch::{FetchError, PageFetcher};
use crate::progress::ProgressBar;
use crate::search::SearchQuery;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to list candidates from {url}: {source}")]
    Enumeration { url: String, source: FetchError },

    #[error("Unreadable candidate number on {url}: {source}")]
    CandidateNumber { url: String, source: ParseIntError },
}

/// Candidates in the order they are checked.
///
/// Numbers found on the result pages come first, highest first. When the
/// search spans more than `fallback_page_threshold` pages the listing is
/// assumed to undercount, so every number below the smallest one found is
/// appended as well, again highest first.
pub fn plan_candidates(found: &BTreeSet<u64>, total_pages: u32, fallback_page_threshold: u32) -> Vec<u64> {
    let mut planned: Vec<u64> = found.iter().rev().copied().collect();
    if total_pages > fallback_page_threshold {
        if let Some(&smallest) = found.first() {
            planned.extend((1..smallest).rev());
        }
    }
    planned
}

/// The first `retention_cap` candidates are kept unconditionally; later ones
/// only when they match every keyword.
pub fn should_retain(position: usize, retention_cap: usize, related: bool) -> bool {
    position < retention_cap || related
}

/// Walks GitHub search results for one repository at a time.
///
/// Requests are issued strictly one after another, each detail and results
/// page preceded by the configured delay.
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    settings: CrawlConfig,
    progress: bool,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, settings: CrawlConfig, progress: bool) -> Self {
        Self {
            fetcher,
            settings,
            progress,
        }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run every query (one per post type) and gather the retained posts.
    pub async fn crawl_repository(&self, queries: &[SearchQuery]) -> Result<CrawlResult, CrawlError> {
        let mut result = CrawlResult::default();
        for query in queries {
            let retained = self.crawl(query).await?;
            *result.for_type_mut(query.post_type()) = retained;
        }
        Ok(result)
    }

    /// Crawl a single search: paginate, enumerate, then filter each candidate.
    #[instrument(skip(self, query), fields(repo = %query.repo(), post_type = %query.post_type()))]
    pub async fn crawl(&self, query: &SearchQuery) -> Result<ResultMap, CrawlError> {
        println!("{}", format!("Crawl {}", query.post_type()).bold());
        let delay = self.settings.request_delay();

        let search_url = query.url();
        let total_pages = pagination::resolve_total_pages(&self.fetcher, &search_url).await;

        let mut found = BTreeSet::new();
        let mut bar = ProgressBar::new(self.progress, total_pages as usize, " - List");
        bar.start();
        for page in 1..=total_pages {
            bar.update();
            let numbers = candidates::enumerate_page(&self.fetcher, &query.page_url(page), delay).await?;
            found.extend(numbers);
        }

        let planned = plan_candidates(&found, total_pages, self.settings.fallback_page_threshold);
        info!(
            total_pages,
            found = found.len(),
            planned = planned.len(),
            "enumerated candidates"
        );

        let mut retained = ResultMap::new();
        if planned.is_empty() {
            return Ok(retained);
        }

        let mut bar = ProgressBar::new(self.progress, planned.len(), " - Page");
        bar.start();
        for (position, &number) in planned.iter().enumerate() {
            bar.update();
            let url = query.detail_url(number);
            let relevance = relevance::check_relevance(&self.fetcher, &url, query.keywords(), delay).await;
            if should_retain(position, self.settings.retention_cap, relevance.related) {
                debug!(number, related = relevance.related, "retained");
                retained.insert(MatchResult {
                    number,
                    url,
                    fragments: relevance.fragments,
                });
            }
        }

        info!(retained = retained.len(), "filtered candidates");
        Ok(retained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::FakeFetcher;
    use crate::search::{parse_repo_name, PostType, StateFilter};

    fn query(post_type: PostType) -> SearchQuery {
        SearchQuery::new(
            "https://github.com/",
            parse_repo_name("foo/bar").unwrap(),
            post_type,
            StateFilter::Any,
            &["crash".to_string(), "android".to_string()],
        )
        .unwrap()
    }

    fn settings(retention_cap: usize) -> CrawlConfig {
        CrawlConfig {
            request_delay_ms: 0,
            retention_cap,
            ..CrawlConfig::default()
        }
    }

    fn pagination(total: u32) -> String {
        format!(r#"<div class="pagination"><em class="current" data-total-pages="{total}">1</em></div>"#)
    }

    fn listing(numbers: &[u64]) -> String {
        numbers
            .iter()
            .map(|n| format!(r#"<div id="issue_{n}" class="js-issue-row">#{n}</div>"#))
            .collect()
    }

    fn detail(title: &str, comments: &[&str]) -> String {
        let mut html = format!(r#"<span class="js-issue-title">{title}</span>"#);
        for comment in comments {
            html.push_str(&format!(r#"<div class="comment-body">{comment}</div>"#));
        }
        html
    }

    /// Three result pages: {10,9,8}, {7,6}, {5}. #9 mentions both keywords,
    /// #7 only "crash", every other detail page is missing.
    fn three_page_fetcher(post_type: PostType) -> FakeFetcher {
        let q = query(post_type);
        FakeFetcher::new()
            .with_page(q.url(), pagination(3))
            .with_page(q.page_url(1), listing(&[10, 9, 8]))
            .with_page(q.page_url(2), listing(&[7, 6]))
            .with_page(q.page_url(3), listing(&[5]))
            .with_page(q.detail_url(9), detail("Crash on launch", &["Only on Android 13"]))
            .with_page(q.detail_url(7), detail("Crash on exit", &["Windows only"]))
    }

    #[test]
    fn test_plan_sorts_descending() {
        let found: BTreeSet<u64> = [5, 10, 7].into_iter().collect();
        assert_eq!(plan_candidates(&found, 3, 40), vec![10, 7, 5]);
    }

    #[test]
    fn test_plan_extends_below_smallest_on_many_pages() {
        let found: BTreeSet<u64> = [9, 6, 12].into_iter().collect();
        let planned = plan_candidates(&found, 41, 40);
        assert_eq!(planned, vec![12, 9, 6, 5, 4, 3, 2, 1]);

        let tail = &planned[3..];
        let unique: BTreeSet<u64> = tail.iter().copied().collect();
        assert_eq!(unique.len(), tail.len());
        assert_eq!(unique, (1..6).collect::<BTreeSet<u64>>());
    }

    #[test]
    fn test_plan_no_extension_at_threshold() {
        let found: BTreeSet<u64> = [9, 6].into_iter().collect();
        assert_eq!(plan_candidates(&found, 40, 40), vec![9, 6]);
    }

    #[test]
    fn test_plan_empty_set_is_not_extended() {
        assert!(plan_candidates(&BTreeSet::new(), 100, 40).is_empty());
    }

    #[test]
    fn test_retention_cap() {
        // position 5, no keyword match: still kept
        assert!(should_retain(5, 1000, false));
        // position 1500, no keyword match: dropped
        assert!(!should_retain(1500, 1000, false));
        assert!(should_retain(1500, 1000, true));
        assert!(!should_retain(1000, 1000, false));
    }

    #[tokio::test]
    async fn test_crawl_retains_everything_under_cap() {
        let crawler = Crawler::new(three_page_fetcher(PostType::Issue), settings(1000), false);
        let retained = crawler.crawl(&query(PostType::Issue)).await.unwrap();
        assert_eq!(retained.numbers(), vec![10, 9, 8, 7, 6, 5]);
        assert!(retained.get(8).unwrap().fragments.is_empty());
        assert_eq!(
            retained.get(9).unwrap().fragments,
            vec!["crash on launch".to_string(), "Only on Android 13".to_string()]
        );
    }

    #[tokio::test]
    async fn test_crawl_keeps_only_related_past_cap() {
        let crawler = Crawler::new(three_page_fetcher(PostType::Issue), settings(0), false);
        let retained = crawler.crawl(&query(PostType::Issue)).await.unwrap();
        assert_eq!(retained.numbers(), vec![9]);
        assert_eq!(retained.get(9).unwrap().url, "https://github.com/foo/bar/issues/9");
        assert!(!retained.contains(7));
    }

    #[tokio::test]
    async fn test_crawl_mixed_cap() {
        let crawler = Crawler::new(three_page_fetcher(PostType::Issue), settings(2), false);
        let retained = crawler.crawl(&query(PostType::Issue)).await.unwrap();
        assert_eq!(retained.numbers(), vec![10, 9]);
    }

    #[tokio::test]
    async fn test_crawl_request_order() {
        let q = query(PostType::Issue);
        let crawler = Crawler::new(three_page_fetcher(PostType::Issue), settings(0), false);
        crawler.crawl(&q).await.unwrap();

        let mut expected = vec![q.url(), q.page_url(1), q.page_url(2), q.page_url(3)];
        expected.extend([10, 9, 8, 7, 6, 5].map(|n| q.detail_url(n)));
        assert_eq!(crawler.fetcher().requested(), expected);
    }

    #[tokio::test]
    async fn test_crawl_fallback_on_many_pages() {
        let q = query(PostType::Issue);
        let mut fetcher = FakeFetcher::new()
            .with_page(q.url(), pagination(41))
            .with_page(q.page_url(1), listing(&[5]))
            .with_page(q.detail_url(2), detail("android crash", &[]));
        for page in 2..=41 {
            fetcher = fetcher.with_page(q.page_url(page), "<p>empty</p>");
        }

        let crawler = Crawler::new(fetcher, settings(0), false);
        let retained = crawler.crawl(&q).await.unwrap();
        assert_eq!(retained.numbers(), vec![2]);

        let details: Vec<String> = crawler
            .fetcher()
            .requested()
            .into_iter()
            .filter(|url| !url.contains("?q="))
            .collect();
        assert_eq!(details, [5, 4, 3, 2, 1].map(|n| q.detail_url(n)).to_vec());
    }

    #[tokio::test]
    async fn test_crawl_without_pagination_marker_uses_one_page() {
        let q = query(PostType::Issue);
        let fetcher = FakeFetcher::new()
            .with_page(q.url(), "<p>no marker</p>")
            .with_page(q.page_url(1), listing(&[3]));
        let crawler = Crawler::new(fetcher, settings(1000), false);
        let retained = crawler.crawl(&q).await.unwrap();
        assert_eq!(retained.numbers(), vec![3]);
    }

    #[tokio::test]
    async fn test_missing_results_page_is_fatal() {
        let q = query(PostType::Issue);
        let fetcher = FakeFetcher::new()
            .with_page(q.url(), pagination(2))
            .with_page(q.page_url(1), listing(&[3]));
        let crawler = Crawler::new(fetcher, settings(1000), false);
        let err = crawler.crawl(&q).await.unwrap_err();
        match err {
            CrawlError::Enumeration { url, .. } => assert_eq!(url, q.page_url(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_crawl_then_write_lists_retained_urls() {
        let q = query(PostType::Issue);
        // #9 shows up on two result pages but is checked and written once.
        let fetcher = three_page_fetcher(PostType::Issue).with_page(q.page_url(2), listing(&[9, 7, 6]));
        let crawler = Crawler::new(fetcher, settings(0), false);
        let result = crawler.crawl_repository(&[q.clone()]).await.unwrap();

        let root = tempfile::tempdir().unwrap();
        let repo_dir = crate::report::write_results(&result, root.path(), q.repo()).unwrap();
        assert_eq!(
            std::fs::read_to_string(repo_dir.join("issue_urls")).unwrap(),
            "https://github.com/foo/bar/issues/9\n"
        );
        assert_eq!(
            std::fs::read_to_string(repo_dir.join("issues").join("9")).unwrap(),
            "crash on launchOnly on Android 13"
        );
        assert!(!repo_dir.join("pull_request_urls").exists());
    }

    #[tokio::test]
    async fn test_crawl_then_write_keeps_order_under_cap() {
        let q = query(PostType::Issue);
        let crawler = Crawler::new(three_page_fetcher(PostType::Issue), settings(1000), false);
        let result = crawler.crawl_repository(&[q.clone()]).await.unwrap();

        let root = tempfile::tempdir().unwrap();
        let repo_dir = crate::report::write_results(&result, root.path(), q.repo()).unwrap();
        let expected: String = [10, 9, 8, 7, 6, 5]
            .map(|n| format!("{}\n", q.detail_url(n)))
            .concat();
        assert_eq!(std::fs::read_to_string(repo_dir.join("issue_urls")).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_crawl_repository_fills_matching_type() {
        let crawler = Crawler::new(three_page_fetcher(PostType::PullRequest), settings(0), false);
        let result = crawler
            .crawl_repository(&[query(PostType::PullRequest)])
            .await
            .unwrap();
        assert!(result.issues.is_empty());
        assert_eq!(result.pull_requests.numbers(), vec![9]);
        assert_eq!(
            result.pull_requests.get(9).unwrap().url,
            "https://github.com/foo/bar/pull/9"
        );
    }
}
