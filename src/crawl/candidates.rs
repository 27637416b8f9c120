use regex::Regex;
use scraper::Html;
use std::collections::BTreeSet;
use std::num::ParseIntError;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

use super::CrawlError;
use crate::fetch::PageFetcher;

static ISSUE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"issue_([0-9]+)").expect("static regex"));

/// Collect the numbers of every `issue_<digits>` identifier in a results page.
///
/// The scan runs over the serialized markup of the parsed document rather
/// than its rendered text, because GitHub carries these identifiers in
/// element ids (`<div id="issue_123">`) that never show up as text.
pub fn extract_candidates(html: &str) -> Result<BTreeSet<u64>, ParseIntError> {
    let document = Html::parse_document(html);
    let markup = document.root_element().html();

    let mut numbers = BTreeSet::new();
    for captures in ISSUE_ID.captures_iter(&markup) {
        let number = captures[1].parse::<u64>()?;
        if number > 0 {
            numbers.insert(number);
        }
    }
    Ok(numbers)
}

/// Fetch one results page and list the candidates on it.
///
/// Waits `delay` before the request. Unlike pagination, a failure here is
/// fatal for the crawl.
#[instrument(skip(fetcher, delay))]
pub async fn enumerate_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    delay: Duration,
) -> Result<BTreeSet<u64>, CrawlError> {
    tokio::time::sleep(delay).await;

    let body = fetcher
        .fetch(url)
        .await
        .map_err(|source| CrawlError::Enumeration {
            url: url.to_string(),
            source,
        })?;

    let numbers = extract_candidates(&body).map_err(|source| CrawlError::CandidateNumber {
        url: url.to_string(),
        source,
    })?;
    debug!(found = numbers.len(), "enumerated candidates");
    Ok(numbers)
}
