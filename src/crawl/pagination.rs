use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

use crate::fetch::PageFetcher;

static PAGINATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("em.current").expect("static selector"));

/// Read `data-total-pages` from the first `em.current` pagination marker.
///
/// Returns `None` when the marker is missing, malformed, or zero.
pub fn parse_total_pages(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let marker = document.select(&PAGINATION).next()?;
    marker
        .value()
        .attr("data-total-pages")?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&pages| pages >= 1)
}

/// Number of result pages behind a search URL.
///
/// Never fails: anything that goes wrong means the search is treated as a
/// single page, which is still crawled.
#[instrument(skip(fetcher))]
pub async fn resolve_total_pages(fetcher: &dyn PageFetcher, url: &str) -> u32 {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "could not fetch search page, assuming one page");
            return 1;
        }
    };

    match parse_total_pages(&body) {
        Some(pages) => {
            debug!(pages, "resolved pagination");
            pages
        }
        None => {
            debug!("no pagination marker, assuming one page");
            1
        }
    }
}
