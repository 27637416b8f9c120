use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::Relevance;
use crate::fetch::PageFetcher;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".js-issue-title").expect("static selector"));
static COMMENT_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".comment-body").expect("static selector"));

/// Pull the searchable text out of an issue or pull request page.
///
/// The first fragment is always the lower-cased title (empty when the page
/// has none); every comment body follows in document order, case preserved.
pub fn extract_fragments(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_lowercase())
        .unwrap_or_default();

    let mut fragments = vec![title];
    fragments.extend(
        document
            .select(&COMMENT_BODY)
            .map(|el| el.text().collect::<String>().trim().to_string()),
    );
    fragments
}

/// True when every keyword occurs, ignoring case, in at least one fragment.
pub fn matches_keywords(keywords: &[String], fragments: &[String]) -> bool {
    let haystacks: Vec<String> = fragments.iter().map(|f| f.to_lowercase()).collect();
    keywords.iter().all(|keyword| {
        let needle = keyword.to_lowercase();
        haystacks.iter().any(|h| h.contains(&needle))
    })
}

/// Fetch a detail page and decide whether it mentions every keyword.
///
/// Waits `delay` before the request. A page that cannot be fetched counts
/// as unrelated and contributes no fragments.
#[instrument(skip(fetcher, keywords, delay))]
pub async fn check_relevance(
    fetcher: &dyn PageFetcher,
    url: &str,
    keywords: &[String],
    delay: Duration,
) -> Relevance {
    tokio::time::sleep(delay).await;

    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(err) => {
            debug!(error = %err, "detail page unavailable, treating as unrelated");
            return Relevance::default();
        }
    };

    let fragments = extract_fragments(&body);
    let related = matches_keywords(keywords, &fragments);
    debug!(related, fragments = fragments.len(), "checked candidate");
    Relevance { related, fragments }
}
