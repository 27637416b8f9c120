mod config;
mod crawl;
mod fetch;
mod progress;
mod report;
mod repos;
mod search;

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::crawl::Crawler;
use crate::fetch::HttpFetcher;
use crate::report::RepoSummary;
use crate::search::{RepoName, SearchError, SearchQuery};

/// gh-keyword-crawler — searches GitHub issues and pull requests of a list of
/// repositories for posts mentioning every configured keyword, and saves the
/// matches as plain text files.
#[derive(Parser, Debug)]
#[command(name = "gh-keyword-crawler", version, about)]
struct Cli {
    /// Config file (defaults to .gh-crawler.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output root directory, overriding output.dir
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Repository list file, overriding search.repo_file
    #[arg(long)]
    repos: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        if let Some(repos) = &self.repos {
            config.search.repo_file = repos.clone();
        }
        if self.no_progress {
            config.output.progress = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);

    let repos = repos::load_repo_names(&config.search.repo_file)?;
    info!(
        count = repos.len(),
        file = %config.search.repo_file.display(),
        "loaded repositories"
    );
    if repos.is_empty() {
        warn!("repository list is empty, nothing to crawl");
    }

    let fetcher = HttpFetcher::new(&config.crawl)?;
    let crawler = Crawler::new(fetcher, config.crawl.clone(), config.output.progress);

    let mut summaries = Vec::with_capacity(repos.len());
    for (i, repo) in repos.iter().enumerate() {
        report::print_banner(repo);
        let queries = build_queries(&config, repo)?;
        let result = crawler
            .crawl_repository(&queries)
            .instrument(info_span!("repository", repo = %repo))
            .await?;

        report::save(&result, &config.output.dir, repo)?;
        let summary = RepoSummary::new(repo, &result);
        info!(
            repo = %repo,
            issues = summary.issues,
            pull_requests = summary.pull_requests,
            "repository done"
        );

        if i + 1 < repos.len() {
            tokio::time::sleep(config.crawl.repo_delay(summary.total())).await;
        }
        summaries.push(summary);
    }

    report::print_summary(&summaries);
    Ok(())
}

/// One search per configured post type, issues first.
fn build_queries(config: &Config, repo: &RepoName) -> Result<Vec<SearchQuery>, SearchError> {
    config
        .post_types()
        .into_iter()
        .map(|post_type| {
            SearchQuery::new(
                &config.crawl.base_url,
                repo.clone(),
                post_type,
                config.state_filter(),
                &config.search.keywords,
            )
        })
        .collect()
}
