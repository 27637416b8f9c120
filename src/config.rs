use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::search::{PostType, SearchOption, StateFilter};

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".gh-crawler.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration loaded from .gh-crawler.toml.
///
/// Every field is optional; the defaults reproduce a crawl of
/// `github_repos.csv` for issues and pull requests mentioning
/// crash/android/version/device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// What to search for
    #[serde(default)]
    pub search: SearchConfig,

    /// Where and how results are presented
    #[serde(default)]
    pub output: OutputConfig,

    /// Request pacing and crawl policy
    #[serde(default)]
    pub crawl: CrawlConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Comma-delimited file with one `owner/repo` per row
    pub repo_file: PathBuf,
    /// Post types and state filters to search
    pub options: Vec<SearchOption>,
    /// Every keyword must appear in a post for it to match
    pub keywords: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            repo_file: PathBuf::from("github_repos.csv"),
            options: vec![SearchOption::Issue, SearchOption::PullRequest],
            keywords: ["crash", "android", "version", "device"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for per-repository results
    pub dir: PathBuf,
    /// Render progress bars on stdout
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            progress: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    /// Pause before every results-page and detail-page request
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    /// Candidates before this position are kept whether or not they match
    pub retention_cap: usize,
    /// Above this many result pages, numbers below the smallest one found are also checked
    pub fallback_page_threshold: u32,
    /// Pause between repositories, per result found
    pub repo_delay_per_result_ms: u64,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com/".to_string(),
            request_delay_ms: 1000,
            timeout_secs: 30,
            retention_cap: 1000,
            fallback_page_threshold: 40,
            repo_delay_per_result_ms: 1000,
            user_agent: concat!("gh-keyword-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn repo_delay(&self, results: usize) -> Duration {
        Duration::from_millis(self.repo_delay_per_result_ms.saturating_mul(results as u64))
    }
}

impl Config {
    /// Load configuration from .gh-crawler.toml in the current directory.
    /// Returns the default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.keywords.is_empty() {
            return Err(ConfigError::Invalid("at least one keyword is required".to_string()));
        }
        if self.search.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("keywords must not be blank".to_string()));
        }
        if self.post_types().is_empty() {
            return Err(ConfigError::Invalid(
                "options must include \"issue\" or \"pull-request\"".to_string(),
            ));
        }
        Ok(())
    }

    /// Post types to crawl, issues first.
    pub fn post_types(&self) -> Vec<PostType> {
        let mut types = Vec::new();
        if self.search.options.contains(&SearchOption::Issue) {
            types.push(PostType::Issue);
        }
        if self.search.options.contains(&SearchOption::PullRequest) {
            types.push(PostType::PullRequest);
        }
        types
    }

    /// A state filter only applies when exactly one of open/closed is chosen.
    pub fn state_filter(&self) -> StateFilter {
        let open = self.search.options.contains(&SearchOption::Open);
        let closed = self.search.options.contains(&SearchOption::Closed);
        match (open, closed) {
            (true, false) => StateFilter::Open,
            (false, true) => StateFilter::Closed,
            _ => StateFilter::Any,
        }
    }
}
