use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};

pub const DEFAULT_BASE_URL: &str = "https://country-leaders.onrender.com";
pub const DEFAULT_OUTPUT: &str = "leaders_data.json";
/// Upper bound for any one worker pool, so neither the API nor Wikipedia
/// sees more than this many requests from a single pool.
pub const MAX_WORKERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Sequential,
    Concurrent,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub cookie_endpoint: String,
    pub countries_endpoint: String,
    pub leaders_endpoint: String,
    pub output_path: PathBuf,
    pub mode: RunMode,
    pub workers: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_endpoint: "/cookie".to_string(),
            countries_endpoint: "/countries".to_string(),
            leaders_endpoint: "/leaders".to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            mode: RunMode::Sequential,
            workers: MAX_WORKERS,
            timeout: Duration::from_secs(30),
            user_agent: format!(
                "leaders-scraper/{} (country leaders biography collector)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl ScraperConfig {
    pub fn validate(&self) -> ScrapeResult<()> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("base URL '{}': {}", self.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!("'{}' cannot be used as a base URL", self.base_url)));
        }
        if self.workers == 0 {
            return Err(ScrapeError::Config("worker count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pool size actually used, capped at [`MAX_WORKERS`].
    pub fn pool_size(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS)
    }

    /// Joins an endpoint path onto the base URL, tolerating a trailing slash
    /// on the base and a missing leading slash on the endpoint.
    pub fn endpoint_url(&self, endpoint: &str) -> ScrapeResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ScrapeError::parse(format!("endpoint URL '{}'", joined), e))
    }
}
