use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.walmart.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_OUTPUT: &str = "walmart_results.json";

/// Every tunable of a scraping run.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Minimum pause between the end of one response and the next request.
    pub delay: Duration,
    /// Upper bound of the random extra wait added to `delay`.
    pub jitter: Duration,
    pub max_redirects: usize,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
    pub max_pages: u32,
    pub output: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            delay: Duration::from_millis(900),
            jitter: Duration::from_millis(700),
            max_redirects: 10,
            use_system_proxy: true,
            max_pages: 6,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl ScraperConfig {
    /// No waiting between requests; used for local fixtures.
    #[cfg(test)]
    pub fn without_delay() -> Self {
        ScraperConfig {
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
            use_system_proxy: false,
            ..Default::default()
        }
    }
}
