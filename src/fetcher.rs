use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{StatusCode, redirect};
use thiserror::Error;
use tracing::debug;

use crate::config::ScraperConfig;

const BOT_CHECK_KEYWORDS: &[&str] = &[
    "are you a human",
    "captcha",
    "please verify",
    "verify you are a human",
    "access denied",
    "unusual traffic",
    "robot or human",
];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("{url} returned a bot-check/captcha page")]
    BotCheck { url: String },
}

/// Anything that can hand back the HTML behind a URL.
pub trait PageSource {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError>;
}

/// One HTTP session reused for the whole run: shared connection pool, fixed
/// headers, and a polite gap between consecutive requests.
pub struct Fetcher {
    client: Client,
    delay: Duration,
    jitter: Duration,
    last_request: Option<Instant>,
}

impl Fetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let max_redirects = config.max_redirects;
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("Too many redirects (>{max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", config.base_url.trim_end_matches('/'))) {
            headers.insert(header::REFERER, referer);
        }

        let mut builder = Client::builder()
            .redirect(redirect_policy)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Fetcher {
            client,
            delay: config.delay,
            jitter: config.jitter,
            last_request: None,
        })
    }

    /// Waits until `delay` (plus jitter) has passed since the previous
    /// response finished, however long that response took.
    fn pause_before_request(&self) {
        if let Some(last) = self.last_request {
            let wait = self.delay + random_jitter(self.jitter);
            let elapsed = last.elapsed();
            if elapsed < wait {
                thread::sleep(wait - elapsed);
            }
        }
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        let html = resp.text()?;
        if is_bot_page(&html) {
            return Err(FetchError::BotCheck { url: url.to_string() });
        }
        Ok(html)
    }
}

impl PageSource for Fetcher {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.pause_before_request();
        debug!(url, "GET");

        let result = self.get(url);
        self.last_request = Some(Instant::now());
        result
    }
}

fn random_jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Captcha and "verify you are human" interstitials announce themselves near
/// the top of the document.
pub fn is_bot_page(html: &str) -> bool {
    let head: String = html.chars().take(2000).collect::<String>().to_lowercase();
    BOT_CHECK_KEYWORDS.iter().any(|kw| head.contains(kw))
}
