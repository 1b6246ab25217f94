use std::collections::HashSet;

use tracing::{info, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::fetcher::PageSource;
use crate::links::extract_links;
use crate::models::ProductRecord;
use crate::parser::parse_product;
use crate::query::{self, QueryError};

/// Searches for `query` and returns one record per product page that could be
/// fetched, at most `max_results` of them. Failed fetches are skipped.
pub fn run<S: PageSource>(
    source: &mut S,
    config: &ScraperConfig,
    query: &str,
    max_results: usize,
) -> Result<Vec<ProductRecord>, QueryError> {
    let query = query::normalize_query(query)?;
    let base = query::parse_base_url(&config.base_url)?;

    let urls = collect_product_urls(source, &base, &query, max_results, config.max_pages);
    if urls.is_empty() {
        println!("No product URLs found for '{}'.", query);
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        println!("[{}/{}] Fetching: {}", i + 1, urls.len(), url);
        match source.fetch(url) {
            Ok(html) => records.push(parse_product(&html, url)),
            Err(e) => {
                warn!(url = url.as_str(), error = %e, "skipping product page");
                println!("  -> Skipped: {}", e);
            }
        }
    }

    info!(collected = records.len(), candidates = urls.len(), "run finished");
    Ok(records)
}

/// Walks search result pages until `max_results` distinct product URLs are
/// known, a page adds nothing new, a page fails, or `max_pages` is reached.
fn collect_product_urls<S: PageSource>(
    source: &mut S,
    base: &Url,
    query: &str,
    max_results: usize,
    max_pages: u32,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for page in 1..=max_pages {
        if urls.len() >= max_results {
            break;
        }

        let search_url = query::search_url(base, query, page);
        let html = match source.fetch(search_url.as_str()) {
            Ok(html) => html,
            Err(e) => {
                warn!(page, error = %e, "failed to fetch search page");
                break;
            }
        };

        let before = urls.len();
        for url in extract_links(&html, base) {
            if urls.len() >= max_results {
                break;
            }
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
        info!(page, new = urls.len() - before, total = urls.len(), "scanned search page");

        if urls.len() == before {
            break;
        }
    }

    urls
}
