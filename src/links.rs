use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const PRODUCT_PATH: &str = "/ip/";

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Product paths embedded anywhere in the raw page, including script payloads.
static RAW_PRODUCT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(?:https?:)?//[^/"'\\\s<>]+)?(/ip/[^"'\\\s<>]+)"#).unwrap()
});

/// Collects product page URLs from a search results page, first occurrence
/// wins. Falls back to scanning the raw HTML when no anchor points at a
/// product, which happens when results are rendered client-side.
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);

    let from_anchors: Vec<String> = doc
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(PRODUCT_PATH) && !href.to_ascii_lowercase().starts_with("/b/"))
        .filter_map(|href| normalize_product_url(href, base))
        .collect();

    if !from_anchors.is_empty() {
        return dedup(from_anchors);
    }

    debug!("no product anchors found, scanning raw HTML");
    let from_text = RAW_PRODUCT_PATH
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|path| normalize_product_url(path.as_str(), base))
        .collect();
    dedup(from_text)
}

/// Resolves `raw` against `base` and drops the query string and fragment.
pub fn normalize_product_url(raw: &str, base: &Url) -> Option<String> {
    let mut url = base.join(raw.trim()).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().contains(PRODUCT_PATH) {
        return None;
    }
    Some(url.to_string())
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.walmart.com").unwrap()
    }

    #[test]
    fn test_anchor_links_deduplicated_in_order() {
        let html = r#"
            <html><body>
                <a href="/ip/Laptop-A/111?athbdg=L1600">Laptop A</a>
                <a href="/ip/Laptop-B/222">Laptop B</a>
                <a href="/ip/Laptop-A/111#reviews">Laptop A reviews</a>
                <a href="https://www.walmart.com/ip/Laptop-C/333">Laptop C</a>
                <a href="/ip/Laptop-B/222">Laptop B again</a>
                <a href="/cp/electronics/3944">Electronics</a>
            </body></html>
        "#;

        let links = extract_links(html, &base());
        assert_eq!(
            links,
            vec![
                "https://www.walmart.com/ip/Laptop-A/111",
                "https://www.walmart.com/ip/Laptop-B/222",
                "https://www.walmart.com/ip/Laptop-C/333",
            ]
        );
    }

    #[test]
    fn test_browse_links_ignored() {
        let html = r#"<a href="/b/ip/whatever">Browse</a><a href="/ip/Real/1">Real</a>"#;
        assert_eq!(extract_links(html, &base()), vec!["https://www.walmart.com/ip/Real/1"]);
    }

    #[test]
    fn test_regex_fallback_matches_anchor_scan() {
        let anchors = r#"
            <a href="/ip/Laptop-A/111">A</a>
            <a href="/ip/Laptop-B/222?from=search">B</a>
            <a href="/ip/Laptop-A/111">A</a>
        "#;
        let scripted = r#"
            <html><body><div id="root"></div>
            <script>
                window.__STATE__ = {"items":[
                    {"canonicalUrl":"/ip/Laptop-A/111"},
                    {"canonicalUrl":"https://www.walmart.com/ip/Laptop-B/222?from=search"},
                    {"canonicalUrl":"/ip/Laptop-A/111"}
                ]};
            </script>
            </body></html>
        "#;

        let expected = extract_links(anchors, &base());
        let fallback = extract_links(scripted, &base());
        assert_eq!(fallback, expected);
        assert_eq!(fallback.len(), 2);
    }

    #[test]
    fn test_no_links_is_empty() {
        let html = "<html><body><p>No results for your search.</p></body></html>";
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn test_normalize_product_url() {
        assert_eq!(
            normalize_product_url("/ip/Widget/42?selected=true#top", &base()).as_deref(),
            Some("https://www.walmart.com/ip/Widget/42")
        );
        assert_eq!(normalize_product_url("/search?q=ip", &base()), None);
    }
}
