use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::next_data::details_from_page_state;
use super::values;
use super::{Extractor, ProductPage};
use crate::models::{ExtractionSource, Price, ProductDetails};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static ITEMPROP_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="name"]"#).unwrap());
static ITEMPROP_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="price"]"#).unwrap());
static ITEMPROP_BRAND: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="brand"]"#).unwrap());
static ITEMPROP_AVAILABILITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="availability"]"#).unwrap());
static ITEMPROP_RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="ratingValue"]"#).unwrap());
static ITEMPROP_REVIEWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="reviewCount"]"#).unwrap());
static DESCRIPTION_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="description"] li"#).unwrap());

static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d{2})?").unwrap());
static STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d(?:\.\d+)?)\s+out of 5 stars").unwrap());
static REVIEWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*)\s+(?:reviews?|ratings?)\b").unwrap());
static BRAND_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^brand\s*(?::\s*(.*))?$").unwrap());
static MODEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^model(?:\s+(?:number|no\.?))?\s*(?::\s*(.*))?$").unwrap()
});

const MAX_LABEL_VALUE_LEN: usize = 80;

/// Last resort for pages without structured data: page state inlined
/// without its script id, then itemprop attributes and label/value text.
/// Expect noise.
pub struct HeuristicExtractor;

impl Extractor for HeuristicExtractor {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Heuristic
    }

    fn extract(&self, page: &ProductPage) -> Option<ProductDetails> {
        if let Some(details) = inline_page_state(page.html()).filter(|d| !d.is_empty()) {
            return Some(details);
        }
        Some(from_markup(page.document()))
    }
}

fn inline_page_state(html: &str) -> Option<ProductDetails> {
    if !html.contains(r#""product":"#) {
        return None;
    }
    let start = html.find(r#"{"props""#)?;
    let snippet = &html[start..];
    let snippet = match snippet.find("</script>") {
        Some(end) => &snippet[..end],
        None => snippet,
    };
    match serde_json::from_str::<Value>(snippet.trim_end()) {
        Ok(state) => details_from_page_state(&state),
        Err(e) => {
            debug!("inline page state is not valid JSON: {}", e);
            None
        }
    }
}

fn from_markup(doc: &Html) -> ProductDetails {
    let lines = visible_lines(doc);
    let text = lines.join("\n");

    let name = first_text(doc, &ITEMPROP_NAME).or_else(|| first_text(doc, &H1));

    let price = first_attr_or_text(doc, &ITEMPROP_PRICE)
        .or_else(|| {
            PRICE
                .find(&text)
                .map(|m| m.as_str().trim_end_matches(',').replace(' ', ""))
        })
        .map(Price::Text);

    let brand = first_attr_or_text(doc, &ITEMPROP_BRAND).or_else(|| labeled_value(&lines, &BRAND_LABEL));
    let model = labeled_value(&lines, &MODEL_LABEL);

    let availability = first_attr_or_text(doc, &ITEMPROP_AVAILABILITY)
        .and_then(|s| values::availability_label(&s))
        .or_else(|| stock_phrase(&text));

    let rating = first_attr_or_text(doc, &ITEMPROP_RATING)
        .and_then(|s| s.parse().ok())
        .or_else(|| capture(&STARS, &text).and_then(|s| s.parse().ok()));

    let review_count = first_attr_or_text(doc, &ITEMPROP_REVIEWS)
        .or_else(|| capture(&REVIEWS, &text))
        .and_then(|s| s.replace(',', "").parse().ok());

    let features = doc
        .select(&DESCRIPTION_ITEMS)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    ProductDetails {
        name,
        price,
        availability,
        brand,
        model,
        features,
        rating,
        review_count,
    }
}

/// Trimmed text nodes outside of scripts, styles and the document title.
fn visible_lines(doc: &Html) -> Vec<String> {
    doc.root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent()?;
            let parent = parent.value().as_element()?;
            if matches!(parent.name(), "script" | "style" | "noscript" | "title") {
                return None;
            }
            let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!line.is_empty()).then_some(line)
        })
        .collect()
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).map(element_text).find(|t| !t.is_empty())
}

/// `content`/`href` attribute first (microdata on `<meta>`/`<link>`), else text.
fn first_attr_or_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).find_map(|el| {
        let value = el
            .value()
            .attr("content")
            .or_else(|| el.value().attr("href"))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| element_text(el));
        (!value.is_empty()).then_some(value)
    })
}

/// `Brand: Acme` on one line, or `Brand` followed by the value on the next
/// (as in `<dt>`/`<dd>` detail tables).
fn labeled_value(lines: &[String], label: &Regex) -> Option<String> {
    lines.iter().enumerate().find_map(|(i, line)| {
        let caps = label.captures(line)?;
        let value = match caps.get(1).map(|m| m.as_str().trim()) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => lines.get(i + 1)?.clone(),
        };
        (value.len() <= MAX_LABEL_VALUE_LEN).then_some(value)
    })
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn stock_phrase(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if lower.contains("out of stock") {
        Some("Out of stock".to_string())
    } else if lower.contains("in stock") {
        Some("In stock".to_string())
    } else {
        None
    }
}
