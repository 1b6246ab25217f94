use std::sync::LazyLock;

use scraper::Selector;
use serde_json::Value;
use tracing::debug;

use super::values::{self, first_of};
use super::{Extractor, ProductPage};
use crate::models::{ExtractionSource, ProductDetails};

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Reads the first schema.org `Product` among the page's JSON-LD blocks.
pub struct JsonLdExtractor;

impl Extractor for JsonLdExtractor {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::JsonLd
    }

    fn extract(&self, page: &ProductPage) -> Option<ProductDetails> {
        for script in page.document().select(&LD_JSON) {
            let text: String = script.text().collect();
            if text.trim().is_empty() {
                continue;
            }
            let block: Value = match serde_json::from_str(&text) {
                Ok(block) => block,
                Err(e) => {
                    debug!("skipping malformed JSON-LD block: {}", e);
                    continue;
                }
            };
            if let Some(product) = candidates(&block).into_iter().find(|item| is_product(item)) {
                return Some(details_from_product(product));
            }
        }
        None
    }
}

/// A block may hold one entity, an array of them, or an `@graph`.
fn candidates(block: &Value) -> Vec<&Value> {
    match block {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            let mut items = vec![block];
            if let Some(Value::Array(graph)) = map.get("@graph") {
                items.extend(graph.iter());
            }
            items
        }
        _ => Vec::new(),
    }
}

fn is_product(item: &Value) -> bool {
    if !item.is_object() {
        return false;
    }
    let typed_product = match item.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("product"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("product")),
        _ => false,
    };
    typed_product || item.get("offers").is_some()
}

fn details_from_product(item: &Value) -> ProductDetails {
    let offer = match item.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    }
    .unwrap_or(&Value::Null);
    let rating = item.get("aggregateRating").unwrap_or(&Value::Null);

    ProductDetails {
        name: item.get("name").and_then(values::text),
        price: first_of(offer, &["price", "lowPrice"], values::price),
        availability: offer
            .get("availability")
            .and_then(values::text)
            .and_then(|s| values::availability_label(&s)),
        brand: item.get("brand").and_then(values::brand),
        model: first_of(item, &["model", "mpn", "sku"], values::text),
        features: item.get("description").map(values::string_list).unwrap_or_default(),
        rating: rating.get("ratingValue").and_then(values::number),
        review_count: first_of(rating, &["reviewCount", "ratingCount"], values::count),
    }
}
