use std::sync::LazyLock;

use scraper::Selector;
use serde_json::Value;
use tracing::debug;

use super::values::{self, first_of};
use super::{Extractor, ProductPage};
use crate::models::{ExtractionSource, ProductDetails};

static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

/// Reads the server-rendered page state. The path into it follows the
/// current storefront build and stops matching whenever that build changes.
pub struct NextDataExtractor;

impl Extractor for NextDataExtractor {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::NextData
    }

    fn extract(&self, page: &ProductPage) -> Option<ProductDetails> {
        let script = page.document().select(&NEXT_DATA).next()?;
        let text: String = script.text().collect();
        match serde_json::from_str::<Value>(&text) {
            Ok(state) => details_from_page_state(&state),
            Err(e) => {
                debug!("failed to parse __NEXT_DATA__: {}", e);
                None
            }
        }
    }
}

/// Maps `props.pageProps.initialData.data.{product|products[0], reviews}`.
pub(super) fn details_from_page_state(state: &Value) -> Option<ProductDetails> {
    let data = state.pointer("/props/pageProps/initialData/data")?;
    let product = data
        .get("product")
        .filter(|p| p.is_object())
        .or_else(|| data.get("products").and_then(|p| p.get(0)))?;
    let reviews = data.get("reviews").unwrap_or(&Value::Null);

    let price = product
        .pointer("/priceInfo/currentPrice/price")
        .and_then(values::price)
        .or_else(|| {
            product
                .pointer("/priceInfo/currentPrice/priceString")
                .and_then(values::price)
        });

    let features = ["keyProductFeatures", "bulletDescriptions"]
        .iter()
        .filter_map(|key| product.get(key))
        .map(values::string_list)
        .find(|list| !list.is_empty())
        .unwrap_or_default();

    let rating = reviews
        .get("customerRating")
        .and_then(values::number)
        .filter(|r| *r > 0.0)
        .or_else(|| first_of(product, &["averageRating", "rating"], values::number));

    let review_count = first_of(product, &["numReviews", "reviewCount"], values::count)
        .or_else(|| reviews.get("totalReviewCount").and_then(values::count));

    Some(ProductDetails {
        name: product.get("name").and_then(values::text),
        price,
        availability: product
            .get("availabilityStatus")
            .and_then(values::text)
            .and_then(|s| values::availability_label(&s)),
        brand: first_of(product, &["brand", "brandName"], values::brand),
        model: first_of(product, &["modelNumber", "model"], values::text),
        features,
        rating,
        review_count,
    })
}
