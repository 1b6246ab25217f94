use serde::{Deserialize, Serialize};

/// A price exactly as the page reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

/// Which extraction strategy produced a record's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    NextData,
    JsonLd,
    Heuristic,
}

/// The attributes a strategy can recover from a product page. Every field is
/// optional; an all-empty value means the strategy found nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub availability: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
}

impl ProductDetails {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.availability.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.features.is_empty()
            && self.rating.is_none()
            && self.review_count.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub source_url: String,
    #[serde(flatten)]
    pub details: ProductDetails,
    pub extracted_by: Option<ExtractionSource>,
    pub scraped_at: String,
}

impl ProductRecord {
    pub fn new(source_url: &str, details: ProductDetails, extracted_by: Option<ExtractionSource>) -> Self {
        ProductRecord {
            source_url: source_url.to_string(),
            details,
            extracted_by,
            scraped_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// A record for a page nothing could be extracted from.
    pub fn empty(source_url: &str) -> Self {
        Self::new(source_url, ProductDetails::default(), None)
    }
}
