//! Product page parsing as an ordered list of extraction strategies. The
//! first strategy that recovers any field wins; a page nothing matches still
//! yields a record carrying only its URL.

mod heuristic;
mod json_ld;
mod next_data;
mod values;

use scraper::Html;
use tracing::debug;

use crate::models::{ExtractionSource, ProductDetails, ProductRecord};

pub use heuristic::HeuristicExtractor;
pub use json_ld::JsonLdExtractor;
pub use next_data::NextDataExtractor;

/// A fetched product page, parsed once and shared by every strategy.
pub struct ProductPage<'a> {
    html: &'a str,
    document: Html,
}

impl<'a> ProductPage<'a> {
    pub fn new(html: &'a str) -> Self {
        ProductPage {
            html,
            document: Html::parse_document(html),
        }
    }

    pub fn html(&self) -> &str {
        self.html
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// One way of pulling product attributes out of a page. Returning `None` (or
/// empty details) means "this source is unavailable here".
pub trait Extractor {
    fn source(&self) -> ExtractionSource;
    fn extract(&self, page: &ProductPage) -> Option<ProductDetails>;
}

pub struct ProductParser {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for ProductParser {
    fn default() -> Self {
        ProductParser::new(vec![
            Box::new(NextDataExtractor),
            Box::new(JsonLdExtractor),
            Box::new(HeuristicExtractor),
        ])
    }
}

impl ProductParser {
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        ProductParser { extractors }
    }

    pub fn parse(&self, html: &str, url: &str) -> ProductRecord {
        let page = ProductPage::new(html);
        for extractor in &self.extractors {
            match extractor.extract(&page) {
                Some(details) if !details.is_empty() => {
                    debug!(url, source = ?extractor.source(), "extracted product details");
                    return ProductRecord::new(url, details, Some(extractor.source()));
                }
                _ => debug!(url, source = ?extractor.source(), "strategy found nothing"),
            }
        }
        ProductRecord::empty(url)
    }
}

/// Parses with the default strategy order: page state, JSON-LD, heuristics.
pub fn parse_product(html: &str, url: &str) -> ProductRecord {
    ProductParser::default().parse(html, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;

    const URL: &str = "https://www.walmart.com/ip/Widget/42";

    #[test]
    fn test_next_data_preferred() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
                {"@type": "Product", "name": "Other name", "brand": "Other"}
            </script>
            <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {"initialData": {"data": {
                    "product": {"name": "Widget", "priceInfo": {"currentPrice": {"price": "$9.99"}}}
                }}}}}
            </script>
            </head><body><h1>Widget</h1></body></html>
        "#;

        let record = parse_product(html, URL);
        assert_eq!(record.source_url, URL);
        assert_eq!(record.details.name.as_deref(), Some("Widget"));
        assert_eq!(record.details.price, Some(Price::Text("$9.99".into())));
        assert_eq!(record.details.brand, None);
        assert_eq!(record.extracted_by, Some(ExtractionSource::NextData));
    }

    #[test]
    fn test_structured_data_brand_only() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "Product", "brand": {"@type": "Brand", "name": "Acme"}}
            </script>
            </head><body></body></html>
        "#;

        let record = parse_product(html, URL);
        assert_eq!(record.details.brand.as_deref(), Some("Acme"));
        assert_eq!(
            record.details,
            ProductDetails {
                brand: Some("Acme".into()),
                ..Default::default()
            }
        );
        assert_eq!(record.extracted_by, Some(ExtractionSource::JsonLd));
    }

    #[test]
    fn test_broken_page_state_falls_through() {
        let html = r#"
            <html><head>
            <script id="__NEXT_DATA__" type="application/json">{"props": {"pageProps": </script>
            <script type="application/ld+json">{"@type": "Product", "name": "Widget"}</script>
            </head></html>
        "#;

        let record = parse_product(html, URL);
        assert_eq!(record.details.name.as_deref(), Some("Widget"));
        assert_eq!(record.extracted_by, Some(ExtractionSource::JsonLd));
    }

    #[test]
    fn test_unparseable_page_yields_empty_record() {
        let html = "<html><head><title>Oops</title></head><body><p>Nothing to see here.</p></body></html>";

        let record = parse_product(html, URL);
        assert_eq!(record.source_url, URL);
        assert!(record.details.is_empty());
        assert_eq!(record.extracted_by, None);
    }

    #[test]
    fn test_not_even_html() {
        let record = parse_product("\u{0}\u{1}{{{{", URL);
        assert!(record.details.is_empty());
    }

    struct Fixed(ExtractionSource, Option<ProductDetails>);

    impl Extractor for Fixed {
        fn source(&self) -> ExtractionSource {
            self.0
        }

        fn extract(&self, _page: &ProductPage) -> Option<ProductDetails> {
            self.1.clone()
        }
    }

    #[test]
    fn test_empty_details_do_not_stop_the_chain() {
        let parser = ProductParser::new(vec![
            Box::new(Fixed(ExtractionSource::NextData, Some(ProductDetails::default()))),
            Box::new(Fixed(ExtractionSource::JsonLd, None)),
            Box::new(Fixed(
                ExtractionSource::Heuristic,
                Some(ProductDetails {
                    model: Some("X-100".into()),
                    ..Default::default()
                }),
            )),
        ]);

        let record = parser.parse("<html></html>", URL);
        assert_eq!(record.details.model.as_deref(), Some("X-100"));
        assert_eq!(record.extracted_by, Some(ExtractionSource::Heuristic));
    }
}
