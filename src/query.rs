use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, url::ParseError),
}

/// Trims the user's search term and rejects one that would search for nothing.
pub fn normalize_query(raw: &str) -> Result<String, QueryError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    Ok(query.to_string())
}

pub fn parse_base_url(base_url: &str) -> Result<Url, QueryError> {
    Url::parse(base_url).map_err(|e| QueryError::InvalidBaseUrl(base_url.to_string(), e))
}

/// `<base>/search?query=<term>&page=<n>`, form-encoded.
pub fn search_url(base: &Url, query: &str, page: u32) -> Url {
    let mut url = base.clone();
    url.set_path("/search");
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("query", query)
        .append_pair("page", &page.to_string());
    url
}
