//! Lenient readers for loosely typed JSON payloads.

use serde_json::Value;

use crate::models::Price;

/// Non-empty string, or a number rendered as text.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

pub fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

pub fn price(value: &Value) -> Option<Price> {
    match value {
        Value::Number(n) => n.as_f64().map(Price::Amount),
        other => text(other).map(Price::Text),
    }
}

/// `"Acme"` or `{ "@type": "Brand", "name": "Acme" }`.
pub fn brand(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("name").and_then(text),
        other => text(other),
    }
}

/// An array of strings, or a single string as a one-element list.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// First of `keys` present on `value` that `read` accepts.
pub fn first_of<T>(value: &Value, keys: &[&str], read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    keys.iter().find_map(|key| value.get(key).and_then(&read))
}

/// Humanizes stock codes: `IN_STOCK` and `https://schema.org/InStock` both
/// become `In stock`. Free text passes through untouched.
pub fn availability_label(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains(' ') {
        return Some(raw.to_string());
    }

    let code = raw.rsplit('/').next().unwrap_or(raw);
    let words: Vec<String> = if code.contains('_') || code.contains('-') {
        code.split(['_', '-'])
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    } else {
        split_camel_case(code)
    };

    let phrase = words.join(" ");
    let mut chars = phrase.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn split_camel_case(code: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in code.chars() {
        if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_accepts_strings_and_numbers() {
        assert_eq!(text(&json!("  Widget ")), Some("Widget".into()));
        assert_eq!(text(&json!(123)), Some("123".into()));
        assert_eq!(text(&json!("")), None);
        assert_eq!(text(&json!(null)), None);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(number(&json!("4.5")), Some(4.5));
        assert_eq!(count(&json!("1,204")), Some(1204));
        assert_eq!(count(&json!(37)), Some(37));
        assert_eq!(count(&json!("many")), None);
    }

    #[test]
    fn test_price_keeps_shape() {
        assert_eq!(price(&json!(9.99)), Some(Price::Amount(9.99)));
        assert_eq!(price(&json!("$9.99")), Some(Price::Text("$9.99".into())));
        assert_eq!(price(&json!({})), None);
    }

    #[test]
    fn test_brand_object_or_string() {
        assert_eq!(brand(&json!({"@type": "Brand", "name": "Acme"})), Some("Acme".into()));
        assert_eq!(brand(&json!("Acme")), Some("Acme".into()));
    }

    #[test]
    fn test_first_of_skips_unusable_values() {
        let v = json!({"brand": "", "brandName": "Acme"});
        assert_eq!(first_of(&v, &["brand", "brandName"], text), Some("Acme".into()));
    }

    #[test]
    fn test_availability_labels() {
        assert_eq!(availability_label("IN_STOCK").as_deref(), Some("In stock"));
        assert_eq!(availability_label("https://schema.org/InStock").as_deref(), Some("In stock"));
        assert_eq!(availability_label("http://schema.org/OutOfStock").as_deref(), Some("Out of stock"));
        assert_eq!(availability_label("Only 3 left").as_deref(), Some("Only 3 left"));
        assert_eq!(availability_label(" "), None);
    }
}
