use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Price, ProductRecord};

/// Writes `records` as one pretty-printed JSON array, replacing `path`.
pub fn save_to_file(records: &[ProductRecord], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// One line per record for the console.
pub fn print_summary(records: &[ProductRecord]) {
    println!("\nResults ({}):", records.len());
    for (i, record) in records.iter().enumerate() {
        let details = &record.details;
        let price = match &details.price {
            Some(Price::Amount(amount)) => format!("{amount:.2}"),
            Some(Price::Text(text)) => text.clone(),
            None => "-".to_string(),
        };
        println!(
            "{:>3}. {} | {} | {} | rating {} ({} reviews)",
            i + 1,
            details.name.as_deref().unwrap_or("(no name)"),
            price,
            details.availability.as_deref().unwrap_or("-"),
            details.rating.map_or_else(|| "-".to_string(), |r| r.to_string()),
            details.review_count.map_or_else(|| "-".to_string(), |c| c.to_string()),
        );
        println!("     {}", record.source_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductDetails;

    #[test]
    fn test_empty_results_write_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walmart_results.json");

        save_to_file(&[], &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!([]));
    }

    #[test]
    fn test_overwrites_previous_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walmart_results.json");
        std::fs::write(&path, "stale contents that are not json").unwrap();

        let record = ProductRecord::new(
            "https://www.walmart.com/ip/Widget/42",
            ProductDetails {
                name: Some("Widget".into()),
                ..Default::default()
            },
            None,
        );
        save_to_file(&[record.clone()], &path).unwrap();

        let written: Vec<ProductRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, vec![record]);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(save_to_file(&[], &path).is_err());
    }
}
