use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use xfa::{FieldUpdates, PdfFormStore};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

pub fn open_pdf(path: &Path) -> Result<PdfFormStore> {
    PdfFormStore::open(path).with_context(|| format!("open PDF {}", path.display()))
}

/// Load a JSON object of dotted field paths to values.
pub fn read_updates(path: &Path) -> Result<FieldUpdates> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse field values from {}", path.display()))
}

/// At most `limit` options joined by commas, with a count of the rest.
pub fn preview_options(options: &[String], limit: usize) -> String {
    let shown = options
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match options.len().saturating_sub(limit) {
        0 => shown,
        rest => format!("{shown}, ... (+{rest})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn preview_truncates_long_lists() {
        assert_eq!(preview_options(&options(&["A", "B"]), 5), "A, B");
        assert_eq!(
            preview_options(&options(&["1", "2", "3", "4", "5", "6", "7"]), 5),
            "1, 2, 3, 4, 5, ... (+2)"
        );
        assert_eq!(preview_options(&[], 5), "");
    }

    #[test]
    fn updates_keep_file_order() {
        let path = std::env::temp_dir().join(format!("xfactl-updates-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"form1.B": "2", "form1.A": 1, "form1.C": null}"#).expect("write");
        let updates = read_updates(&path).expect("read");
        std::fs::remove_file(&path).ok();
        let entries: Vec<_> = updates.iter().collect();
        assert_eq!(
            entries,
            vec![("form1.B", Some("2")), ("form1.A", Some("1")), ("form1.C", None)]
        );
    }

    #[test]
    fn non_object_updates_are_rejected() {
        let path = std::env::temp_dir().join(format!("xfactl-bad-{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2]").expect("write");
        let err = read_updates(&path).expect_err("array");
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().starts_with("parse field values from"));
    }
}
