use thiserror::Error;
use tracing::{debug, warn};
use xfa_path::{split_safe, PathError};
use xfa_xml::Element;

use crate::FieldUpdates;

/// Outcome of one fill operation.
///
/// A non-empty `errors` list together with `filled < total` is a valid
/// partial result, not a failure of the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillStats {
    /// Entries whose leaf value was written.
    pub filled: usize,
    /// Number of entries supplied, whatever their outcome.
    pub total: usize,
    /// One `"<path>: <message>"` line per rejected entry.
    pub errors: Vec<String>,
}

/// Why a single update entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error(transparent)]
    Path(#[from] PathError),
    /// The value holds a character XML 1.0 cannot carry.
    #[error("value contains character U+{0:04X} which is not allowed in XML")]
    InvalidCharacter(u32),
}

/// Write every non-empty update below `data`, creating missing elements.
///
/// Entries are processed in order and independently: a rejected entry
/// leaves the tree untouched and does not stop the batch.
pub fn merge_into(data: &mut Element, updates: &FieldUpdates) -> FillStats {
    let mut stats = FillStats {
        total: updates.len(),
        ..FillStats::default()
    };

    for (path, value) in updates.iter() {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        match fill_entry(data, path, value) {
            Ok(()) => {
                stats.filled += 1;
                debug!(path, "filled field");
            }
            Err(err) => {
                warn!(path, error = %err, "rejected field update");
                stats.errors.push(format!("{path}: {err}"));
            }
        }
    }

    stats
}

fn fill_entry(data: &mut Element, path: &str, value: &str) -> Result<(), EntryError> {
    let segments = split_safe(path)?;
    if let Some(bad) = value.chars().find(|c| !is_xml_char(*c)) {
        return Err(EntryError::InvalidCharacter(bad as u32));
    }

    let mut node = data;
    for segment in segments {
        node = node.find_or_insert_child(segment);
    }
    node.set_text(value);
    Ok(())
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
