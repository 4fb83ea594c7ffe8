#![cfg_attr(docsrs, feature(doc_cfg))]
//! Dotted XFA field paths (`form1.Pt1Line1a_FamilyName`).
//!
//! Template walks build paths from arbitrary `name` attributes, so
//! [`FieldPath`] itself accepts any non-empty segment. Paths that are used to
//! create elements in a datasets tree must go through [`split_safe`], which
//! enforces the safe element-name grammar `^[A-Za-z][A-Za-z0-9_]*$` on every
//! segment.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Errors produced while validating a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A segment does not match the safe element-name grammar.
    #[error("invalid field path characters")]
    InvalidCharacters {
        /// The first offending segment.
        segment: String,
    },
}

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("segment pattern is a valid regex")
    })
}

/// Whether `segment` may be used as an element name in a datasets tree.
pub fn is_safe_segment(segment: &str) -> bool {
    segment_pattern().is_match(segment)
}

/// Split `path` on `.` and validate every segment.
///
/// The whole path is rejected if any segment fails; callers get either all
/// segments or none.
pub fn split_safe(path: &str) -> Result<Vec<&str>, PathError> {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    if let Some(bad) = segments.iter().find(|segment| !is_safe_segment(segment)) {
        return Err(PathError::InvalidCharacters {
            segment: (*bad).to_string(),
        });
    }
    Ok(segments)
}

/// Qualified field path as an ordered list of non-empty segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// The empty path (template root, or any chain of anonymous containers).
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a child node named `name`.
    ///
    /// Anonymous nodes (empty name) do not add a segment and resolve to a
    /// copy of `self`.
    pub fn child(&self, name: &str) -> Self {
        let mut next = self.clone();
        if !name.is_empty() {
            next.segments.push(name.to_string());
        }
        next
    }

    /// Segments in order from the outermost container.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether every segment satisfies the safe element-name grammar.
    pub fn is_safe(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| is_safe_segment(s))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = split_safe(s)?;
        Ok(Self {
            segments: segments.into_iter().map(str::to_string).collect(),
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
