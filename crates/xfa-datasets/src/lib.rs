#![cfg_attr(docsrs, feature(doc_cfg))]
//! XFA datasets packets: parse, fill from a flat path map, write back.
//!
//! ```
//! use xfa_datasets::{DatasetTree, FieldUpdates};
//!
//! let mut tree = DatasetTree::empty();
//! let updates: FieldUpdates = [("form1.FirstName", "JOHN"), ("form1.Bad Name", "X")]
//!     .into_iter()
//!     .collect();
//! let stats = tree.merge(&updates).expect("data node present");
//! assert_eq!((stats.filled, stats.total), (1, 2));
//! assert_eq!(stats.errors, ["form1.Bad Name: invalid field path characters"]);
//! assert_eq!(tree.value("form1.FirstName").as_deref(), Some("JOHN"));
//! ```

mod merge;
mod updates;

use thiserror::Error;
use tracing::{debug, info};
use xfa_xml::{Element, WriteOptions, XmlError};

pub use merge::{merge_into, EntryError, FillStats};
pub use updates::FieldUpdates;

/// Namespace of the `datasets` packet and its `data` node.
pub const XFA_DATA_NS: &str = "http://www.xfa.org/schema/xfa-data/1.0/";
/// Prefix conventionally bound to [`XFA_DATA_NS`].
pub const XFA_DATA_PREFIX: &str = "xfa";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// A required structural element is missing.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Parsed `datasets` packet owned by a single fill operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTree {
    root: Element,
}

impl DatasetTree {
    /// Parse a datasets packet; it must contain an `xfa:data` node.
    pub fn parse(xml: &[u8]) -> Result<Self, DatasetError> {
        let root = xfa_xml::parse(xml)?;
        if root.local_name() != "datasets" {
            debug!(root = root.name(), "datasets packet has an unexpected root element");
        }
        let tree = Self { root };
        tree.data()?;
        Ok(tree)
    }

    /// `<xfa:datasets xmlns:xfa="..."><xfa:data/></xfa:datasets>`
    pub fn empty() -> Self {
        let prefixed = |local: &str| format!("{XFA_DATA_PREFIX}:{local}");
        let mut root = Element::in_namespace(prefixed("datasets"), XFA_DATA_NS);
        root.set_attribute(format!("xmlns:{XFA_DATA_PREFIX}"), XFA_DATA_NS);
        root.push_element(Element::in_namespace(prefixed("data"), XFA_DATA_NS));
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `data` node that field paths are resolved against.
    pub fn data(&self) -> Result<&Element, DatasetError> {
        self.root
            .find_child_ns("data", XFA_DATA_NS)
            .ok_or_else(missing_data_node)
    }

    pub fn data_mut(&mut self) -> Result<&mut Element, DatasetError> {
        self.root
            .find_child_ns_mut("data", XFA_DATA_NS)
            .ok_or_else(missing_data_node)
    }

    /// Text of the first node at the dotted `path`, if present.
    pub fn value(&self, path: &str) -> Option<String> {
        let mut node = self.data().ok()?;
        for segment in path.split(xfa_path::SEPARATOR) {
            node = node.child(segment)?;
        }
        Some(node.text())
    }

    /// Apply `updates` below the `data` node.
    pub fn merge(&mut self, updates: &FieldUpdates) -> Result<FillStats, DatasetError> {
        let stats = merge_into(self.data_mut()?, updates);
        info!(
            filled = stats.filled,
            total = stats.total,
            errors = stats.errors.len(),
            "merged field updates"
        );
        Ok(stats)
    }

    /// Serialize without an XML declaration, keeping the `xfa` binding.
    pub fn to_xml(&self) -> Result<String, DatasetError> {
        let options = WriteOptions::new().bind_namespace(XFA_DATA_PREFIX, XFA_DATA_NS);
        Ok(xfa_xml::write_document(&self.root, &options)?)
    }
}

fn missing_data_node() -> DatasetError {
    DatasetError::NotFound("no data node in datasets".into())
}

/// Parse `datasets_xml`, apply `updates` and return the new packet text.
pub fn merge(
    datasets_xml: &[u8],
    updates: &FieldUpdates,
) -> Result<(String, FillStats), DatasetError> {
    let mut tree = DatasetTree::parse(datasets_xml)?;
    let stats = tree.merge(updates)?;
    Ok((tree.to_xml()?, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING: &str = "<xfa:datasets xmlns:xfa=\"http://www.xfa.org/schema/xfa-data/1.0/\">\n\
        <xfa:data>\n<form1><LastName>DOE</LastName><Page2/></form1>\n</xfa:data>\n\
        <dd:dataDescription xmlns:dd=\"http://ns.adobe.com/data-description/\" dd:name=\"form1\"/>\n\
        </xfa:datasets>";

    fn batch(pairs: &[(&str, &str)]) -> FieldUpdates {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_skeleton_serializes_with_binding() {
        let xml = DatasetTree::empty().to_xml().expect("write");
        assert_eq!(
            xml,
            "<xfa:datasets xmlns:xfa=\"http://www.xfa.org/schema/xfa-data/1.0/\"><xfa:data/></xfa:datasets>"
        );
    }

    #[test]
    fn fills_valid_entry_and_rejects_bad_path() {
        let mut tree = DatasetTree::empty();
        let stats = tree
            .merge(&batch(&[("form1.FirstName", "JOHN"), ("form1.Bad Name", "X")]))
            .expect("merge");
        assert_eq!(stats.filled, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.errors, vec!["form1.Bad Name: invalid field path characters"]);
        let data = tree.data().expect("data");
        assert_eq!(data.child_elements().count(), 1);
        let form = data.child("form1").expect("form1");
        assert_eq!(form.child_elements().count(), 1);
        assert_eq!(form.child("FirstName").expect("FirstName").text(), "JOHN");
    }

    #[test]
    fn existing_nodes_and_siblings_are_preserved() {
        let (xml, stats) = merge(
            EXISTING.as_bytes(),
            &batch(&[("form1.LastName", "SMITH"), ("form1.Page2.City", "Austin")]),
        )
        .expect("merge");
        assert_eq!(stats.filled, 2);
        assert_eq!(
            xml,
            "<xfa:datasets xmlns:xfa=\"http://www.xfa.org/schema/xfa-data/1.0/\">\n\
             <xfa:data>\n<form1><LastName>SMITH</LastName><Page2><City>Austin</City></Page2></form1>\n</xfa:data>\n\
             <dd:dataDescription xmlns:dd=\"http://ns.adobe.com/data-description/\" dd:name=\"form1\"/>\n\
             </xfa:datasets>"
        );
    }

    #[test]
    fn merge_is_idempotent_on_fresh_copies() {
        let updates = batch(&[("form1.A", "1"), ("form2.B.C", "2"), ("bad path", "3")]);
        let (first, _) = merge(EXISTING.as_bytes(), &updates).expect("first");
        let (second, _) = merge(EXISTING.as_bytes(), &updates).expect("second");
        assert_eq!(first, second);
        // Re-applying to the output changes nothing further.
        let (third, _) = merge(first.as_bytes(), &updates).expect("third");
        assert_eq!(first, third);
    }

    #[test]
    fn missing_data_node_is_fatal() {
        let err = DatasetTree::parse(
            b"<xfa:datasets xmlns:xfa=\"http://www.xfa.org/schema/xfa-data/1.0/\"><data/></xfa:datasets>",
        )
        .expect_err("unprefixed data is in no namespace");
        assert!(matches!(err, DatasetError::NotFound(ref msg) if msg == "no data node in datasets"));
    }

    #[test]
    fn malformed_datasets_is_a_parse_error() {
        let err = DatasetTree::parse(b"<xfa:datasets").expect_err("truncated");
        assert!(matches!(err, DatasetError::Xml(XmlError::Parse(_))));
    }

    #[test]
    fn value_lookup_uses_first_match() {
        let tree = DatasetTree::parse(
            b"<xfa:datasets xmlns:xfa=\"http://www.xfa.org/schema/xfa-data/1.0/\"><xfa:data>\
              <f><n>one</n><n>two</n></f></xfa:data></xfa:datasets>",
        )
        .expect("parse");
        assert_eq!(tree.value("f.n").as_deref(), Some("one"));
        assert_eq!(tree.value("f.missing"), None);
    }
}
