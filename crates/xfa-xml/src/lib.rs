//! Owned XML element tree used for XFA `template` and `datasets` packets.
//!
//! Documents are parsed with quick-xml into [`Element`] values that keep raw
//! qualified names, attributes (namespace declarations included), text,
//! CDATA, comments and processing instructions, so a parse/write cycle
//! reproduces the original markup. Prefix bindings needed on output are
//! passed per call through [`WriteOptions`].

mod reader;
mod tree;
mod writer;

use thiserror::Error;

pub use reader::{parse, parse_str};
pub use tree::{local_name, Attribute, Element, Node};
pub use writer::{write_document, WriteOptions};

/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Error)]
pub enum XmlError {
    /// The input is not a well-formed document.
    #[error("xml: {0}")]
    Parse(String),
    /// Encoding the tree back to text failed.
    #[error("xml write: {0}")]
    Write(String),
}

impl XmlError {
    fn parse<S: Into<String>>(msg: S) -> Self {
        XmlError::Parse(msg.into())
    }
}
