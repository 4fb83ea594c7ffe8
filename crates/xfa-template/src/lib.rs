#![cfg_attr(docsrs, feature(doc_cfg))]
//! XFA template walker: enumerate the interactive fields a form defines.
//!
//! ```
//! let xml = br#"<template xmlns="http://www.xfa.org/schema/xfa-template/3.3/">
//!   <subform name="form1">
//!     <field name="FirstName"><ui><textEdit/></ui></field>
//!   </subform>
//! </template>"#;
//! let fields = xfa_template::extract_fields(xml).expect("template");
//! assert_eq!(fields[0].path.to_string(), "form1.FirstName");
//! assert_eq!(fields[0].kind, xfa_template::FieldKind::Text);
//! ```

mod kind;
mod summary;
mod walker;

use thiserror::Error;
use tracing::{info, warn};
use xfa_path::FieldPath;
use xfa_xml::XmlError;

pub use kind::{FieldKind, TemplateTag};
pub use summary::FieldSummary;
pub use walker::walk;

/// Namespace URIs of XFA template packets start with this prefix; the
/// schema version follows (`.../xfa-template/3.3/`).
pub const TEMPLATE_NS_PREFIX: &str = "http://www.xfa.org/schema/xfa-template/";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// One field or radio group discovered in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FieldDescriptor {
    /// Qualified path built from the named ancestors.
    pub path: FieldPath,
    /// The node's own `name` attribute; empty for anonymous nodes.
    pub local_name: String,
    pub kind: FieldKind,
    /// First non-empty `caption/value/text`, trimmed.
    pub caption: String,
    /// First non-empty `assist/toolTip`, trimmed.
    pub tooltip: String,
    /// Choice values; `None` when the field lists none.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub options: Option<Vec<String>>,
}

/// Parse a template packet and walk it.
pub fn extract_fields(template_xml: &[u8]) -> Result<Vec<FieldDescriptor>, TemplateError> {
    let root = xfa_xml::parse(template_xml)?;
    match root.namespace() {
        Some(ns) if ns.starts_with(TEMPLATE_NS_PREFIX) => {}
        other => warn!(
            namespace = other.unwrap_or(""),
            "template root is not in the XFA template namespace"
        ),
    }
    let fields = walk(&root);
    info!(count = fields.len(), "extracted template fields");
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_template_is_a_parse_error() {
        let err = extract_fields(b"<template><field name=\"x\"></template>")
            .expect_err("mismatched tags");
        assert!(matches!(err, TemplateError::Xml(XmlError::Parse(_))));
    }

    #[test]
    fn foreign_namespace_still_walks() {
        let fields = extract_fields(b"<form><field name=\"x\"/></form>").expect("walk");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path.to_string(), "x");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_external_field_format() {
        let fields = extract_fields(
            br#"<template xmlns="http://www.xfa.org/schema/xfa-template/3.3/">
                 <subform name="form1">
                   <field name="State"><ui><choiceList/></ui><items><text>VA</text></items></field>
                   <field name="City"/>
                 </subform>
               </template>"#,
        )
        .expect("walk");
        let json = serde_json::to_value(&fields).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([
                {
                    "path": "form1.State",
                    "localName": "State",
                    "kind": "dropdown",
                    "caption": "",
                    "tooltip": "",
                    "options": ["VA"]
                },
                {
                    "path": "form1.City",
                    "localName": "City",
                    "kind": "text",
                    "caption": "",
                    "tooltip": ""
                }
            ])
        );
    }
}
