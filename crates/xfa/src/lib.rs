#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level XFA facade that re-exports the workspace crates and provides
//! the two end-to-end form operations.
//!
//! ```
//! use xfa::{fill_form, extract_fields, FieldKind, FillOptions, MemoryFormStore};
//!
//! let mut store = MemoryFormStore::new()
//!     .with_packet(
//!         "template",
//!         r#"<template xmlns="http://www.xfa.org/schema/xfa-template/3.3/">
//!              <subform name="form1">
//!                <field name="FirstName"><ui><textEdit/></ui></field>
//!              </subform>
//!            </template>"#,
//!     )
//!     .with_packet(
//!         "datasets",
//!         r#"<xfa:datasets xmlns:xfa="http://www.xfa.org/schema/xfa-data/1.0/"><xfa:data/></xfa:datasets>"#,
//!     );
//!
//! let fields = extract_fields(&store)?;
//! assert_eq!(fields[0].kind, FieldKind::Text);
//!
//! let updates: xfa::FieldUpdates = [(fields[0].path.to_string(), "JOHN")].into_iter().collect();
//! let stats = fill_form(&mut store, &updates, &FillOptions::default())?;
//! assert_eq!(stats.filled, 1);
//! # Ok::<(), xfa::XfaError>(())
//! ```

pub use xfa_datasets as datasets;
pub use xfa_path as path;
pub use xfa_store as store;
pub use xfa_template as template;
pub use xfa_xml as xml;

pub use xfa_datasets::{DatasetError, DatasetTree, FieldUpdates, FillStats};
pub use xfa_path::{FieldPath, PathError};
pub use xfa_store::{
    DocumentMetadata, FieldRef, FormStore, MemoryFormStore, PdfFormStore, StoreError,
    DATASETS_PACKET, NEED_APPEARANCES, TEMPLATE_PACKET,
};
pub use xfa_template::{FieldDescriptor, FieldKind, FieldSummary, TemplateError};
pub use xfa_xml::XmlError;

use thiserror::Error;
use tracing::{debug, info};

/// Error type produced by the facade operations.
#[derive(Debug, Error)]
pub enum XfaError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Container access failed or a packet is missing.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl XfaError {
    /// Whether a required structure (AcroForm, XFA array, packet, data node)
    /// was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            XfaError::Dataset(DatasetError::NotFound(_)) | XfaError::Store(StoreError::NotFound(_))
        )
    }

    /// Whether a packet was not well-formed XML.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            XfaError::Template(TemplateError::Xml(XmlError::Parse(_)))
                | XfaError::Dataset(DatasetError::Xml(XmlError::Parse(_)))
        )
    }
}

/// Per-call fill behaviour.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Mark every top-level form field read-only after filling.
    pub flatten: bool,
    /// Document metadata to record; left untouched when `None`.
    pub metadata: Option<DocumentMetadata>,
}

impl FillOptions {
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// List the fields defined by the store's `template` packet.
pub fn extract_fields<S: FormStore + ?Sized>(store: &S) -> Result<Vec<FieldDescriptor>, XfaError> {
    let template = store.read_named_xml(TEMPLATE_PACKET)?;
    Ok(xfa_template::extract_fields(&template)?)
}

/// Merge `updates` into the store's `datasets` packet and write it back.
///
/// Structural problems abort before anything is written; rejected entries
/// are reported in [`FillStats::errors`].
pub fn fill_form<S: FormStore + ?Sized>(
    store: &mut S,
    updates: &FieldUpdates,
    options: &FillOptions,
) -> Result<FillStats, XfaError> {
    let datasets = store.read_named_xml(DATASETS_PACKET)?;
    let (xml, stats) = xfa_datasets::merge(&datasets, updates)?;
    store.write_named_xml(DATASETS_PACKET, xml.as_bytes())?;

    if store.set_flag_if_absent(NEED_APPEARANCES)? {
        debug!("requested appearance regeneration");
    }
    if options.flatten {
        let fields = store.field_refs()?;
        store.set_read_only(&fields)?;
        debug!(count = fields.len(), "flattened form fields");
    }
    if let Some(metadata) = &options.metadata {
        store.set_metadata(metadata)?;
    }

    info!(
        filled = stats.filled,
        total = stats.total,
        errors = stats.errors.len(),
        flatten = options.flatten,
        "filled form"
    );
    Ok(stats)
}
