//! Form store adapters: named XFA packet read/write plus the document-level
//! flags and metadata a fill touches.
//!
//! The tree-walking crates only ever see packet bytes; everything about the
//! container lives behind [`FormStore`].

mod memory;
mod metadata;
mod pdf;

use thiserror::Error;

pub use memory::MemoryFormStore;
pub use metadata::DocumentMetadata;
pub use pdf::PdfFormStore;

/// Packet holding the form's field definitions.
pub const TEMPLATE_PACKET: &str = "template";
/// Packet holding the current field values.
pub const DATASETS_PACKET: &str = "datasets";
/// AcroForm flag asking viewers to regenerate field appearances.
pub const NEED_APPEARANCES: &str = "NeedAppearances";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required container structure or packet is missing.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("pdf: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata: {0}")]
    Metadata(String),
}

impl StoreError {
    fn not_found<S: Into<String>>(msg: S) -> Self {
        StoreError::NotFound(msg.into())
    }
}

/// Reference to a top-level form field of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// Field stored as its own indirect object (number, generation).
    Object(u32, u16),
    /// Field at this position of the top-level field list.
    Index(usize),
}

/// Container access used by extraction and fill operations.
///
/// Implementations own their container; callers open one store per
/// operation and never share it.
pub trait FormStore {
    /// Raw (decoded) bytes of the named XFA packet.
    fn read_named_xml(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Replace the content of the named XFA packet.
    fn write_named_xml(&mut self, name: &str, xml: &[u8]) -> Result<(), StoreError>;

    /// Set a boolean form-level flag to `true` unless it is already present.
    /// Returns whether the flag was added.
    fn set_flag_if_absent(&mut self, flag: &str) -> Result<bool, StoreError>;

    /// Top-level form fields known to the container.
    fn field_refs(&self) -> Result<Vec<FieldRef>, StoreError>;

    /// Mark the given fields read-only.
    fn set_read_only(&mut self, fields: &[FieldRef]) -> Result<(), StoreError>;

    /// Record title, description, creator and creation date.
    fn set_metadata(&mut self, metadata: &DocumentMetadata) -> Result<(), StoreError>;
}
