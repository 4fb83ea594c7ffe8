use std::io::Cursor;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::tree::{Element, Node};
use crate::XmlError;

/// Per-call serialization settings.
///
/// Prefix bindings registered here apply to this write only: when the root
/// element uses a bound prefix (itself or in any descendant) but does not
/// declare it, the declaration is added to the root. Declarations already
/// present are written exactly as parsed.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    namespaces: Vec<(String, String)>,
    declaration: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `uri` for this serialization.
    pub fn bind_namespace<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    /// Emit an `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    fn missing_declarations(&self, root: &Element) -> Vec<(String, String)> {
        self.namespaces
            .iter()
            .filter(|(prefix, _)| {
                root.declared_namespace(Some(prefix)).is_none() && root.uses_prefix(prefix)
            })
            .map(|(prefix, uri)| (format!("xmlns:{prefix}"), uri.clone()))
            .collect()
    }
}

/// Encode `root` as UTF-8 XML text.
pub fn write_document(root: &Element, options: &WriteOptions) -> Result<String, XmlError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    if options.declaration {
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
    }
    let extra = options.missing_declarations(root);
    write_element(&mut writer, root, &extra, "")?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|err| XmlError::Write(err.to_string()))
}

/// `default_ns` is the default namespace in scope at `element`; empty when
/// none is.
fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
    extra: &[(String, String)],
    default_ns: &str,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name());
    for attr in element.attributes() {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
    for (name, value) in extra {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    let scope = match element.declared_namespace(None) {
        Some(declared) => declared,
        // Unprefixed and in no namespace, but a default is in scope.
        None if element.prefix().is_none()
            && element.namespace().is_none()
            && !default_ns.is_empty() =>
        {
            start.push_attribute(("xmlns", ""));
            ""
        }
        None => default_ns,
    };

    if element.children().is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for node in element.children() {
        match node {
            Node::Element(child) => write_element(writer, child, &[], scope)?,
            Node::Text(text) => emit(
                writer,
                Event::Text(BytesText::from_escaped(partial_escape(text))),
            )?,
            Node::CData(text) => emit(writer, Event::CData(BytesCData::new(text.as_str())))?,
            Node::Comment(text) => emit(writer, Event::Comment(BytesText::from_escaped(text.as_str())))?,
            Node::ProcessingInstruction(text) => {
                emit(writer, Event::PI(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    emit(writer, Event::End(BytesEnd::new(element.name())))
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|err| XmlError::Write(err.to_string()))
}
