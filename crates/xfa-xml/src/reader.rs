use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::tree::{Attribute, Element, Node};
use crate::{XmlError, XML_NS};

type Scope = Vec<(Option<String>, String)>;

/// Parse a UTF-8 XML document into its root element.
pub fn parse(bytes: &[u8]) -> Result<Element, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);
    reader.check_end_names(true);
    reader.expand_empty_elements(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| XmlError::parse(format!("{err} at byte {}", reader.buffer_position())))?;
        match event {
            Event::Start(e) => {
                let (element, scope) = open_element(&e, &scopes)?;
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::parse("multiple root elements"));
                }
                scopes.push(scope);
                stack.push(element);
            }
            Event::Empty(e) => {
                let (element, _) = open_element(&e, &scopes)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                scopes.pop();
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::parse("unexpected closing tag"))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| XmlError::parse(err.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::parse("text outside of the root element")),
                }
            }
            Event::CData(e) => {
                let text = utf8(e.into_inner().into_owned())?;
                match stack.last_mut() {
                    Some(parent) => parent.push(Node::CData(text)),
                    None => return Err(XmlError::parse("CDATA outside of the root element")),
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::Comment(utf8(e.into_inner().into_owned())?));
                }
            }
            Event::PI(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::ProcessingInstruction(utf8(
                        e.into_inner().into_owned(),
                    )?));
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::parse(format!("unclosed element <{}>", open.name())));
    }
    let root = root.ok_or_else(|| XmlError::parse("document has no root element"))?;
    trace!(root = root.name(), "parsed xml document");
    Ok(root)
}

/// Parse an XML document held in a string.
pub fn parse_str(xml: &str) -> Result<Element, XmlError> {
    parse(xml.as_bytes())
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::parse("multiple root elements")),
    }
}

fn open_element(event: &BytesStart<'_>, scopes: &[Scope]) -> Result<(Element, Scope), XmlError> {
    let name = utf8(event.name().as_ref().to_vec())?;
    let mut attributes = Vec::new();
    let mut scope = Scope::new();
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::parse(err.to_string()))?;
        let key = utf8(attr.key.as_ref().to_vec())?;
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::parse(err.to_string()))?
            .into_owned();
        if key == "xmlns" {
            scope.push((None, value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((Some(prefix.to_string()), value.clone()));
        }
        attributes.push(Attribute { name: key, value });
    }

    let prefix = name.split_once(':').map(|(prefix, _)| prefix);
    let namespace = resolve(prefix, &scope, scopes)?;
    Ok((Element::with_parts(name, namespace, attributes), scope))
}

fn resolve(prefix: Option<&str>, own: &Scope, outer: &[Scope]) -> Result<Option<String>, XmlError> {
    if prefix == Some("xml") {
        return Ok(Some(XML_NS.to_string()));
    }
    let found = std::iter::once(own)
        .chain(outer.iter().rev())
        .flat_map(|scope| scope.iter().rev())
        .find(|(declared, _)| declared.as_deref() == prefix)
        .map(|(_, uri)| uri.clone());
    match (prefix, found) {
        // `xmlns=""` undeclares the default namespace.
        (None, Some(uri)) if uri.is_empty() => Ok(None),
        (_, Some(uri)) => Ok(Some(uri)),
        (None, None) => Ok(None),
        (Some(prefix), None) => Err(XmlError::parse(format!(
            "unbound namespace prefix '{prefix}'"
        ))),
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String, XmlError> {
    String::from_utf8(bytes).map_err(|err| XmlError::parse(format!("invalid UTF-8: {err}")))
}
