use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::StoreError;

/// Tool name recorded when the caller does not supply one.
pub const DEFAULT_CREATOR_TOOL: &str = concat!("xfa-forms ", env!("CARGO_PKG_VERSION"));

/// Document information written after a fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
    /// Person or organisation the document was produced for.
    pub creator: String,
    /// Application that produced the document.
    pub creator_tool: String,
    pub created: OffsetDateTime,
}

impl DocumentMetadata {
    /// Metadata for a freshly filled form: `"Form <type>"` as title and
    /// `"Form <type> - Filled"` as description.
    pub fn filled_form(form_type: Option<&str>, creator: &str, created: OffsetDateTime) -> Self {
        let title = match form_type.map(str::trim).filter(|t| !t.is_empty()) {
            Some(form_type) => format!("Form {form_type}"),
            None => "Form".to_string(),
        };
        Self {
            description: format!("{title} - Filled"),
            title,
            creator: creator.to_string(),
            creator_tool: DEFAULT_CREATOR_TOOL.to_string(),
            created,
        }
    }

    pub fn with_creator_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.creator_tool = tool.into();
        self
    }

    /// `created` as RFC 3339 text.
    pub fn created_rfc3339(&self) -> Result<String, StoreError> {
        self.created
            .format(&Rfc3339)
            .map_err(|e| StoreError::Metadata(e.to_string()))
    }

    /// `created` in PDF date syntax, `D:YYYYMMDDHHmmSS` plus offset.
    pub fn created_pdf_date(&self) -> String {
        let at = self.created;
        let offset = at.offset();
        let zone = if offset.is_utc() {
            "Z".to_string()
        } else {
            let sign = if offset.is_negative() { '-' } else { '+' };
            format!(
                "{sign}{:02}'{:02}'",
                offset.whole_hours().unsigned_abs(),
                offset.minutes_past_hour().unsigned_abs()
            )
        };
        format!(
            "D:{:04}{:02}{:02}{:02}{:02}{:02}{zone}",
            at.year(),
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        )
    }
}

const XMP_PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";
const NS_X: &str = "adobe:ns:meta/";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_XMP: &str = "http://ns.adobe.com/xap/1.0/";
const NS_PDF: &str = "http://ns.adobe.com/pdf/1.3/";

/// Serialize `meta` as a standalone XMP packet.
pub(crate) fn xmp_packet(meta: &DocumentMetadata) -> Result<Vec<u8>, StoreError> {
    let created = meta.created_rfc3339()?;
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);

    let begin = format!("xpacket begin=\"\u{FEFF}\" id=\"{XMP_PACKET_ID}\"");
    emit(&mut w, Event::PI(BytesText::from_escaped(begin.as_str())))?;

    let mut xmpmeta = BytesStart::new("x:xmpmeta");
    xmpmeta.push_attribute(("xmlns:x", NS_X));
    emit(&mut w, Event::Start(xmpmeta))?;
    let mut rdf = BytesStart::new("rdf:RDF");
    rdf.push_attribute(("xmlns:rdf", NS_RDF));
    emit(&mut w, Event::Start(rdf))?;

    let mut description = BytesStart::new("rdf:Description");
    description.push_attribute(("rdf:about", ""));
    description.push_attribute(("xmlns:dc", NS_DC));
    description.push_attribute(("xmlns:xmp", NS_XMP));
    description.push_attribute(("xmlns:pdf", NS_PDF));
    emit(&mut w, Event::Start(description))?;

    language_alt(&mut w, "dc:title", &meta.title)?;
    language_alt(&mut w, "dc:description", &meta.description)?;
    emit(&mut w, Event::Start(BytesStart::new("dc:creator")))?;
    emit(&mut w, Event::Start(BytesStart::new("rdf:Seq")))?;
    text_element(&mut w, BytesStart::new("rdf:li"), &meta.creator)?;
    emit(&mut w, Event::End(BytesEnd::new("rdf:Seq")))?;
    emit(&mut w, Event::End(BytesEnd::new("dc:creator")))?;

    text_element(&mut w, BytesStart::new("xmp:CreatorTool"), &meta.creator_tool)?;
    text_element(&mut w, BytesStart::new("xmp:CreateDate"), &created)?;
    text_element(&mut w, BytesStart::new("xmp:ModifyDate"), &created)?;
    text_element(&mut w, BytesStart::new("xmp:MetadataDate"), &created)?;
    text_element(&mut w, BytesStart::new("pdf:Producer"), &meta.creator_tool)?;

    emit(&mut w, Event::End(BytesEnd::new("rdf:Description")))?;
    emit(&mut w, Event::End(BytesEnd::new("rdf:RDF")))?;
    emit(&mut w, Event::End(BytesEnd::new("x:xmpmeta")))?;
    emit(&mut w, Event::PI(BytesText::from_escaped("xpacket end=\"w\"")))?;

    Ok(w.into_inner().into_inner())
}

/// `<name><rdf:Alt><rdf:li xml:lang="x-default">text</rdf:li></rdf:Alt></name>`
fn language_alt(w: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<(), StoreError> {
    emit(w, Event::Start(BytesStart::new(name)))?;
    emit(w, Event::Start(BytesStart::new("rdf:Alt")))?;
    let mut li = BytesStart::new("rdf:li");
    li.push_attribute(("xml:lang", "x-default"));
    text_element(w, li, text)?;
    emit(w, Event::End(BytesEnd::new("rdf:Alt")))?;
    emit(w, Event::End(BytesEnd::new(name)))
}

fn text_element(
    w: &mut Writer<Cursor<Vec<u8>>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), StoreError> {
    let end = start.to_end().into_owned();
    emit(w, Event::Start(start))?;
    emit(w, Event::Text(BytesText::new(text)))?;
    emit(w, Event::End(end))
}

fn emit(w: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), StoreError> {
    w.write_event(event)
        .map_err(|e| StoreError::Metadata(format!("xmp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn titles_follow_form_type() {
        let at = datetime!(2024-03-05 10:20:30 UTC);
        let meta = DocumentMetadata::filled_form(Some("I-130"), "Acme Legal", at);
        assert_eq!(meta.title, "Form I-130");
        assert_eq!(meta.description, "Form I-130 - Filled");
        assert_eq!(meta.creator, "Acme Legal");
        assert_eq!(meta.creator_tool, DEFAULT_CREATOR_TOOL);

        let untyped = DocumentMetadata::filled_form(Some("  "), "Acme Legal", at);
        assert_eq!(untyped.title, "Form");
        assert_eq!(untyped.description, "Form - Filled");
    }

    #[test]
    fn date_formats() {
        let meta = DocumentMetadata::filled_form(None, "x", datetime!(2024-03-05 10:20:30 UTC));
        assert_eq!(meta.created_rfc3339().expect("rfc3339"), "2024-03-05T10:20:30Z");
        assert_eq!(meta.created_pdf_date(), "D:20240305102030Z");

        let offset = DocumentMetadata::filled_form(None, "x", datetime!(2024-03-05 10:20:30 -05:30));
        assert_eq!(offset.created_pdf_date(), "D:20240305102030-05'30'");
    }

    #[test]
    fn xmp_packet_carries_fields() {
        let meta = DocumentMetadata::filled_form(Some("I-130"), "A & B", datetime!(2024-03-05 10:20:30 UTC))
            .with_creator_tool("xfactl");
        let xmp = String::from_utf8(xmp_packet(&meta).expect("xmp")).expect("utf8");
        assert!(xmp.starts_with("<?xpacket begin=\"\u{FEFF}\""));
        assert!(xmp.trim_end().ends_with("<?xpacket end=\"w\"?>"));
        assert!(xmp.contains("<rdf:li xml:lang=\"x-default\">Form I-130</rdf:li>"));
        assert!(xmp.contains("<rdf:li xml:lang=\"x-default\">Form I-130 - Filled</rdf:li>"));
        assert!(xmp.contains("<rdf:li>A &amp; B</rdf:li>"));
        assert!(xmp.contains("<xmp:CreatorTool>xfactl</xmp:CreatorTool>"));
        assert!(xmp.contains("<xmp:CreateDate>2024-03-05T10:20:30Z</xmp:CreateDate>"));
    }
}
