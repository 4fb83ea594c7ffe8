use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info};

use crate::metadata::xmp_packet;
use crate::{DocumentMetadata, FieldRef, FormStore, StoreError};

/// [`FormStore`] over a PDF whose `/Root/AcroForm/XFA` entry is an array of
/// alternating packet names and streams.
#[derive(Debug)]
pub struct PdfFormStore {
    doc: Document,
}

impl PdfFormStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let doc = Document::load(path)?;
        debug!(path = %path.display(), "opened PDF");
        Ok(Self { doc })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(Self {
            doc: Document::load_mem(bytes)?,
        })
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        self.doc.save(path)?;
        info!(path = %path.display(), "saved PDF");
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf)?;
        Ok(buf)
    }

    /// Names of the XFA packets in document order.
    pub fn packet_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .xfa_entries()?
            .chunks_exact(2)
            .filter_map(|pair| packet_name(&pair[0]))
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect())
    }

    fn catalog_id(&self) -> Result<ObjectId, StoreError> {
        self.doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| StoreError::not_found("no document catalog"))
    }

    fn catalog(&self) -> Result<&Dictionary, StoreError> {
        Ok(self.doc.get_object(self.catalog_id()?)?.as_dict()?)
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, StoreError> {
        match object {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn acroform(&self) -> Result<&Dictionary, StoreError> {
        let entry = self
            .catalog()?
            .get(b"AcroForm")
            .map_err(|_| StoreError::not_found("no AcroForm in PDF"))?;
        self.resolve(entry)?
            .as_dict()
            .map_err(|_| StoreError::not_found("AcroForm is not a dictionary"))
    }

    fn acroform_mut(&mut self) -> Result<&mut Dictionary, StoreError> {
        let catalog_id = self.catalog_id()?;
        let target = match self.catalog()?.get(b"AcroForm") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => return Err(StoreError::not_found("no AcroForm in PDF")),
        };
        let object = match target {
            Some(id) => self.doc.get_object_mut(id)?,
            None => self
                .doc
                .get_object_mut(catalog_id)?
                .as_dict_mut()?
                .get_mut(b"AcroForm")?,
        };
        object
            .as_dict_mut()
            .map_err(|_| StoreError::not_found("AcroForm is not a dictionary"))
    }

    fn xfa_entries(&self) -> Result<&[Object], StoreError> {
        let entry = self
            .acroform()?
            .get(b"XFA")
            .map_err(|_| StoreError::not_found("no XFA in AcroForm"))?;
        match self.resolve(entry)? {
            Object::Array(entries) => Ok(entries.as_slice()),
            Object::Stream(_) => Err(StoreError::not_found(
                "XFA is a single stream, not a packet array",
            )),
            _ => Err(StoreError::not_found("XFA is not a packet array")),
        }
    }

    fn xfa_entries_mut(&mut self) -> Result<&mut Vec<Object>, StoreError> {
        let target = match self.acroform()?.get(b"XFA") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => return Err(StoreError::not_found("no XFA in AcroForm")),
        };
        let object = match target {
            Some(id) => self.doc.get_object_mut(id)?,
            None => self.acroform_mut()?.get_mut(b"XFA")?,
        };
        object
            .as_array_mut()
            .map_err(|_| StoreError::not_found("XFA is not a packet array"))
    }

    fn fields(&self) -> Result<&[Object], StoreError> {
        let entry = self
            .acroform()?
            .get(b"Fields")
            .map_err(|_| StoreError::not_found("no Fields in AcroForm"))?;
        Ok(self.resolve(entry)?.as_array()?.as_slice())
    }

    fn fields_mut(&mut self) -> Result<&mut Vec<Object>, StoreError> {
        let target = match self.acroform()?.get(b"Fields") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => return Err(StoreError::not_found("no Fields in AcroForm")),
        };
        let object = match target {
            Some(id) => self.doc.get_object_mut(id)?,
            None => self.acroform_mut()?.get_mut(b"Fields")?,
        };
        Ok(object.as_array_mut()?)
    }

    fn field_mut(&mut self, field: FieldRef) -> Result<&mut Dictionary, StoreError> {
        let index = match field {
            FieldRef::Object(number, generation) => {
                return Ok(self.doc.get_object_mut((number, generation))?.as_dict_mut()?);
            }
            FieldRef::Index(index) => index,
        };
        let missing = || StoreError::not_found(format!("no field at index {index}"));
        let referenced = match self.fields()?.get(index) {
            Some(Object::Reference(id)) => Some(*id),
            Some(_) => None,
            None => return Err(missing()),
        };
        let object = match referenced {
            Some(id) => self.doc.get_object_mut(id)?,
            None => self.fields_mut()?.get_mut(index).ok_or_else(missing)?,
        };
        object
            .as_dict_mut()
            .map_err(|_| StoreError::not_found(format!("field {index} is not a dictionary")))
    }

    /// Put `stream` at `existing` when the old object is indirect, so the
    /// previous content is dropped from the document; otherwise add it.
    fn replace_stream(&mut self, existing: Option<ObjectId>, stream: Stream) -> ObjectId {
        match existing {
            Some(id) => {
                self.doc.objects.insert(id, Object::Stream(stream));
                id
            }
            None => self.doc.add_object(stream),
        }
    }

    fn info_mut(&mut self) -> Result<&mut Dictionary, StoreError> {
        let id = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => *id,
            Ok(Object::Dictionary(inline)) => {
                let inline = inline.clone();
                self.doc.add_object(inline)
            }
            _ => self.doc.add_object(Dictionary::new()),
        };
        self.doc.trailer.set("Info", id);
        Ok(self.doc.get_object_mut(id)?.as_dict_mut()?)
    }
}

impl FormStore for PdfFormStore {
    fn read_named_xml(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let entries = self.xfa_entries()?;
        let index = packet_index(entries, name)
            .ok_or_else(|| StoreError::not_found(format!("no {name} in XFA")))?;
        let stream = self
            .resolve(&entries[index])?
            .as_stream()
            .map_err(|_| StoreError::not_found(format!("XFA {name} packet is not a stream")))?;
        let content = if stream.dict.has(b"Filter") {
            stream.decompressed_content()?
        } else {
            stream.content.clone()
        };
        debug!(packet = name, bytes = content.len(), "read XFA packet");
        Ok(content)
    }

    fn write_named_xml(&mut self, name: &str, xml: &[u8]) -> Result<(), StoreError> {
        let entries = self.xfa_entries()?;
        let index = packet_index(entries, name)
            .ok_or_else(|| StoreError::not_found(format!("no {name} in XFA")))?;
        let existing = match &entries[index] {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        let id = self.replace_stream(existing, Stream::new(Dictionary::new(), xml.to_vec()));
        if existing.is_none() {
            self.xfa_entries_mut()?[index] = Object::Reference(id);
        }
        debug!(packet = name, ?id, bytes = xml.len(), "replaced XFA packet");
        Ok(())
    }

    fn set_flag_if_absent(&mut self, flag: &str) -> Result<bool, StoreError> {
        let acroform = self.acroform_mut()?;
        if acroform.has(flag.as_bytes()) {
            return Ok(false);
        }
        acroform.set(flag, true);
        debug!(flag, "set AcroForm flag");
        Ok(true)
    }

    fn field_refs(&self) -> Result<Vec<FieldRef>, StoreError> {
        if !self.acroform()?.has(b"Fields") {
            return Ok(Vec::new());
        }
        Ok(self
            .fields()?
            .iter()
            .enumerate()
            .map(|(index, field)| match field {
                Object::Reference((number, generation)) => FieldRef::Object(*number, *generation),
                _ => FieldRef::Index(index),
            })
            .collect())
    }

    fn set_read_only(&mut self, fields: &[FieldRef]) -> Result<(), StoreError> {
        for field in fields {
            let dict = self.field_mut(*field)?;
            let flags = dict.get(b"Ff").and_then(Object::as_i64).unwrap_or(0);
            dict.set("Ff", flags | 1);
        }
        debug!(count = fields.len(), "marked fields read-only");
        Ok(())
    }

    fn set_metadata(&mut self, metadata: &DocumentMetadata) -> Result<(), StoreError> {
        let xmp = xmp_packet(metadata)?;
        let date = metadata.created_pdf_date();

        let info = self.info_mut()?;
        info.set("Title", pdf_text(&metadata.title));
        info.set("Subject", pdf_text(&metadata.description));
        info.set("Author", pdf_text(&metadata.creator));
        info.set("Creator", pdf_text(&metadata.creator_tool));
        info.set("Producer", pdf_text(&metadata.creator_tool));
        info.set("CreationDate", Object::string_literal(date.as_str()));
        info.set("ModDate", Object::string_literal(date));

        let stream = Stream::new(
            dictionary! {
                "Type" => "Metadata",
                "Subtype" => "XML",
            },
            xmp,
        )
        .with_compression(false);
        let existing = match self.catalog()?.get(b"Metadata") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        let xmp_id = self.replace_stream(existing, stream);
        let catalog_id = self.catalog_id()?;
        self.doc
            .get_object_mut(catalog_id)?
            .as_dict_mut()?
            .set("Metadata", xmp_id);
        debug!(title = %metadata.title, "wrote document metadata");
        Ok(())
    }
}

fn packet_name(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) | Object::Name(bytes) => Some(bytes),
        _ => None,
    }
}

/// Index of the stream entry paired with `name`; first match wins.
fn packet_index(entries: &[Object], name: &str) -> Option<usize> {
    entries
        .chunks_exact(2)
        .position(|pair| packet_name(&pair[0]) == Some(name.as_bytes()))
        .map(|pair| pair * 2 + 1)
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn pdf_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}
