use crate::{DocumentMetadata, FieldRef, FormStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoryField {
    name: String,
    read_only: bool,
}

/// In-memory [`FormStore`], handy for tests and for callers that keep XFA
/// packets outside a PDF.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormStore {
    packets: Vec<(String, Vec<u8>)>,
    flags: Vec<String>,
    fields: Vec<MemoryField>,
    metadata: Option<DocumentMetadata>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packet<N: Into<String>, X: Into<Vec<u8>>>(mut self, name: N, xml: X) -> Self {
        self.packets.push((name.into(), xml.into()));
        self
    }

    pub fn with_field<N: Into<String>>(mut self, name: N) -> Self {
        self.fields.push(MemoryField {
            name: name.into(),
            read_only: false,
        });
        self
    }

    pub fn packet(&self, name: &str) -> Option<&[u8]> {
        self.packets
            .iter()
            .find(|(packet, _)| packet == name)
            .map(|(_, xml)| xml.as_slice())
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn read_only_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.read_only)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }
}

impl FormStore for MemoryFormStore {
    fn read_named_xml(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.packet(name)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| StoreError::not_found(format!("no {name} in XFA")))
    }

    fn write_named_xml(&mut self, name: &str, xml: &[u8]) -> Result<(), StoreError> {
        let (_, slot) = self
            .packets
            .iter_mut()
            .find(|(packet, _)| packet == name)
            .ok_or_else(|| StoreError::not_found(format!("no {name} in XFA")))?;
        *slot = xml.to_vec();
        Ok(())
    }

    fn set_flag_if_absent(&mut self, flag: &str) -> Result<bool, StoreError> {
        if self.has_flag(flag) {
            return Ok(false);
        }
        self.flags.push(flag.to_string());
        Ok(true)
    }

    fn field_refs(&self) -> Result<Vec<FieldRef>, StoreError> {
        Ok((0..self.fields.len()).map(FieldRef::Index).collect())
    }

    fn set_read_only(&mut self, fields: &[FieldRef]) -> Result<(), StoreError> {
        for field in fields {
            let entry = match *field {
                FieldRef::Index(index) => self.fields.get_mut(index),
                FieldRef::Object(..) => None,
            }
            .ok_or_else(|| StoreError::not_found(format!("no field {field:?}")))?;
            entry.read_only = true;
        }
        Ok(())
    }

    fn set_metadata(&mut self, metadata: &DocumentMetadata) -> Result<(), StoreError> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DATASETS_PACKET, NEED_APPEARANCES};

    #[test]
    fn packets_round_trip_by_name() {
        let mut store = MemoryFormStore::new().with_packet(DATASETS_PACKET, "<a/>");
        assert_eq!(store.read_named_xml(DATASETS_PACKET).expect("read"), b"<a/>");
        store.write_named_xml(DATASETS_PACKET, b"<b/>").expect("write");
        assert_eq!(store.packet(DATASETS_PACKET), Some(&b"<b/>"[..]));
        assert!(matches!(
            store.read_named_xml("template"),
            Err(StoreError::NotFound(ref msg)) if msg == "no template in XFA"
        ));
        assert!(store.write_named_xml("template", b"<t/>").is_err());
    }

    #[test]
    fn flags_and_read_only() {
        let mut store = MemoryFormStore::new().with_field("A").with_field("B");
        assert!(store.set_flag_if_absent(NEED_APPEARANCES).expect("first"));
        assert!(!store.set_flag_if_absent(NEED_APPEARANCES).expect("second"));
        let refs = store.field_refs().expect("refs");
        store.set_read_only(&refs[1..]).expect("read-only");
        assert_eq!(store.read_only_fields(), vec!["B"]);
        assert!(store.set_read_only(&[FieldRef::Index(9)]).is_err());
        assert!(store.set_read_only(&[FieldRef::Object(1, 0)]).is_err());
    }
}
