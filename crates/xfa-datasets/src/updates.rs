use indexmap::IndexMap;

/// Ordered `path → value` entries for one fill operation.
///
/// Entry order is the order paths were first inserted; inserting an existing
/// path replaces its value in place. An absent value is kept as an entry so
/// it still counts towards the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdates {
    entries: IndexMap<String, Option<String>>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<String>, V: Into<String>>(&mut self, path: P, value: V) {
        self.set(path.into(), Some(value.into()));
    }

    /// Record a path without a value; merging skips it.
    pub fn insert_absent<P: Into<String>>(&mut self, path: P) {
        self.set(path.into(), None);
    }

    fn set(&mut self, path: String, value: Option<String>) {
        self.entries.insert(path, value);
    }

    pub fn get(&self, path: &str) -> Option<Option<&str>> {
        self.entries.get(path).map(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(path, value)| (path.as_str(), value.as_deref()))
    }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for FieldUpdates {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut updates = FieldUpdates::new();
        for (path, value) in iter {
            updates.insert(path, value);
        }
        updates
    }
}

/// String form of a JSON value: strings as-is, `null` as absent, everything
/// else as compact JSON text (`3`, `true`, `["a"]`).
#[cfg(feature = "serde")]
fn canonical(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FieldUpdates {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UpdatesVisitor;

        impl<'de> serde::de::Visitor<'de> for UpdatesVisitor {
            type Value = FieldUpdates;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of field paths to values")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<FieldUpdates, A::Error> {
                let mut updates = FieldUpdates::new();
                while let Some((path, value)) = map.next_entry::<String, serde_json::Value>()? {
                    updates.set(path, canonical(value));
                }
                Ok(updates)
            }
        }

        deserializer.deserialize_map(UpdatesVisitor)
    }
}
