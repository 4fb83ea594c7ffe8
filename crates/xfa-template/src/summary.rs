use crate::{FieldDescriptor, FieldKind};

/// Per-kind field counts over a walk result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldSummary {
    /// Kinds with at least one field, sorted by kind name.
    pub counts: Vec<(FieldKind, usize)>,
    pub total: usize,
}

impl FieldSummary {
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        let mut counts: Vec<(FieldKind, usize)> = FieldKind::ALL
            .iter()
            .map(|kind| (*kind, fields.iter().filter(|f| f.kind == *kind).count()))
            .filter(|(_, count)| *count > 0)
            .collect();
        counts.sort_by_key(|(kind, _)| kind.as_str());
        Self {
            counts,
            total: fields.len(),
        }
    }

    pub fn count(&self, kind: FieldKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, count)| *count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfa_path::FieldPath;

    fn field(kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor {
            path: FieldPath::root().child("x"),
            local_name: "x".into(),
            kind,
            caption: String::new(),
            tooltip: String::new(),
            options: None,
        }
    }

    #[test]
    fn counts_sorted_by_name() {
        let fields = vec![
            field(FieldKind::Text),
            field(FieldKind::Radio),
            field(FieldKind::Checkbox),
            field(FieldKind::Text),
        ];
        let summary = FieldSummary::from_fields(&fields);
        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.counts,
            vec![
                (FieldKind::Checkbox, 1),
                (FieldKind::Radio, 1),
                (FieldKind::Text, 2)
            ]
        );
        assert_eq!(summary.count(FieldKind::Date), 0);
    }

    #[test]
    fn empty_summary() {
        let summary = FieldSummary::from_fields(&[]);
        assert_eq!(summary, FieldSummary::default());
    }
}
