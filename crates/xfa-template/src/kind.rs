use core::fmt;

/// Interactive control type presented by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldKind {
    Text,
    Checkbox,
    Dropdown,
    Date,
    Numeric,
    Image,
    Signature,
    Barcode,
    /// Radio group built from an `exclGroup`.
    Radio,
}

impl FieldKind {
    /// Every kind, in declaration order.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Text,
        FieldKind::Checkbox,
        FieldKind::Dropdown,
        FieldKind::Date,
        FieldKind::Numeric,
        FieldKind::Image,
        FieldKind::Signature,
        FieldKind::Barcode,
        FieldKind::Radio,
    ];

    /// Map a widget element under `<ui>` to the field kind it implies.
    pub fn from_widget(local_name: &str) -> Option<FieldKind> {
        match local_name {
            "checkButton" => Some(FieldKind::Checkbox),
            "choiceList" => Some(FieldKind::Dropdown),
            "dateTimeEdit" => Some(FieldKind::Date),
            "numericEdit" => Some(FieldKind::Numeric),
            "textEdit" => Some(FieldKind::Text),
            "imageEdit" => Some(FieldKind::Image),
            "signatureEdit" => Some(FieldKind::Signature),
            "barcode" => Some(FieldKind::Barcode),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Date => "date",
            FieldKind::Numeric => "numeric",
            FieldKind::Image => "image",
            FieldKind::Signature => "signature",
            FieldKind::Barcode => "barcode",
            FieldKind::Radio => "radio",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Template element kinds the walker cares about, decoded once from the
/// namespace-stripped tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTag {
    Field,
    ExclGroup,
    Ui,
    /// A widget element that determines the field kind.
    Widget(FieldKind),
    Caption,
    Value,
    Text,
    Assist,
    ToolTip,
    Items,
    Other,
}

impl TemplateTag {
    pub fn decode(local_name: &str) -> TemplateTag {
        match local_name {
            "field" => TemplateTag::Field,
            "exclGroup" => TemplateTag::ExclGroup,
            "ui" => TemplateTag::Ui,
            "caption" => TemplateTag::Caption,
            "value" => TemplateTag::Value,
            "text" => TemplateTag::Text,
            "assist" => TemplateTag::Assist,
            "toolTip" => TemplateTag::ToolTip,
            "items" => TemplateTag::Items,
            other => match FieldKind::from_widget(other) {
                Some(kind) => TemplateTag::Widget(kind),
                None => TemplateTag::Other,
            },
        }
    }
}
