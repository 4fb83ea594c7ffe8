use tracing::debug;
use xfa_path::FieldPath;
use xfa_xml::Element;

use crate::kind::{FieldKind, TemplateTag};
use crate::FieldDescriptor;

/// Enumerate every `field` and `exclGroup` under `root` in document
/// pre-order.
///
/// The walk keeps no state between calls. Anonymous containers do not add a
/// path segment; their named descendants chain off the nearest named
/// ancestor.
pub fn walk(root: &Element) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    visit(root, &FieldPath::root(), &mut fields);
    fields
}

fn visit(element: &Element, parent: &FieldPath, fields: &mut Vec<FieldDescriptor>) {
    let name = element.attribute("name").unwrap_or("");
    let path = parent.child(name);

    match TemplateTag::decode(element.local_name()) {
        TemplateTag::Field => fields.push(describe_field(element, &path, name)),
        TemplateTag::ExclGroup => fields.push(describe_group(element, &path, name)),
        TemplateTag::Ui
        | TemplateTag::Widget(_)
        | TemplateTag::Caption
        | TemplateTag::Value
        | TemplateTag::Text
        | TemplateTag::Assist
        | TemplateTag::ToolTip
        | TemplateTag::Items
        | TemplateTag::Other => {}
    }

    for child in element.child_elements() {
        visit(child, &path, fields);
    }
}

fn describe_field(field: &Element, path: &FieldPath, name: &str) -> FieldDescriptor {
    let kind = widget_kind(field).unwrap_or(FieldKind::Text);
    let options = item_values(field);
    debug!(path = %path, %kind, "template field");
    FieldDescriptor {
        path: path.clone(),
        local_name: name.to_string(),
        kind,
        caption: caption(field),
        tooltip: tooltip(field),
        options: (!options.is_empty()).then_some(options),
    }
}

/// Radio group options: for each member field, its item values followed by
/// its own name. Item values and member names end up in one list.
fn describe_group(group: &Element, path: &FieldPath, name: &str) -> FieldDescriptor {
    let mut options = Vec::new();
    for member in children_tagged(group, TemplateTag::Field) {
        options.extend(item_values(member));
        match member.attribute("name") {
            Some(member_name) if !member_name.is_empty() => options.push(member_name.to_string()),
            _ => {}
        }
    }
    debug!(path = %path, members = options.len(), "template radio group");
    FieldDescriptor {
        path: path.clone(),
        local_name: name.to_string(),
        kind: FieldKind::Radio,
        caption: String::new(),
        tooltip: String::new(),
        options: (!options.is_empty()).then_some(options),
    }
}

/// First recognized widget under any `<ui>` child, in document order.
fn widget_kind(field: &Element) -> Option<FieldKind> {
    children_tagged(field, TemplateTag::Ui)
        .flat_map(Element::child_elements)
        .find_map(|widget| match TemplateTag::decode(widget.local_name()) {
            TemplateTag::Widget(kind) => Some(kind),
            _ => None,
        })
}

fn caption(field: &Element) -> String {
    first_text(
        children_tagged(field, TemplateTag::Caption)
            .flat_map(|caption| children_tagged(caption, TemplateTag::Value))
            .flat_map(|value| children_tagged(value, TemplateTag::Text)),
    )
}

fn tooltip(field: &Element) -> String {
    first_text(
        children_tagged(field, TemplateTag::Assist)
            .flat_map(|assist| children_tagged(assist, TemplateTag::ToolTip)),
    )
}

/// Non-empty text of every element inside the `<items>` children.
fn item_values(field: &Element) -> Vec<String> {
    children_tagged(field, TemplateTag::Items)
        .flat_map(Element::child_elements)
        .map(|item| item.text().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn first_text<'a>(mut candidates: impl Iterator<Item = &'a Element>) -> String {
    candidates
        .find_map(|element| {
            let text = element.text();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_default()
}

fn children_tagged(element: &Element, tag: TemplateTag) -> impl Iterator<Item = &Element> {
    element
        .child_elements()
        .filter(move |child| TemplateTag::decode(child.local_name()) == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfa_xml::parse_str;

    const NS: &str = "http://www.xfa.org/schema/xfa-template/3.3/";

    fn fields_of(body: &str) -> Vec<FieldDescriptor> {
        let xml = format!("<template xmlns=\"{NS}\">{body}</template>");
        walk(&parse_str(&xml).expect("template parses"))
    }

    #[test]
    fn text_field_under_named_subform() {
        let fields = fields_of(
            r#"<subform name="form1">
                 <field name="FirstName"><ui><textEdit/></ui></field>
               </subform>"#,
        );
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path.to_string(), "form1.FirstName");
        assert_eq!(fields[0].local_name, "FirstName");
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert_eq!(fields[0].options, None);
    }

    #[test]
    fn anonymous_containers_do_not_add_segments() {
        let fields = fields_of(
            r#"<subform name="form1"><subform><area>
                 <field name="A"/>
               </area></subform></subform>
               <field/>"#,
        );
        assert_eq!(fields[0].path.to_string(), "form1.A");
        assert_eq!(fields[1].path.to_string(), "");
        assert_eq!(fields[1].local_name, "");
    }

    #[test]
    fn widget_kinds_and_default() {
        let fields = fields_of(
            r#"<field name="c"><ui><checkButton/></ui></field>
               <field name="d"><ui><choiceList/></ui></field>
               <field name="t"><ui><dateTimeEdit/></ui></field>
               <field name="n"><ui><numericEdit/></ui></field>
               <field name="i"><ui><imageEdit/></ui></field>
               <field name="s"><ui><signatureEdit/></ui></field>
               <field name="b"><ui><barcode/></ui></field>
               <field name="p"><ui><passwordEdit/></ui></field>
               <field name="none"/>"#,
        );
        let kinds: Vec<_> = fields.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Checkbox,
                FieldKind::Dropdown,
                FieldKind::Date,
                FieldKind::Numeric,
                FieldKind::Image,
                FieldKind::Signature,
                FieldKind::Barcode,
                FieldKind::Text,
                FieldKind::Text,
            ]
        );
    }

    #[test]
    fn first_recognized_widget_wins() {
        let fields = fields_of(
            r#"<field name="x"><ui><picture/><numericEdit/><checkButton/></ui></field>"#,
        );
        assert_eq!(fields[0].kind, FieldKind::Numeric);
    }

    #[test]
    fn caption_tooltip_and_options() {
        let fields = fields_of(
            r#"<field name="Country">
                 <ui><choiceList/></ui>
                 <caption><value><text>   </text></value><value><text>  Country of birth </text></value></caption>
                 <assist><toolTip>
                   Select a country
                 </toolTip></assist>
                 <items><text>US</text><text> </text><text>CA</text></items>
                 <items save="1"><text>MX</text></items>
               </field>"#,
        );
        let field = &fields[0];
        assert_eq!(field.caption, "Country of birth");
        assert_eq!(field.tooltip, "Select a country");
        assert_eq!(
            field.options.as_deref(),
            Some(&["US".to_string(), "CA".to_string(), "MX".to_string()][..])
        );
    }

    #[test]
    fn missing_caption_and_tooltip_are_empty() {
        let fields = fields_of(r#"<field name="x"><caption/><assist><speak>hi</speak></assist></field>"#);
        assert_eq!(fields[0].caption, "");
        assert_eq!(fields[0].tooltip, "");
    }

    #[test]
    fn excl_group_options_interleave_items_and_names() {
        let fields = fields_of(
            r#"<subform name="form1">
                 <exclGroup name="Sex">
                   <field name="Male"><ui><checkButton/></ui><items><integer>M</integer></items></field>
                   <field name="Female"><ui><checkButton/></ui><items><integer>F</integer></items></field>
                 </exclGroup>
               </subform>"#,
        );
        let paths: Vec<_> = fields.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["form1.Sex", "form1.Sex.Male", "form1.Sex.Female"]);
        let group = &fields[0];
        assert_eq!(group.kind, FieldKind::Radio);
        assert_eq!(
            group.options.as_deref(),
            Some(&["M", "Male", "F", "Female"].map(String::from)[..])
        );
        assert_eq!(fields[1].options.as_deref(), Some(&["M".to_string()][..]));
    }

    #[test]
    fn empty_excl_group_has_no_options() {
        let fields = fields_of(r#"<exclGroup name="G"><field/></exclGroup>"#);
        assert_eq!(fields[0].kind, FieldKind::Radio);
        assert_eq!(fields[0].options, None);
    }

    #[test]
    fn preorder_is_preserved() {
        let fields = fields_of(
            r#"<subform name="a">
                 <field name="one"/>
                 <subform name="b"><field name="two"/></subform>
                 <field name="three"/>
               </subform>
               <field name="four"/>"#,
        );
        let paths: Vec<_> = fields.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["a.one", "a.b.two", "a.three", "four"]);
    }

    #[test]
    fn walk_is_restartable() {
        let xml = format!(
            "<template xmlns=\"{NS}\"><subform name=\"f\"><field name=\"x\"/></subform></template>"
        );
        let root = parse_str(&xml).expect("parse");
        assert_eq!(walk(&root), walk(&root));
    }

    #[test]
    fn prefixed_template_tags_are_recognized() {
        let xml = format!(
            "<t:template xmlns:t=\"{NS}\"><t:subform name=\"f\">\
             <t:field name=\"x\"><t:ui><t:checkButton/></t:ui></t:field>\
             </t:subform></t:template>"
        );
        let fields = walk(&parse_str(&xml).expect("parse"));
        assert_eq!(fields[0].path.to_string(), "f.x");
        assert_eq!(fields[0].kind, FieldKind::Checkbox);
    }
}
