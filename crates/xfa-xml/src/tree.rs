/// Strip the namespace prefix from a qualified name (`xfa:data` → `data`).
pub fn local_name(qname: &str) -> &str {
    match qname.split_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

/// Attribute as written in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Raw qualified name, e.g. `name` or `xmlns:xfa`.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

/// Content node inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, unescaped.
    Text(String),
    CData(String),
    /// Raw comment body.
    Comment(String),
    /// Raw processing instruction body.
    ProcessingInstruction(String),
}

/// XML element owning its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element with the given raw qualified name.
    ///
    /// Elements created this way carry no resolved namespace; they inherit
    /// whatever default namespace is in scope once written out.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty element whose name belongs to `namespace`.
    ///
    /// The caller is responsible for a matching `xmlns` declaration being in
    /// scope when the tree is written.
    pub fn in_namespace<S: Into<String>, N: Into<String>>(name: S, namespace: N) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn with_parts(
        name: String,
        namespace: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        }
    }

    /// Raw qualified name as it appears in the markup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix of the element name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Namespace URI resolved at parse time.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of the attribute with the given raw name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set or replace an attribute, keeping the position of an existing one.
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// URI declared on this element for `prefix` (`None` means the default
    /// namespace).
    pub fn declared_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        let key = match prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        self.attribute(&key)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Append a child element and return it.
    pub fn push_element(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        let last = self.children.len() - 1;
        let Node::Element(child) = &mut self.children[last] else {
            unreachable!("last child was just pushed as an element");
        };
        child
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Child elements whose local name equals `local`, namespace ignored.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements()
            .filter(move |child| child.local_name() == local)
    }

    /// First child element with the given local name and namespace URI.
    pub fn find_child_ns(&self, local: &str, namespace: &str) -> Option<&Element> {
        self.child_elements()
            .find(|child| child.local_name() == local && child.namespace() == Some(namespace))
    }

    pub fn find_child_ns_mut(&mut self, local: &str, namespace: &str) -> Option<&mut Element> {
        self.child_elements_mut()
            .find(|child| child.local_name() == local && child.namespace() == Some(namespace))
    }

    /// First child element whose raw name equals `name` exactly.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// First child element named `name`, appended as the last child when
    /// missing. Existing children are never reordered.
    pub fn find_or_insert_child(&mut self, name: &str) -> &mut Element {
        let existing = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(child) if child.name == name));
        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.children.push(Node::Element(Element::new(name)));
                self.children.len() - 1
            }
        };
        let Node::Element(child) = &mut self.children[idx] else {
            unreachable!("index was resolved to an element node");
        };
        child
    }

    /// Character data before the first child element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(chunk) | Node::CData(chunk) => text.push_str(chunk),
                Node::Element(_) => break,
                Node::Comment(_) | Node::ProcessingInstruction(_) => {}
            }
        }
        text
    }

    /// Replace the character data before the first child element.
    ///
    /// Child elements and everything after the first one stay untouched.
    pub fn set_text<S: Into<String>>(&mut self, value: S) {
        let first_element = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(_)))
            .unwrap_or(self.children.len());
        let mut idx = 0;
        let mut remaining = first_element;
        while remaining > 0 {
            if matches!(self.children[idx], Node::Text(_) | Node::CData(_)) {
                self.children.remove(idx);
            } else {
                idx += 1;
            }
            remaining -= 1;
        }
        let value = value.into();
        if !value.is_empty() {
            self.children.insert(0, Node::Text(value));
        }
    }

    /// Whether this element or any descendant uses `prefix` in its name.
    pub fn uses_prefix(&self, prefix: &str) -> bool {
        self.prefix() == Some(prefix) || self.child_elements().any(|child| child.uses_prefix(prefix))
    }
}
