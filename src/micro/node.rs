/// A node below an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicroNode {
    Element(MicroElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicroElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<MicroNode>,
}

impl MicroElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets or replaces an attribute, keeping the original position on replace.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    /// Sets the attribute only for `Some` values.
    pub fn set_attribute_opt<S: Into<String>>(&mut self, name: &str, value: Option<S>) -> &mut Self {
        if let Some(value) = value {
            self.set_attribute(name, value);
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let len_before = self.attributes.len();
        self.attributes.retain(|(n, _)| n != name);
        len_before != self.attributes.len()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Appends a new child element and returns it for further building.
    pub fn append_element(&mut self, name: impl Into<String>) -> &mut MicroElement {
        self.children.push(MicroNode::Element(MicroElement::new(name)));
        match self.children.last_mut() {
            Some(MicroNode::Element(element)) => element,
            _ => unreachable!("element was pushed above"),
        }
    }

    pub fn append_child(&mut self, element: MicroElement) -> &mut Self {
        self.children.push(MicroNode::Element(element));
        self
    }

    pub fn append_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.children.push(MicroNode::Text(text.into()));
        self
    }

    pub fn append_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.children.push(MicroNode::Comment(text.into()));
        self
    }

    pub fn children(&self) -> &[MicroNode] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &MicroElement> {
        self.children.iter().filter_map(|node| match node {
            MicroNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MicroElement> + 'a {
        self.child_elements().filter(move |e| e.name == name)
    }

    pub fn first_child_element(&self, name: &str) -> Option<&MicroElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Removes whitespace-only text next to child elements or comments.
    ///
    /// Mixed content with real text is left alone.
    pub(crate) fn drop_indentation(&mut self) {
        let has_markup = self.children.iter().any(|node| !matches!(node, MicroNode::Text(_)));
        let only_blank_text = self.children.iter().all(|node| match node {
            MicroNode::Text(text) => text.trim().is_empty(),
            _ => true,
        });
        if has_markup && only_blank_text {
            self.children.retain(|node| !matches!(node, MicroNode::Text(_)));
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                MicroNode::Text(text) => out.push_str(text),
                MicroNode::Element(element) => element.collect_text(out),
                MicroNode::Comment(_) => {}
            }
        }
    }

    /// Text content of the first child element called `name`.
    pub fn child_text_content(&self, name: &str) -> Option<String> {
        self.first_child_element(name).map(|e| e.text_content())
    }
}

/// A document: leading comments plus at most one root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MicroDocument {
    comments: Vec<String>,
    root: Option<MicroElement>,
}

impl MicroDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: MicroElement) -> Self {
        Self {
            comments: Vec::new(),
            root: Some(root),
        }
    }

    /// Creates the root element, replacing any previous one.
    pub fn append_root(&mut self, name: impl Into<String>) -> &mut MicroElement {
        self.root.insert(MicroElement::new(name))
    }

    pub fn set_root(&mut self, root: MicroElement) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&MicroElement> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut MicroElement> {
        self.root.as_mut()
    }

    pub fn into_root(self) -> Option<MicroElement> {
        self.root
    }

    /// Comments placed before the root element.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn insert_comment_before_root(&mut self, text: impl Into<String>) {
        self.comments.push(text.into());
    }
}
