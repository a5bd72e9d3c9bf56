use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// One node of parsed post markup.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment(String),
    /// Everything between `<` and `>` of a `<!...>` or `<?...>` block.
    Directive(String),
    /// `script`/`style`; always rendered as inert text.
    Script(Element),
}

impl Node {
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text(data.into())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
    /// Span of the opening tag.
    pub span: Span,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Attributes::default(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Ordered attribute list with unique names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attributes {
    items: Vec<(String, String)>,
}

impl Attributes {
    /// A repeated name replaces the earlier value but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.items.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.items.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Output of a [`TreeParser`].
#[derive(Clone, Debug, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Tree {
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            diagnostics: Vec::new(),
        }
    }
}

/// Turns raw markup into a node tree. Implementations must not decode
/// entities: `&lt;` in the source stays `&lt;` in text and attribute values.
pub trait TreeParser {
    fn parse_tree(&self, source: &str) -> Tree;
}
