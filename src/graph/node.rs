//! Template node types
//!
//! The compiled template graph is a tree of [`Node`] values. Graphs are produced by an
//! external compiler (see [`crate::graph::wire`] for the JSON shape) and are treated as
//! immutable: every transformation builds new nodes instead of editing in place.

use std::fmt;

use crate::component::Widget;

/// A compiled graph: an ordered sequence of root nodes
///
/// Single-root templates are simply sequences of length one.
pub type Graph = Vec<Node>;

/// A bound-value expression, stored as a dotted reference path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(pub String);

impl Expr {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, with the implicit-context forms (`.`, `this`) yielding none
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split('.')
            .filter(|s| !s.is_empty() && *s != "this")
    }

    /// The last path segment, used as the key of an interpolator
    pub fn key(&self) -> &str {
        self.segments().last().unwrap_or(".")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a template graph
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Static text
    Text(String),
    /// Markup element: `<li class="item">...</li>`
    Element(Element),
    /// Escaped bound value: `{{name}}`
    Interpolator(Expr),
    /// Unescaped bound value: `{{{html}}}`
    Triple(Expr),
    /// Bare reference to a bound value
    Reference(Expr),
    /// Conditional or iterated block: `{{#items}}...{{/items}}`
    Section(Section),
    /// Inverted block: `{{^items}}...{{/items}}`
    SectionUnless(Section),
    /// Named sub-template: `{{>header}}`
    Partial(PartialRef),
    /// Markup comment
    Comment(String),
    /// Explicit closing tag, only meaningful while interpreting
    ClosingTag(ClosingTag),
    /// Child component placeholder introduced by the attachment pass
    Widget(Widget),
}

impl Node {
    /// Shorthand for a text node
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    /// Children of container nodes, empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Section(s) | Node::SectionUnless(s) => &s.children,
            Node::Partial(p) => &p.children,
            _ => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Markup element node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Set on the top-level elements of an attached view; such elements never become widgets
    pub is_root: bool,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attribute("class", AttrValue::Static(class.into()))
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Static portion of the `class` attribute, if present
    pub fn static_class(&self) -> Option<String> {
        self.attribute("class").map(AttrValue::static_text)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// Element attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// Attribute value as compiled
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Valueless attribute: `<input disabled>`
    Empty,
    /// Literal value
    Static(String),
    /// Mix of literal text and bound nodes
    Mixed(Vec<Node>),
}

impl AttrValue {
    /// Join the literal members with spaces, dropping bound fragments
    pub fn static_text(&self) -> String {
        match self {
            AttrValue::Empty => String::new(),
            AttrValue::Static(s) => s.clone(),
            AttrValue::Mixed(parts) => parts
                .iter()
                .filter_map(|n| match n {
                    Node::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Body of a section or inverted section
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub expr: Expr,
    pub children: Vec<Node>,
}

impl Section {
    pub fn new(expr: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            expr: Expr::new(expr),
            children,
        }
    }
}

/// Reference to a named partial
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRef {
    pub name: String,
    /// Fallback content rendered when the partial cannot be resolved
    pub children: Vec<Node>,
}

impl PartialRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Explicit closing tag
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingTag {
    /// Address of the frame this tag closes, when the compiler recorded one
    pub id: Option<String>,
    pub tag_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_key() {
        assert_eq!(Expr::new("user.name").key(), "name");
        assert_eq!(Expr::new("title").key(), "title");
        assert_eq!(Expr::new(".").key(), ".");
        assert_eq!(Expr::new("this").key(), ".");
    }

    #[test]
    fn test_static_class_drops_bound_fragments() {
        let value = AttrValue::Mixed(vec![
            Node::text("item"),
            Node::Interpolator(Expr::new("state")),
            Node::text("wide"),
        ]);
        assert_eq!(value.static_text(), "item wide");
    }

    #[test]
    fn test_element_builder() {
        let el = Element::new("li")
            .with_class("item")
            .with_children(vec![Node::text("hi")]);
        assert_eq!(el.static_class().as_deref(), Some("item"));
        assert_eq!(el.children.len(), 1);
        assert!(!el.is_root);
    }
}
