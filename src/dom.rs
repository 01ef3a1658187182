//! Materialized output fragments
//!
//! A [`Fragment`] is the concrete, host-facing form of a render: owned element, text
//! and comment nodes that can be inserted into a real document. [`Materializer`]
//! turns builder output into fragment nodes.

use crate::builder::markup::{escape_attribute, escape_text};
use crate::builder::RenderNode;
use crate::config::{RenderConfig, VOID_ELEMENTS};

/// A concrete output node
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(DomElement),
    Text(String),
    Comment(String),
    /// Unparsed markup inserted verbatim
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomElement {
    pub tag_name: String,
    pub attributes: Vec<(String, Option<String>)>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }
}

impl DomNode {
    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    fn write_html<S: AsRef<str>>(&self, out: &mut String, void_elements: &[S]) {
        match self {
            DomNode::Text(s) => out.push_str(&escape_text(s)),
            DomNode::Markup(s) => out.push_str(s),
            DomNode::Comment(s) => {
                out.push_str("<!--");
                out.push_str(s);
                out.push_str("-->");
            }
            DomNode::Element(el) => {
                out.push('<');
                out.push_str(&el.tag_name);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&escape_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');
                let is_void = void_elements
                    .iter()
                    .any(|v| v.as_ref().eq_ignore_ascii_case(&el.tag_name));
                if el.children.is_empty() && is_void {
                    return;
                }
                for child in &el.children {
                    child.write_html(out, void_elements);
                }
                out.push_str("</");
                out.push_str(&el.tag_name);
                out.push('>');
            }
        }
    }
}

/// An ordered list of top-level output nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub nodes: Vec<DomNode>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-parent the children of a single top-level container onto the fragment,
    /// discarding the container
    pub fn unwrap_container(self) -> Fragment {
        match <[DomNode; 1]>::try_from(self.nodes) {
            Ok([DomNode::Element(container)]) => Fragment {
                nodes: container.children,
            },
            Ok([other]) => Fragment { nodes: vec![other] },
            Err(nodes) => Fragment { nodes },
        }
    }

    /// Serialize with the default void element list
    pub fn to_html(&self) -> String {
        self.write_html(VOID_ELEMENTS)
    }

    /// Serialize with the void elements of `config`
    pub fn to_html_with(&self, config: &RenderConfig) -> String {
        self.write_html(&config.void_elements)
    }

    fn write_html<S: AsRef<str>>(&self, void_elements: &[S]) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out, void_elements);
        }
        out
    }
}

/// Append `node`, concatenating text onto a trailing text node
pub fn push_merged(nodes: &mut Vec<DomNode>, node: DomNode) {
    if let (Some(DomNode::Text(last)), DomNode::Text(s)) = (nodes.last_mut(), &node) {
        last.push_str(s);
        return;
    }
    nodes.push(node);
}

/// Turns builder output into concrete nodes
pub trait Materializer {
    /// Append the concrete form of `node` to `into`
    fn materialize(&mut self, node: &RenderNode, into: &mut Vec<DomNode>);

    /// Signal that a top-level node has been materialized and its resources may be reused
    fn recycle(&mut self, _node: &RenderNode) {}
}

/// Default materializer building owned [`DomNode`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DomMaterializer;

impl Materializer for DomMaterializer {
    fn materialize(&mut self, node: &RenderNode, into: &mut Vec<DomNode>) {
        match node {
            RenderNode::Text(s) => push_merged(into, DomNode::Text(s.clone())),
            RenderNode::Raw(s) => into.push(DomNode::Markup(s.clone())),
            RenderNode::Comment(s) => into.push(DomNode::Comment(s.clone())),
            RenderNode::Element(el) => {
                let mut children = Vec::new();
                for child in el.children.iter().flatten() {
                    self.materialize(child, &mut children);
                }
                into.push(DomNode::Element(DomElement {
                    tag_name: el.tag_name.clone(),
                    attributes: el
                        .attributes
                        .iter()
                        .map(|a| (a.name.clone(), a.value.clone()))
                        .collect(),
                    children,
                }));
            }
            RenderNode::Attribute(_) => {}
            RenderNode::Block(block) => {
                for child in block.children.iter().flatten() {
                    self.materialize(child, into);
                }
            }
            RenderNode::Widget(widget) => {
                for node in widget.wrapper.render_fragment(widget).nodes {
                    push_merged(into, node);
                }
            }
        }
    }
}
