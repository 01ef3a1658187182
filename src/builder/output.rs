//! Canonical output node shapes
//!
//! Builders finalize their open frames into [`RenderNode`] values. Empty child lists are
//! never materialized: an element without children carries `children: None`.

use serde_json::{json, Map, Value};

use crate::component::Widget;

/// A finalized piece of builder output
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    /// Plain, unescaped text
    Text(String),
    /// Already-serialized markup
    Raw(String),
    Comment(String),
    Element(RenderElement),
    /// Finalized attribute, routed into its element's attribute slot
    Attribute(RenderAttribute),
    /// Finalized section or partial frame
    Block(RenderBlock),
    /// Child component placeholder
    Widget(Widget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderElement {
    pub tag_name: String,
    pub attributes: Vec<RenderAttribute>,
    pub children: Option<Vec<RenderNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderAttribute {
    pub name: String,
    /// `None` for valueless attributes
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Section,
    Partial(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub kind: BlockKind,
    pub children: Option<Vec<RenderNode>>,
}

impl RenderNode {
    /// Whether this is a plain-text entry eligible for merging
    pub fn is_text(&self) -> bool {
        matches!(self, RenderNode::Text(_))
    }

    /// Concatenated text content, descending into blocks and elements
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text(s) | RenderNode::Raw(s) => out.push_str(s),
            RenderNode::Element(RenderElement {
                children: Some(children),
                ..
            })
            | RenderNode::Block(RenderBlock {
                children: Some(children),
                ..
            }) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            _ => {}
        }
    }

    /// JSON view of the node, for inspection and the CLI
    pub fn to_json(&self) -> Value {
        match self {
            RenderNode::Text(s) => json!({ "type": "text", "text": s }),
            RenderNode::Raw(s) => json!({ "type": "raw", "html": s }),
            RenderNode::Comment(s) => json!({ "type": "comment", "text": s }),
            RenderNode::Element(el) => {
                let mut obj = Map::new();
                obj.insert("type".into(), json!("element"));
                obj.insert("tagName".into(), json!(el.tag_name));
                let attributes: Map<String, Value> = el
                    .attributes
                    .iter()
                    .map(|a| {
                        let value = a.value.clone().map(Value::String).unwrap_or(Value::Bool(true));
                        (a.name.clone(), value)
                    })
                    .collect();
                obj.insert("attributes".into(), Value::Object(attributes));
                if let Some(children) = &el.children {
                    obj.insert("children".into(), children_json(children));
                }
                Value::Object(obj)
            }
            RenderNode::Attribute(a) => json!({ "type": "attribute", "name": a.name, "value": a.value }),
            RenderNode::Block(block) => {
                let mut obj = Map::new();
                match &block.kind {
                    BlockKind::Section => {
                        obj.insert("type".into(), json!("section"));
                    }
                    BlockKind::Partial(name) => {
                        obj.insert("type".into(), json!("partial"));
                        obj.insert("name".into(), json!(name));
                    }
                }
                if let Some(children) = &block.children {
                    obj.insert("children".into(), children_json(children));
                }
                Value::Object(obj)
            }
            RenderNode::Widget(widget) => json!({
                "type": "widget",
                "constructor": widget.wrapper.name(),
                "component": widget.child.name(),
            }),
        }
    }
}

fn children_json(children: &[RenderNode]) -> Value {
    Value::Array(children.iter().map(RenderNode::to_json).collect())
}

/// Append `node` to `nodes`, concatenating it onto a trailing entry of the same text kind
pub fn push_merged(nodes: &mut Vec<RenderNode>, node: RenderNode) {
    if let (Some(RenderNode::Text(last)), RenderNode::Text(s))
    | (Some(RenderNode::Raw(last)), RenderNode::Raw(s)) = (nodes.last_mut(), &node)
    {
        last.push_str(s);
        return;
    }
    nodes.push(node);
}

/// `None` for an empty list, so normalized nodes never carry empty collections
pub fn non_empty(nodes: Vec<RenderNode>) -> Option<Vec<RenderNode>> {
    if nodes.is_empty() {
        None
    } else {
        Some(nodes)
    }
}

/// Result of a tree-target render
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTree {
    /// Exactly one top-level node
    Single(RenderNode),
    /// Zero or several top-level nodes
    Many(Vec<RenderNode>),
}

impl RenderTree {
    pub fn into_nodes(self) -> Vec<RenderNode> {
        match self {
            RenderTree::Single(node) => vec![node],
            RenderTree::Many(nodes) => nodes,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            RenderTree::Single(node) => node.to_json(),
            RenderTree::Many(nodes) => children_json(nodes),
        }
    }
}
