//! Compact JSON wire format for compiled graphs
//!
//! Nodes are objects keyed by short field names with a numeric type tag in `t`;
//! plain text is a bare JSON string:
//!
//! ```json
//! [{"t": 7, "e": "li", "a": {"class": "item"}, "f": ["hi ", {"t": 2, "r": "name"}]}]
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use super::node::{
    AttrValue, Attribute, ClosingTag, Element, Expr, Graph, Node, PartialRef, Section,
};
use crate::error::GraphError;

pub const INTERPOLATOR: u8 = 2;
pub const TRIPLE: u8 = 3;
pub const SECTION: u8 = 4;
pub const SECTION_UNLESS: u8 = 5;
pub const ELEMENT: u8 = 7;
pub const PARTIAL: u8 = 8;
pub const COMMENT: u8 = 9;
pub const CLOSING_TAG: u8 = 14;
pub const REFERENCE: u8 = 30;

/// Section modifier (`n`) marking an inverted section
pub const UNLESS_MODIFIER: u8 = 51;

/// A decoded wire document: the root graph plus any inline partials it carried
#[derive(Debug, Clone, Default)]
pub struct Compiled {
    pub graph: Graph,
    pub partials: IndexMap<String, Graph>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDocument {
    Versioned {
        #[allow(dead_code)]
        v: u32,
        t: Vec<WireItem>,
        #[serde(default)]
        p: IndexMap<String, WireFragment>,
    },
    Many(Vec<WireItem>),
    One(WireItem),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireItem {
    Text(String),
    Node(WireNode),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireFragment {
    Text(String),
    Items(Vec<WireItem>),
}

#[derive(Deserialize)]
struct WireNode {
    t: u8,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    a: Option<IndexMap<String, Option<WireFragment>>>,
    #[serde(default)]
    f: Option<WireFragment>,
    #[serde(default)]
    r: Option<String>,
    #[serde(default)]
    c: Option<String>,
    #[serde(default)]
    i: Option<String>,
    #[serde(default)]
    n: Option<u8>,
}

/// Decode a graph document from JSON text
pub fn from_str(source: &str) -> Result<Compiled, GraphError> {
    let doc: WireDocument = serde_json::from_str(source)?;
    decode_document(doc)
}

/// Decode a graph document from an already-parsed JSON value
pub fn from_value(value: serde_json::Value) -> Result<Compiled, GraphError> {
    let doc: WireDocument = serde_json::from_value(value)?;
    decode_document(doc)
}

/// Read and decode a graph document from a file
pub fn from_file(path: &Path) -> Result<Compiled, GraphError> {
    let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&content)
}

fn decode_document(doc: WireDocument) -> Result<Compiled, GraphError> {
    match doc {
        WireDocument::Versioned { t, p, .. } => {
            let graph = decode_items(t)?;
            let mut partials = IndexMap::new();
            for (name, fragment) in p {
                partials.insert(name, decode_fragment(fragment)?);
            }
            Ok(Compiled { graph, partials })
        }
        WireDocument::Many(items) => Ok(Compiled {
            graph: decode_items(items)?,
            partials: IndexMap::new(),
        }),
        WireDocument::One(item) => Ok(Compiled {
            graph: vec![decode_item(item)?],
            partials: IndexMap::new(),
        }),
    }
}

fn decode_items(items: Vec<WireItem>) -> Result<Vec<Node>, GraphError> {
    items.into_iter().map(decode_item).collect()
}

fn decode_fragment(fragment: WireFragment) -> Result<Vec<Node>, GraphError> {
    match fragment {
        WireFragment::Text(s) => Ok(vec![Node::Text(s)]),
        WireFragment::Items(items) => decode_items(items),
    }
}

fn decode_children(f: Option<WireFragment>) -> Result<Vec<Node>, GraphError> {
    f.map(decode_fragment).transpose().map(Option::unwrap_or_default)
}

fn decode_item(item: WireItem) -> Result<Node, GraphError> {
    match item {
        WireItem::Text(s) => Ok(Node::Text(s)),
        WireItem::Node(node) => decode_node(node),
    }
}

fn require(field: Option<String>, node: &'static str, key: &'static str) -> Result<String, GraphError> {
    field.ok_or(GraphError::MissingField { node, field: key })
}

fn decode_node(node: WireNode) -> Result<Node, GraphError> {
    match node.t {
        ELEMENT => {
            let tag_name = require(node.e, "element", "e")?;
            let mut attributes = Vec::new();
            for (name, value) in node.a.unwrap_or_default() {
                let value = match value {
                    None => AttrValue::Empty,
                    Some(WireFragment::Text(s)) => AttrValue::Static(s),
                    Some(WireFragment::Items(items)) => AttrValue::Mixed(decode_items(items)?),
                };
                attributes.push(Attribute { name, value });
            }
            Ok(Node::Element(Element {
                tag_name,
                attributes,
                children: decode_children(node.f)?,
                is_root: false,
            }))
        }
        INTERPOLATOR => Ok(Node::Interpolator(Expr(require(node.r, "interpolator", "r")?))),
        TRIPLE => Ok(Node::Triple(Expr(require(node.r, "triple", "r")?))),
        REFERENCE => Ok(Node::Reference(Expr(require(node.r, "reference", "r")?))),
        SECTION | SECTION_UNLESS => {
            let section = Section {
                expr: Expr(require(node.r, "section", "r")?),
                children: decode_children(node.f)?,
            };
            if node.t == SECTION_UNLESS || node.n == Some(UNLESS_MODIFIER) {
                Ok(Node::SectionUnless(section))
            } else {
                Ok(Node::Section(section))
            }
        }
        PARTIAL => Ok(Node::Partial(PartialRef {
            name: require(node.r, "partial", "r")?,
            children: decode_children(node.f)?,
        })),
        COMMENT => Ok(Node::Comment(node.c.unwrap_or_default())),
        CLOSING_TAG => Ok(Node::ClosingTag(ClosingTag {
            id: node.i,
            tag_name: require(node.e, "closing tag", "e")?,
        })),
        tag => Err(GraphError::UnknownNodeType { tag }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_single_element() {
        let compiled =
            from_str(r#"{"t": 7, "e": "li", "a": {"class": "item"}, "f": ["hi"]}"#).unwrap();
        assert_eq!(
            compiled.graph,
            vec![Node::Element(
                Element::new("li")
                    .with_class("item")
                    .with_children(vec![Node::text("hi")])
            )]
        );
    }

    #[test]
    fn test_decode_string_fragment() {
        let compiled = from_str(r#"[{"t": 7, "e": "p", "f": "hello"}]"#).unwrap();
        assert_eq!(compiled.graph[0].children(), &[Node::text("hello")]);
    }

    #[test]
    fn test_decode_unless_modifier() {
        let compiled = from_str(r#"[{"t": 4, "n": 51, "r": "items", "f": ["none"]}]"#).unwrap();
        assert!(matches!(compiled.graph[0], Node::SectionUnless(_)));
    }

    #[test]
    fn test_decode_boolean_attribute() {
        let compiled = from_str(r#"{"t": 7, "e": "input", "a": {"disabled": null}}"#).unwrap();
        let el = compiled.graph[0].as_element().unwrap();
        assert_eq!(el.attribute("disabled"), Some(&AttrValue::Empty));
    }

    #[test]
    fn test_unknown_type_tag() {
        let err = from_str(r#"[{"t": 99}]"#).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeType { tag: 99 }));
    }

    #[test]
    fn test_missing_tag_name() {
        let err = from_str(r#"[{"t": 7}]"#).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingField {
                node: "element",
                field: "e"
            }
        ));
    }

    #[test]
    fn test_versioned_envelope_with_partials() {
        let compiled = from_str(
            r#"{"v": 4, "t": [{"t": 8, "r": "header"}], "p": {"header": [{"t": 7, "e": "h1"}]}}"#,
        )
        .unwrap();
        assert_eq!(compiled.graph, vec![Node::Partial(PartialRef::new("header"))]);
        assert_eq!(compiled.partials["header"], vec![Node::from(Element::new("h1"))]);
    }
}
