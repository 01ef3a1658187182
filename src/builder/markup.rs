//! Markup string output

use super::output::RenderNode;
use super::stack::{OutputTarget, StackBuilder};
use crate::config::RenderConfig;

/// Builder producing a markup string
pub type MarkupBuilder = StackBuilder<MarkupTarget>;

impl MarkupBuilder {
    pub fn markup(config: &RenderConfig) -> Self {
        StackBuilder::new(MarkupTarget::new(config), config)
    }
}

/// Serializes every closed frame to markup as soon as it is finalized
#[derive(Debug, Clone)]
pub struct MarkupTarget {
    void_elements: Vec<String>,
}

impl MarkupTarget {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            void_elements: config.void_elements.clone(),
        }
    }

    fn is_void(&self, tag_name: &str) -> bool {
        self.void_elements
            .iter()
            .any(|v| v.eq_ignore_ascii_case(tag_name))
    }

    /// Serialize a node and everything below it
    pub fn serialize(&self, node: &RenderNode) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: &RenderNode, out: &mut String) {
        match node {
            RenderNode::Text(s) => out.push_str(&escape_text(s)),
            RenderNode::Raw(s) => out.push_str(s),
            RenderNode::Comment(s) => {
                out.push_str("<!--");
                out.push_str(s);
                out.push_str("-->");
            }
            RenderNode::Element(el) => {
                out.push('<');
                out.push_str(&el.tag_name);
                for attr in &el.attributes {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if let Some(value) = &attr.value {
                        out.push_str("=\"");
                        out.push_str(&escape_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');
                match &el.children {
                    None if self.is_void(&el.tag_name) => return,
                    None => {}
                    Some(children) => {
                        for child in children {
                            self.write_node(child, out);
                        }
                    }
                }
                out.push_str("</");
                out.push_str(&el.tag_name);
                out.push('>');
            }
            RenderNode::Attribute(_) => {}
            RenderNode::Block(block) => {
                for child in block.children.iter().flatten() {
                    self.write_node(child, out);
                }
            }
            RenderNode::Widget(widget) => out.push_str(&widget.wrapper.render_markup(widget)),
        }
    }
}

impl OutputTarget for MarkupTarget {
    type Output = String;

    fn leaf(&mut self, node: RenderNode) -> RenderNode {
        match node {
            RenderNode::Text(_) | RenderNode::Raw(_) | RenderNode::Attribute(_) => node,
            other => RenderNode::Raw(self.serialize(&other)),
        }
    }

    /// Blocks stay structured until their parent closes, so an attribute frame
    /// reads their text unescaped
    fn finalize(&mut self, node: RenderNode) -> RenderNode {
        match node {
            RenderNode::Attribute(_) | RenderNode::Block(_) => node,
            other => RenderNode::Raw(self.serialize(&other)),
        }
    }

    fn single(&mut self, node: RenderNode) -> String {
        self.serialize(&node)
    }

    fn process_array_output(&mut self, nodes: Vec<RenderNode>) -> String {
        nodes.iter().map(|n| self.serialize(n)).collect()
    }
}

/// Escape text content
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, FrameKind};

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b"), "a &lt; b");
        assert_eq!(escape_text("a & b"), "a &amp; b");
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_element_with_attribute() {
        let mut b = MarkupBuilder::markup(&RenderConfig::default());
        let li = b.open_element(FrameKind::Element, "li");
        let class = b.open_element(FrameKind::Attribute, "class");
        b.create_object(RenderNode::Text("item".into()));
        b.close_element(class);
        b.create_object(RenderNode::Text("hi".into()));
        b.close_element(li);
        assert_eq!(b.get_output(), r#"<li class="item">hi</li>"#);
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let mut b = MarkupBuilder::markup(&RenderConfig::default());
        let br = b.open_element(FrameKind::Element, "br");
        b.close_element(br);
        let span = b.open_element(FrameKind::Element, "span");
        b.close_element(span);
        assert_eq!(b.get_output(), "<br><span></span>");
    }

    #[test]
    fn test_text_is_escaped_and_raw_is_not() {
        let mut b = MarkupBuilder::markup(&RenderConfig::default());
        b.create_object(RenderNode::Text("1 < 2 ".into()));
        b.create_object(RenderNode::Raw("<em>yes</em>".into()));
        b.create_comment("note");
        assert_eq!(b.get_output(), "1 &lt; 2 <em>yes</em><!--note-->");
    }

    #[test]
    fn test_sections_flatten_into_parent() {
        let mut b = MarkupBuilder::markup(&RenderConfig::default());
        let ul = b.open_element(FrameKind::Element, "ul");
        let section = b.open_element(FrameKind::Section, "items");
        for item in ["a", "b"] {
            let li = b.open_element(FrameKind::Element, "li");
            b.create_object(RenderNode::Text(item.into()));
            b.close_element(li);
        }
        b.close_element(section);
        b.close_element(ul);
        assert_eq!(b.get_output(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_section_inside_attribute_is_escaped_once() {
        let mut b = MarkupBuilder::markup(&RenderConfig::default());
        let a = b.open_element(FrameKind::Element, "a");
        let title = b.open_element(FrameKind::Attribute, "title");
        let section = b.open_element(FrameKind::Section, "x");
        b.create_object(RenderNode::Text("a&b <c>".into()));
        b.close_element(section);
        b.close_element(title);
        b.close_element(a);
        assert_eq!(b.get_output(), r#"<a title="a&amp;b &lt;c&gt;"></a>"#);
    }
}
