//! Attachment pass: swap child-component placeholders into a graph
//!
//! Elements whose static class names a registered child selector become
//! [`Widget`] nodes. Partials are expanded inline so widgets inside them are found
//! too. The input graph is never modified.

use std::sync::Arc;

use super::registry::{resolve, PartialRegistry, Partials};
use super::Template;
use crate::component::{ChildComponents, ComponentRef, Widget, WidgetWrapper};
use crate::config::RenderConfig;
use crate::diagnostics::{Warning, WarningKind};
use crate::graph::{Element, Graph, Node, PartialRef, Section};

/// Result of attaching a single node
enum Attached {
    One(Node),
    Many(Vec<Node>),
    Absent,
}

struct Selector {
    name: String,
    /// Selector padded with spaces for whole-word matching
    padded: String,
}

/// State for one attachment call
pub struct Attachment<'a> {
    wrapper: &'a Arc<dyn WidgetWrapper>,
    registry: &'a Arc<PartialRegistry>,
    config: &'a Arc<RenderConfig>,
    children: ChildComponents,
    selectors: Vec<Selector>,
    resolving: Vec<String>,
}

impl<'a> Attachment<'a> {
    pub fn new(
        component: &ComponentRef,
        wrapper: &'a Arc<dyn WidgetWrapper>,
        registry: &'a Arc<PartialRegistry>,
        config: &'a Arc<RenderConfig>,
    ) -> Self {
        let children = component.children();
        let selectors = children
            .selectors()
            .map(|name| Selector {
                name: name.to_string(),
                padded: format!(" {} ", name),
            })
            .collect();
        Self {
            wrapper,
            registry,
            config,
            children,
            selectors,
            resolving: Vec::new(),
        }
    }

    /// Attach every node, flattening expanded partials into the sequence
    pub fn attach_nodes(&mut self, nodes: &[Node], partials: &Partials) -> Graph {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.attach_node(node, partials) {
                Attached::One(node) => out.push(node),
                Attached::Many(nodes) => out.extend(nodes),
                Attached::Absent => {}
            }
        }
        out
    }

    fn attach_node(&mut self, node: &Node, partials: &Partials) -> Attached {
        match node {
            Node::Element(el) => self.attach_element(el, partials),
            Node::Section(section) => Attached::One(Node::Section(self.attach_section(section, partials))),
            Node::SectionUnless(section) => {
                Attached::One(Node::SectionUnless(self.attach_section(section, partials)))
            }
            Node::Partial(partial) => self.attach_partial(partial, partials),
            other => Attached::One(other.clone()),
        }
    }

    fn attach_element(&mut self, el: &Element, partials: &Partials) -> Attached {
        if !el.is_root {
            if let Some(child) = self.match_child(el) {
                tracing::debug!(tag = %el.tag_name, child = child.name(), "element replaced by widget");
                let template = Template::from_parts(
                    vec![Node::Element(el.clone())],
                    partials.clone(),
                    self.registry.clone(),
                    self.config.clone(),
                );
                return Attached::One(Node::Widget(Widget {
                    wrapper: self.wrapper.clone(),
                    child,
                    template,
                }));
            }
        }

        Attached::One(Node::Element(Element {
            tag_name: el.tag_name.clone(),
            attributes: el.attributes.clone(),
            children: self.attach_nodes(&el.children, partials),
            is_root: el.is_root,
        }))
    }

    /// Child registered under the last-registered selector the element's class contains
    fn match_child(&self, el: &Element) -> Option<ComponentRef> {
        if self.selectors.is_empty() {
            return None;
        }
        let class = el.static_class()?;
        let padded = format!(" {} ", class.split_whitespace().collect::<Vec<_>>().join(" "));
        self.selectors
            .iter()
            .rev()
            .find(|selector| padded.contains(&selector.padded))
            .and_then(|selector| self.children.get(&selector.name))
            .cloned()
    }

    fn attach_section(&mut self, section: &Section, partials: &Partials) -> Section {
        Section {
            expr: section.expr.clone(),
            children: self.attach_nodes(&section.children, partials),
        }
    }

    fn attach_partial(&mut self, partial: &PartialRef, partials: &Partials) -> Attached {
        if self.resolving.iter().any(|name| *name == partial.name) {
            self.config.diagnostics.warn(Warning::new(
                WarningKind::PartialCycle,
                format!(
                    "partial cycle: {} -> {}",
                    self.resolving.join(" -> "),
                    partial.name
                ),
            ));
            return Attached::Absent;
        }

        let Some(resolved) = resolve(&partial.name, partials, self.registry) else {
            self.config.diagnostics.warn(Warning::new(
                WarningKind::UnresolvedPartial,
                format!("partial '{}' is not registered", partial.name),
            ));
            return if partial.children.is_empty() {
                Attached::Absent
            } else {
                Attached::Many(self.attach_nodes(&partial.children, partials))
            };
        };

        self.resolving.push(partial.name.clone());
        let nodes = self.attach_nodes(&resolved.graph, &resolved.partials);
        self.resolving.pop();
        Attached::Many(nodes)
    }
}

/// Replace child-component placeholders in `nodes`, returning a new graph
pub fn attach(
    component: &ComponentRef,
    nodes: &[Node],
    wrapper: &Arc<dyn WidgetWrapper>,
    partials: &Partials,
    registry: &Arc<PartialRegistry>,
    config: &Arc<RenderConfig>,
) -> Graph {
    Attachment::new(component, wrapper, registry, config).attach_nodes(nodes, partials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentWidget, View};
    use crate::diagnostics::CollectingDiagnostics;

    struct Fixture {
        parent: Arc<View>,
        wrapper: Arc<dyn WidgetWrapper>,
        registry: Arc<PartialRegistry>,
        config: Arc<RenderConfig>,
        diagnostics: Arc<CollectingDiagnostics>,
    }

    impl Fixture {
        fn new() -> Self {
            let diagnostics = Arc::new(CollectingDiagnostics::new());
            Self {
                parent: View::new("list").into_ref(),
                wrapper: Arc::new(ComponentWidget),
                registry: Arc::new(PartialRegistry::new()),
                config: Arc::new(RenderConfig::default().with_diagnostics(diagnostics.clone())),
                diagnostics,
            }
        }

        fn attach(&self, nodes: &[Node], partials: &Partials) -> Graph {
            let component: ComponentRef = self.parent.clone();
            attach(&component, nodes, &self.wrapper, partials, &self.registry, &self.config)
        }
    }

    fn widget_child(node: &Node) -> &str {
        match node {
            Node::Widget(widget) => widget.child.name(),
            other => panic!("expected widget, got {:?}", other),
        }
    }

    #[test]
    fn test_class_match_becomes_widget() {
        let fx = Fixture::new();
        fx.parent.add_child("item", View::new("item").into_ref());
        let nodes = vec![Element::new("ul")
            .with_children(vec![
                Element::new("li").with_class("item").into(),
                Element::new("li").with_class("items").into(),
            ])
            .into()];

        let graph = fx.attach(&nodes, &Partials::new());
        let ul = graph[0].as_element().unwrap();
        assert_eq!(widget_child(&ul.children[0]), "item");
        assert!(matches!(ul.children[1], Node::Element(_)));
    }

    #[test]
    fn test_root_elements_are_never_replaced() {
        let fx = Fixture::new();
        fx.parent.add_child("item", View::new("item").into_ref());
        let mut root = Element::new("li").with_class("item");
        root.is_root = true;

        let graph = fx.attach(&[root.into()], &Partials::new());
        assert!(matches!(graph[0], Node::Element(_)));
    }

    #[test]
    fn test_sections_are_traversed() {
        let fx = Fixture::new();
        fx.parent.add_child("row", View::new("row").into_ref());
        let nodes = vec![Node::Section(Section::new(
            "rows",
            vec![Element::new("tr").with_class("row").into()],
        ))];

        let graph = fx.attach(&nodes, &Partials::new());
        match &graph[0] {
            Node::Section(section) => assert_eq!(widget_child(&section.children[0]), "row"),
            other => panic!("expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_is_expanded_inline() {
        let fx = Fixture::new();
        fx.parent.add_child("item", View::new("item").into_ref());
        let partials = Partials::new().with(
            "entry",
            vec![Node::text("a"), Element::new("li").with_class("item").into()],
        );

        let graph = fx.attach(&[Node::Partial(PartialRef::new("entry"))], &partials);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0], Node::text("a"));
        assert_eq!(widget_child(&graph[1]), "item");
    }

    #[test]
    fn test_partial_cycle_is_reported_once() {
        let fx = Fixture::new();
        fx.registry
            .register("a", vec![Node::Partial(PartialRef::new("b"))]);
        fx.registry
            .register("b", vec![Node::text("b"), Node::Partial(PartialRef::new("a"))]);

        let graph = fx.attach(&[Node::Partial(PartialRef::new("a"))], &Partials::new());
        assert_eq!(graph, vec![Node::text("b")]);
        assert_eq!(fx.diagnostics.of_kind(WarningKind::PartialCycle).len(), 1);
    }

    #[test]
    fn test_input_graph_is_untouched() {
        let fx = Fixture::new();
        fx.parent.add_child("item", View::new("item").into_ref());
        let nodes = vec![Element::new("li").with_class("item").into()];
        let before = nodes.clone();

        let _ = fx.attach(&nodes, &Partials::new());
        assert_eq!(nodes, before);
    }
}
