//! The template facade: a graph plus everything needed to render it

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use serde_json::Value;

use super::attach::attach;
use super::registry::{PartialDef, PartialRegistry, Partials};
use crate::builder::{Builder, FragmentBuilder, MarkupBuilder, RenderTree, TreeBuilder};
use crate::component::{Component, ComponentRef, WidgetWrapper};
use crate::config::RenderConfig;
use crate::context::JsonContext;
use crate::dom::{Fragment, Materializer};
use crate::error::GraphError;
use crate::graph::{wire, Compiled, Element, Graph, Node};
use crate::interpreter::Interpreter;

/// A compiled graph bound to its partials, registry and configuration
#[derive(Clone)]
pub struct Template {
    graph: Arc<Graph>,
    partials: Partials,
    registry: Arc<PartialRegistry>,
    component: Option<Weak<dyn Component>>,
    wrapped: bool,
    config: Arc<RenderConfig>,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("graph", &self.graph)
            .field("partials", &self.partials.names().collect::<Vec<_>>())
            .field("component", &self.component().map(|c| c.name().to_string()))
            .field("wrapped", &self.wrapped)
            .finish()
    }
}

impl Template {
    /// Template over `graph` using the process-wide registry and default configuration
    pub fn new(graph: Graph) -> Self {
        Self::from_parts(
            graph,
            Partials::new(),
            PartialRegistry::global(),
            Arc::new(RenderConfig::default()),
        )
    }

    pub fn from_parts(
        graph: Graph,
        partials: Partials,
        registry: Arc<PartialRegistry>,
        config: Arc<RenderConfig>,
    ) -> Self {
        Self {
            graph: Arc::new(graph),
            partials,
            registry,
            component: None,
            wrapped: false,
            config,
        }
    }

    /// Decode a wire document; inline partials become the template's local partials
    pub fn from_json(source: &str) -> Result<Self, GraphError> {
        Ok(Self::from_compiled(wire::from_str(source)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, GraphError> {
        Ok(Self::from_compiled(wire::from_file(path)?))
    }

    pub fn from_compiled(compiled: Compiled) -> Self {
        Self::new(compiled.graph).with_partials(compiled.partials.into_iter().collect())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn graph_ref(&self) -> Arc<Graph> {
        self.graph.clone()
    }

    pub fn partials(&self) -> &Partials {
        &self.partials
    }

    pub fn registry(&self) -> &Arc<PartialRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Component this template is bound to, while it is still alive
    pub fn component(&self) -> Option<ComponentRef> {
        self.component.as_ref().and_then(Weak::upgrade)
    }

    pub fn with_partials(&self, partials: Partials) -> Self {
        Self {
            partials,
            ..self.clone()
        }
    }

    pub fn with_partial(&self, name: impl Into<String>, def: impl Into<PartialDef>) -> Self {
        self.with_partials(self.partials.with(name, def))
    }

    pub fn with_registry(&self, registry: Arc<PartialRegistry>) -> Self {
        Self {
            registry,
            ..self.clone()
        }
    }

    pub fn with_config(&self, config: RenderConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..self.clone()
        }
    }

    /// Enclose the graph in a single `tag` element
    pub fn wrap(&self, tag: &str) -> Self {
        let container = Element::new(tag).with_children((*self.graph).clone());
        Self {
            graph: Arc::new(vec![Node::Element(container)]),
            wrapped: true,
            ..self.clone()
        }
    }

    /// Wrap with the configured default tag
    pub fn wrap_default(&self) -> Self {
        self.wrap(&self.config.wrap_tag)
    }

    /// Bind a copy of this template to `component`, replacing child placeholders with widgets
    ///
    /// Top-level elements of the copy are marked as roots. A top-level component's
    /// view is also wrapped in its mount tag unless already wrapped.
    pub fn attach_view(&self, component: &ComponentRef, wrapper: Arc<dyn WidgetWrapper>) -> Self {
        let mut graph = (*self.graph).clone();
        for node in &mut graph {
            if let Node::Element(el) = node {
                el.is_root = true;
            }
        }

        let mut wrapped = self.wrapped;
        if component.parent().is_none() && !wrapped {
            let mut container = Element::new(component.mount_tag_name()).with_children(graph);
            container.is_root = true;
            graph = vec![Node::Element(container)];
            wrapped = true;
        }

        let graph = attach(
            component,
            &graph,
            &wrapper,
            &self.partials,
            &self.registry,
            &self.config,
        );
        tracing::debug!(component = component.name(), nodes = graph.len(), "view attached");

        Self {
            graph: Arc::new(graph),
            component: Some(Arc::downgrade(component)),
            wrapped,
            ..self.clone()
        }
    }

    /// Make this template available to every template sharing its registry
    pub fn register(&self, name: impl Into<String>) {
        self.registry.register(name, self.clone());
    }

    fn render<B: Builder>(&self, mut builder: B, nodes: &[Node], data: &Value) -> B::Output {
        let owner = self.component();
        let mut ctx = JsonContext::new(data.clone());
        Interpreter::new(&self.registry, &self.config)
            .with_owner(owner.as_ref())
            .interpret(&mut builder, nodes, &mut ctx, &self.partials);
        builder.get_output()
    }

    /// Render to markup
    ///
    /// A view bound to a nested component renders only the content of its root
    /// element; the parent's widget supplies the element itself.
    pub fn to_html(&self, data: &Value) -> String {
        let nodes: &[Node] = match self.component() {
            Some(component) if component.parent().is_some() => match self.graph.as_slice() {
                [Node::Element(root)] => root.children.as_slice(),
                nodes => nodes,
            },
            _ => self.graph.as_slice(),
        };
        self.render(MarkupBuilder::markup(&self.config), nodes, data)
    }

    /// Render the whole graph to markup, root element included
    pub fn to_outer_html(&self, data: &Value) -> String {
        self.render(MarkupBuilder::markup(&self.config), &self.graph, data)
    }

    pub fn to_tree(&self, data: &Value) -> RenderTree {
        self.render(TreeBuilder::tree(&self.config), &self.graph, data)
    }

    pub fn to_fragment(&self, data: &Value) -> Fragment {
        self.finish_fragment(self.render(FragmentBuilder::fragment(&self.config), &self.graph, data))
    }

    pub fn to_fragment_with(&self, data: &Value, materializer: Box<dyn Materializer>) -> Fragment {
        let builder = FragmentBuilder::with_materializer(&self.config, materializer);
        self.finish_fragment(self.render(builder, &self.graph, data))
    }

    /// A top-level component mounts into an existing container, so the wrapper is dropped
    fn finish_fragment(&self, fragment: Fragment) -> Fragment {
        match self.component() {
            Some(component) if component.parent().is_none() => fragment.unwrap_container(),
            _ => fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::{ComponentWidget, View};
    use crate::graph::Expr;

    fn item_graph() -> Graph {
        vec![Element::new("li")
            .with_class("item")
            .with_children(vec![Node::Interpolator(Expr::new("label"))])
            .into()]
    }

    #[test]
    fn test_unbound_template_renders_graph() {
        let template = Template::new(item_graph());
        assert_eq!(
            template.to_html(&json!({"label": "hi"})),
            r#"<li class="item">hi</li>"#
        );
    }

    #[test]
    fn test_wrap() {
        let template = Template::new(vec![Node::text("a")]).wrap("section");
        assert!(template.is_wrapped());
        assert_eq!(template.to_html(&json!({})), "<section>a</section>");
        assert_eq!(
            Template::new(vec![]).wrap_default().to_html(&json!({})),
            "<div></div>"
        );
    }

    #[test]
    fn test_top_level_view_is_wrapped_in_mount_tag() {
        let view = View::new("app").with_tag("main").into_ref();
        let component: ComponentRef = view.clone();
        let bound = Template::new(vec![Node::text("x")])
            .attach_view(&component, Arc::new(ComponentWidget));

        assert!(bound.is_wrapped());
        assert_eq!(bound.to_html(&json!({})), "<main>x</main>");
        let fragment = bound.to_fragment(&json!({}));
        assert_eq!(fragment.to_html(), "x");
    }

    #[test]
    fn test_nested_view_renders_inner_content() {
        let parent = View::new("list").into_ref();
        let child = View::new("item").into_ref();
        parent.add_child("item", child.clone());

        let bound = child.attach(&Template::new(item_graph()));
        let data = json!({"label": "hi"});
        assert_eq!(bound.to_html(&data), "hi");
        assert_eq!(bound.to_outer_html(&data), r#"<li class="item">hi</li>"#);
        assert!(!bound.is_wrapped());
    }

    #[test]
    fn test_component_link_is_weak() {
        let bound = {
            let view = View::new("app").into_ref();
            view.attach(&Template::new(vec![]))
        };
        assert!(bound.component().is_none());
    }

    #[test]
    fn test_from_json_keeps_inline_partials() {
        let template = Template::from_json(
            r#"{"v": 1, "t": [{"t": 8, "r": "greet"}], "p": {"greet": ["hello"]}}"#,
        )
        .unwrap()
        .with_registry(Arc::new(PartialRegistry::new()));
        assert_eq!(template.to_html(&json!({})), "hello");
    }
}
