//! Graph interpreter
//!
//! Walks a template graph against a [`DataContext`] and drives a [`Builder`]. The
//! interpreter is the only place that knows node semantics; builders only see
//! frames and leaves.

use crate::builder::{Builder, CloseRequest, FrameKind, RenderNode};
use crate::component::ComponentRef;
use crate::config::RenderConfig;
use crate::context::{DataContext, SectionValue};
use crate::diagnostics::{Warning, WarningKind};
use crate::graph::{AttrValue, Attribute, Element, Node, PartialRef, Section};
use crate::template::{resolve, Partials, PartialRegistry};

/// Drives a builder from a graph
pub struct Interpreter<'a> {
    registry: &'a PartialRegistry,
    config: &'a RenderConfig,
    owner: Option<&'a ComponentRef>,
}

impl<'a> Interpreter<'a> {
    pub fn new(registry: &'a PartialRegistry, config: &'a RenderConfig) -> Self {
        Self {
            registry,
            config,
            owner: None,
        }
    }

    /// Component the graph is rendered on behalf of
    pub fn with_owner(mut self, owner: Option<&'a ComponentRef>) -> Self {
        self.owner = owner;
        self
    }

    /// Interpret `nodes` in order, leaving the builder ready for `get_output`
    pub fn interpret<B: Builder>(
        &self,
        builder: &mut B,
        nodes: &[Node],
        ctx: &mut dyn DataContext,
        partials: &Partials,
    ) {
        let _span = tracing::debug_span!(
            "interpret",
            owner = self.owner.map(|c| c.name()),
            nodes = nodes.len()
        )
        .entered();
        self.interpret_nodes(builder, nodes, ctx, partials, 0);
    }

    fn interpret_nodes<B: Builder>(
        &self,
        builder: &mut B,
        nodes: &[Node],
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        for node in nodes {
            self.interpret_node(builder, node, ctx, partials, depth);
        }
    }

    fn interpret_node<B: Builder>(
        &self,
        builder: &mut B,
        node: &Node,
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        match node {
            Node::Text(s) => builder.create_object(RenderNode::Text(s.clone())),
            Node::Element(el) => self.interpret_element(builder, el, ctx, partials, depth),
            Node::Interpolator(expr) | Node::Reference(expr) => {
                builder.create_object(RenderNode::Text(ctx.text(expr)))
            }
            Node::Triple(expr) => builder.create_object(RenderNode::Raw(ctx.text(expr))),
            Node::Section(section) => {
                self.interpret_section(builder, section, false, ctx, partials, depth)
            }
            Node::SectionUnless(section) => {
                self.interpret_section(builder, section, true, ctx, partials, depth)
            }
            Node::Partial(partial) => self.interpret_partial(builder, partial, ctx, partials, depth),
            Node::Comment(text) => builder.create_comment(text),
            Node::ClosingTag(tag) => {
                builder.close_element(CloseRequest::tag(tag.id.clone(), tag.tag_name.as_str()))
            }
            Node::Widget(widget) => builder.create_object(RenderNode::Widget(widget.clone())),
        }
    }

    fn interpret_element<B: Builder>(
        &self,
        builder: &mut B,
        el: &Element,
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        let handle = builder.open_element(FrameKind::Element, &el.tag_name);
        for attr in &el.attributes {
            self.interpret_attribute(builder, attr, ctx, partials, depth);
        }
        self.interpret_nodes(builder, &el.children, ctx, partials, depth);
        builder.close_element(handle);
    }

    fn interpret_attribute<B: Builder>(
        &self,
        builder: &mut B,
        attr: &Attribute,
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        let handle = builder.open_element(FrameKind::Attribute, &attr.name);
        match &attr.value {
            AttrValue::Empty => {}
            AttrValue::Static(value) => builder.create_object(RenderNode::Text(value.clone())),
            AttrValue::Mixed(parts) => self.interpret_nodes(builder, parts, ctx, partials, depth),
        }
        builder.close_element(handle);
    }

    fn interpret_section<B: Builder>(
        &self,
        builder: &mut B,
        section: &Section,
        inverted: bool,
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        let handle = builder.open_element(FrameKind::Section, section.expr.as_str());
        let value = ctx.section(&section.expr);
        if inverted {
            if value == SectionValue::Skip {
                self.interpret_nodes(builder, &section.children, ctx, partials, depth);
            }
        } else {
            match value {
                SectionValue::Skip => {}
                SectionValue::Once => {
                    self.interpret_nodes(builder, &section.children, ctx, partials, depth)
                }
                SectionValue::Scoped(scope) => {
                    ctx.push_scope(scope, None);
                    self.interpret_nodes(builder, &section.children, ctx, partials, depth);
                    ctx.pop_scope();
                }
                SectionValue::Iterate(items) => {
                    for (index, item) in items.into_iter().enumerate() {
                        ctx.push_scope(item, Some(index));
                        self.interpret_nodes(builder, &section.children, ctx, partials, depth);
                        ctx.pop_scope();
                    }
                }
            }
        }
        builder.close_element(handle);
    }

    fn interpret_partial<B: Builder>(
        &self,
        builder: &mut B,
        partial: &PartialRef,
        ctx: &mut dyn DataContext,
        partials: &Partials,
        depth: usize,
    ) {
        if depth >= self.config.max_partial_depth {
            self.config.diagnostics.warn(Warning::new(
                WarningKind::PartialCycle,
                format!(
                    "partial '{}' exceeds the nesting limit of {}",
                    partial.name, self.config.max_partial_depth
                ),
            ));
            return;
        }

        match resolve(&partial.name, partials, self.registry) {
            Some(resolved) => {
                let handle = builder.open_element(FrameKind::Partial, &partial.name);
                self.interpret_nodes(builder, &resolved.graph, ctx, &resolved.partials, depth + 1);
                builder.close_element(handle);
            }
            None => {
                self.config.diagnostics.warn(Warning::new(
                    WarningKind::UnresolvedPartial,
                    format!("partial '{}' is not registered", partial.name),
                ));
                self.interpret_nodes(builder, &partial.children, ctx, partials, depth);
            }
        }
    }
}
