//! Components, child registries and widget placeholders
//!
//! Component lifecycle is owned by the host. Templates only ever hold weak links
//! to the component they are bound to.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use crate::builder::RenderTree;
use crate::dom::Fragment;
use crate::template::Template;

/// Shared handle to a component
pub type ComponentRef = Arc<dyn Component>;

/// A host-side component that can own a view and child components
pub trait Component: Send + Sync + fmt::Debug {
    /// Human-readable name, used in diagnostics and tree output
    fn name(&self) -> &str;

    /// Owning component, `None` for a top-level component
    fn parent(&self) -> Option<ComponentRef> {
        None
    }

    /// Child components keyed by class selector, in registration order
    fn children(&self) -> ChildComponents {
        ChildComponents::new()
    }

    /// Tag name of the element this component mounts into
    fn mount_tag_name(&self) -> &str {
        "div"
    }

    /// Data the component renders with
    fn data(&self) -> Value {
        Value::Null
    }

    /// The view attached to this component, if any
    fn view(&self) -> Option<Template> {
        None
    }
}

/// Ordered map from selector name to child component
#[derive(Debug, Clone, Default)]
pub struct ChildComponents {
    entries: IndexMap<String, ComponentRef>,
}

impl ChildComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a child; re-registering a selector keeps its original position
    pub fn insert(&mut self, selector: impl Into<String>, child: ComponentRef) {
        self.entries.insert(selector.into(), child);
    }

    pub fn with(mut self, selector: impl Into<String>, child: ComponentRef) -> Self {
        self.insert(selector, child);
        self
    }

    pub fn get(&self, selector: &str) -> Option<&ComponentRef> {
        self.entries.get(selector)
    }

    /// Selector names in registration order
    pub fn selectors(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Placeholder for the point where a child component's own rendering takes over
#[derive(Debug, Clone)]
pub struct Widget {
    /// How the child's output is produced in place of the placeholder
    pub wrapper: Arc<dyn WidgetWrapper>,
    pub child: ComponentRef,
    /// The subtree the widget replaced
    pub template: Template,
}

impl Widget {
    /// The child's attached view, or the replaced subtree when it has none
    pub fn view(&self) -> Template {
        self.child.view().unwrap_or_else(|| self.template.clone())
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        same_object(&self.child, &other.child)
            && same_object(&self.wrapper, &other.wrapper)
            && self.template.graph() == other.template.graph()
    }
}

fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Produces a child component's output wherever one of its widgets is rendered
pub trait WidgetWrapper: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn render_markup(&self, widget: &Widget) -> String {
        widget.view().to_outer_html(&widget.child.data())
    }

    fn render_tree(&self, widget: &Widget) -> RenderTree {
        widget.view().to_tree(&widget.child.data())
    }

    fn render_fragment(&self, widget: &Widget) -> Fragment {
        widget.view().to_fragment(&widget.child.data())
    }
}

/// Default wrapper: renders the child's view against the child's data
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentWidget;

impl WidgetWrapper for ComponentWidget {
    fn name(&self) -> &str {
        "ComponentWidget"
    }
}

/// A simple data-backed component
#[derive(Debug)]
pub struct View {
    name: String,
    mount_tag: String,
    data: RwLock<Value>,
    parent: RwLock<Option<Weak<dyn Component>>>,
    children: RwLock<ChildComponents>,
    view: RwLock<Option<Template>>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_tag: "div".to_string(),
            data: RwLock::new(Value::Null),
            parent: RwLock::new(None),
            children: RwLock::new(ChildComponents::new()),
            view: RwLock::new(None),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.mount_tag = tag.into();
        self
    }

    pub fn with_data(self, data: Value) -> Self {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
        self
    }

    pub fn into_ref(self) -> Arc<View> {
        Arc::new(self)
    }

    pub fn set_data(&self, data: Value) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// Register `child` under `selector` and make this view its parent
    pub fn add_child(self: &Arc<Self>, selector: impl Into<String>, child: Arc<View>) {
        let parent: Weak<dyn Component> = Arc::downgrade(self) as Weak<dyn Component>;
        *child.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector, child);
    }

    /// Attach `template` to this view with the default widget wrapper
    pub fn attach(self: &Arc<Self>, template: &Template) -> Template {
        self.attach_with(template, Arc::new(ComponentWidget))
    }

    pub fn attach_with(self: &Arc<Self>, template: &Template, wrapper: Arc<dyn WidgetWrapper>) -> Template {
        let component: ComponentRef = self.clone();
        let view = template.attach_view(&component, wrapper);
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = Some(view.clone());
        view
    }
}

impl Component for View {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<ComponentRef> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn children(&self) -> ChildComponents {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mount_tag_name(&self) -> &str {
        &self.mount_tag
    }

    fn data(&self) -> Value {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn view(&self) -> Option<Template> {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_registry_keeps_registration_order() {
        let a: ComponentRef = Arc::new(View::new("a"));
        let b: ComponentRef = Arc::new(View::new("b"));
        let mut children = ChildComponents::new().with("first", a.clone()).with("second", b);
        children.insert("first", a);

        let order: Vec<&str> = children.selectors().collect();
        assert_eq!(order, vec!["first", "second"]);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_add_child_sets_parent() {
        let parent = View::new("list").into_ref();
        let child = View::new("item").with_data(json!({"n": 1})).into_ref();
        parent.add_child("item", child.clone());

        let linked = child.parent().expect("parent should be set");
        assert_eq!(linked.name(), "list");
        assert!(parent.parent().is_none());
        assert_eq!(parent.children().get("item").unwrap().data(), json!({"n": 1}));
    }

    #[test]
    fn test_parent_link_is_weak() {
        let child = View::new("item").into_ref();
        {
            let parent = View::new("list").into_ref();
            parent.add_child("item", child.clone());
        }
        assert!(child.parent().is_none());
    }
}
