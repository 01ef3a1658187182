//! Partial definitions and the registries they are resolved from

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;

use super::Template;
use crate::graph::Graph;

/// A stored partial: a bare graph, or a template carrying its own partials
#[derive(Debug, Clone)]
pub enum PartialDef {
    Graph(Arc<Graph>),
    Template(Template),
}

impl PartialDef {
    pub fn graph(&self) -> &Graph {
        match self {
            PartialDef::Graph(graph) => graph,
            PartialDef::Template(template) => template.graph(),
        }
    }
}

impl From<Graph> for PartialDef {
    fn from(graph: Graph) -> Self {
        PartialDef::Graph(Arc::new(graph))
    }
}

impl From<Template> for PartialDef {
    fn from(template: Template) -> Self {
        PartialDef::Template(template)
    }
}

/// Partials local to one template
#[derive(Debug, Clone, Default)]
pub struct Partials {
    entries: Arc<IndexMap<String, PartialDef>>,
}

impl Partials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with `name` bound to `def`
    pub fn with(&self, name: impl Into<String>, def: impl Into<PartialDef>) -> Self {
        let mut entries = self.entries.clone();
        Arc::make_mut(&mut entries).insert(name.into(), def.into());
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&PartialDef> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Graph)> for Partials {
    fn from_iter<I: IntoIterator<Item = (String, Graph)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(
                iter.into_iter()
                    .map(|(name, graph)| (name, PartialDef::from(graph)))
                    .collect(),
            ),
        }
    }
}

/// Named partials shared across templates
#[derive(Debug, Default)]
pub struct PartialRegistry {
    entries: RwLock<HashMap<String, PartialDef>>,
}

impl PartialRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<PartialRegistry> {
        static GLOBAL: OnceLock<Arc<PartialRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(PartialRegistry::new())).clone()
    }

    /// Register a partial, replacing any previous definition of `name`
    pub fn register(&self, name: impl Into<String>, def: impl Into<PartialDef>) {
        let name = name.into();
        tracing::debug!(partial = %name, "registering partial");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, def.into());
    }

    pub fn get(&self, name: &str) -> Option<PartialDef> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Remove every registered partial
    pub fn reset(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// A partial ready to interpret: its graph and the partials it resolves against
#[derive(Debug, Clone)]
pub struct ResolvedPartial {
    pub graph: Arc<Graph>,
    pub partials: Partials,
}

/// Look `name` up in the local partials first, then in the registry
pub fn resolve(name: &str, local: &Partials, registry: &PartialRegistry) -> Option<ResolvedPartial> {
    let def = match local.get(name) {
        Some(def) => def.clone(),
        None => registry.get(name)?,
    };
    Some(match def {
        PartialDef::Graph(graph) => ResolvedPartial {
            graph,
            partials: Partials::new(),
        },
        PartialDef::Template(template) => ResolvedPartial {
            graph: template.graph_ref(),
            partials: template.partials().clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn test_local_partials_shadow_registry() {
        let registry = PartialRegistry::new();
        registry.register("row", vec![Node::text("global")]);
        let local = Partials::new().with("row", vec![Node::text("local")]);

        let resolved = resolve("row", &local, &registry).unwrap();
        assert_eq!(*resolved.graph, vec![Node::text("local")]);

        let resolved = resolve("row", &Partials::new(), &registry).unwrap();
        assert_eq!(*resolved.graph, vec![Node::text("global")]);
    }

    #[test]
    fn test_missing_partial() {
        let registry = PartialRegistry::new();
        assert!(resolve("nope", &Partials::new(), &registry).is_none());
    }

    #[test]
    fn test_template_partial_carries_its_partials() {
        let inner = Template::new(vec![Node::text("body")])
            .with_partials(Partials::new().with("nested", vec![Node::text("n")]));
        let registry = PartialRegistry::new();
        registry.register("outer", inner);

        let resolved = resolve("outer", &Partials::new(), &registry).unwrap();
        assert!(resolved.partials.get("nested").is_some());
    }

    #[test]
    fn test_register_replaces_and_reset_clears() {
        let registry = PartialRegistry::new();
        registry.register("b", vec![Node::text("1")]);
        registry.register("a", vec![Node::text("2")]);
        registry.register("b", vec![Node::text("3")]);
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.get("b").unwrap().graph(), &vec![Node::text("3")]);

        registry.reset();
        assert!(!registry.contains("a"));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_partials_with_is_copy_on_write() {
        let base = Partials::new().with("a", vec![Node::text("a")]);
        let extended = base.with("b", vec![Node::text("b")]);
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }
}
