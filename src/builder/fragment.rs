//! Materialized fragment output

use super::output::RenderNode;
use super::stack::{OutputTarget, StackBuilder};
use crate::config::RenderConfig;
use crate::dom::{DomMaterializer, Fragment, Materializer};

/// Builder producing a materialized [`Fragment`]
pub type FragmentBuilder = StackBuilder<FragmentTarget>;

impl FragmentBuilder {
    pub fn fragment(config: &RenderConfig) -> Self {
        Self::with_materializer(config, Box::new(DomMaterializer))
    }

    pub fn with_materializer(config: &RenderConfig, materializer: Box<dyn Materializer>) -> Self {
        StackBuilder::new(FragmentTarget { materializer }, config)
    }
}

/// Keeps the tree shape while building and materializes a container at output time
pub struct FragmentTarget {
    materializer: Box<dyn Materializer>,
}

impl OutputTarget for FragmentTarget {
    type Output = Fragment;

    fn single(&mut self, node: RenderNode) -> Fragment {
        self.process_array_output(vec![node])
    }

    fn process_array_output(&mut self, nodes: Vec<RenderNode>) -> Fragment {
        let mut fragment = Fragment::new();
        for node in &nodes {
            self.materializer.materialize(node, &mut fragment.nodes);
            self.materializer.recycle(node);
        }
        fragment
    }
}
