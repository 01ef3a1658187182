//! Renderable tree output

use super::output::{RenderNode, RenderTree};
use super::stack::{OutputTarget, StackBuilder};
use crate::config::RenderConfig;

/// Builder producing a tree of [`RenderNode`]s, widgets left in place as placeholders
pub type TreeBuilder = StackBuilder<TreeTarget>;

impl TreeBuilder {
    pub fn tree(config: &RenderConfig) -> Self {
        StackBuilder::new(TreeTarget, config)
    }
}

/// Keeps normalized frames as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeTarget;

impl OutputTarget for TreeTarget {
    type Output = RenderTree;

    fn single(&mut self, node: RenderNode) -> RenderTree {
        RenderTree::Single(node)
    }

    fn process_array_output(&mut self, nodes: Vec<RenderNode>) -> RenderTree {
        RenderTree::Many(nodes)
    }
}
