//! Builders: stateful sinks the interpreter drives
//!
//! Every builder implements the same [`Builder`] contract, so the interpreter never
//! needs to know which output it is producing. The open-element stack, address
//! pairing and mismatch recovery live in [`StackBuilder`]; an [`OutputTarget`]
//! decides how finalized frames are encoded.

pub mod fragment;
pub mod markup;
pub mod output;
pub mod stack;
pub mod tree;

use std::fmt;

pub use fragment::{FragmentBuilder, FragmentTarget};
pub use markup::{MarkupBuilder, MarkupTarget};
pub use output::{
    BlockKind, RenderAttribute, RenderBlock, RenderElement, RenderNode, RenderTree,
};
pub use stack::{OutputTarget, StackBuilder};
pub use tree::{TreeBuilder, TreeTarget};

/// Kind of frame pushed onto the open-element stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Element,
    Attribute,
    Section,
    Partial,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Element => write!(f, "element"),
            FrameKind::Attribute => write!(f, "attribute"),
            FrameKind::Section => write!(f, "section"),
            FrameKind::Partial => write!(f, "partial"),
        }
    }
}

/// Handle returned by [`Builder::open_element`] and consumed by [`Builder::close_element`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest {
    /// Address recorded at open time; `None` when the closing tag carried no address
    pub address: Option<String>,
    pub kind: FrameKind,
    /// Tag name, attribute name, partial name or section expression
    pub name: String,
    /// Set for closing tags found in the graph, whose element still closes its own handle later
    pub explicit: bool,
}

impl CloseRequest {
    /// Close request for a closing tag found in the graph
    pub fn tag(address: Option<String>, tag_name: impl Into<String>) -> Self {
        Self {
            address,
            kind: FrameKind::Element,
            name: tag_name.into(),
            explicit: true,
        }
    }

    pub fn is_tag(&self, tag_name: &str) -> bool {
        self.kind == FrameKind::Element && self.name.eq_ignore_ascii_case(tag_name)
    }
}

/// The interpretation sink contract
pub trait Builder {
    type Output;

    /// Push a frame and return the handle that closes it
    fn open_element(&mut self, kind: FrameKind, value: &str) -> CloseRequest;

    /// Place a leaf or already-closed subtree
    fn create_object(&mut self, node: RenderNode);

    fn create_comment(&mut self, text: &str) {
        self.create_object(RenderNode::Comment(text.to_string()));
    }

    /// Pop the frame matching `request`, recovering from mismatches
    fn close_element(&mut self, request: CloseRequest);

    /// Close anything still open and hand back the accumulated output
    fn get_output(&mut self) -> Self::Output;

    /// Reset for reuse
    fn clear(&mut self);
}
