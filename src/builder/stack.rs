//! Open-element stack shared by every output target

use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use super::output::{non_empty, push_merged, RenderAttribute, RenderBlock, RenderElement};
use super::{BlockKind, Builder, CloseRequest, FrameKind, RenderNode};
use crate::config::RenderConfig;
use crate::diagnostics::{Diagnostics, Warning, WarningKind};

/// Encoding policy for one output representation
pub trait OutputTarget {
    type Output;

    /// Convert a leaf as it enters the builder
    fn leaf(&mut self, node: RenderNode) -> RenderNode {
        node
    }

    /// Convert a normalized frame as it is closed
    fn finalize(&mut self, node: RenderNode) -> RenderNode {
        node
    }

    /// Output for exactly one top-level result
    fn single(&mut self, node: RenderNode) -> Self::Output;

    /// Output for any other number of top-level results
    fn process_array_output(&mut self, nodes: Vec<RenderNode>) -> Self::Output;
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    name: String,
    address: String,
    attributes: Vec<RenderAttribute>,
    children: Vec<RenderNode>,
    next_index: usize,
}

impl Frame {
    fn request(&self) -> CloseRequest {
        CloseRequest {
            address: Some(self.address.clone()),
            kind: self.kind,
            name: self.name.clone(),
            explicit: false,
        }
    }

    fn matches(&self, request: &CloseRequest) -> bool {
        self.kind == request.kind && self.name.eq_ignore_ascii_case(&request.name)
    }

    /// Canonical node shape; runs exactly once per frame
    fn normalize(self) -> RenderNode {
        match self.kind {
            FrameKind::Element => RenderNode::Element(RenderElement {
                tag_name: self.name,
                attributes: self.attributes,
                children: non_empty(self.children),
            }),
            FrameKind::Attribute => {
                let value = if self.children.is_empty() {
                    None
                } else {
                    Some(self.children.iter().map(RenderNode::text_content).collect())
                };
                RenderNode::Attribute(RenderAttribute {
                    name: self.name,
                    value,
                })
            }
            FrameKind::Section => RenderNode::Block(RenderBlock {
                kind: BlockKind::Section,
                children: non_empty(self.children),
            }),
            FrameKind::Partial => RenderNode::Block(RenderBlock {
                kind: BlockKind::Partial(self.name),
                children: non_empty(self.children),
            }),
        }
    }
}

/// Builder over an explicit open-element stack, generic over the output encoding
pub struct StackBuilder<T: OutputTarget> {
    target: T,
    start_id: String,
    diagnostics: Arc<dyn Diagnostics>,
    stack: Vec<Frame>,
    results: Vec<RenderNode>,
    next_root_index: usize,
    /// Addresses force-closed during mismatch recovery whose own close is still pending
    recovered: HashSet<String>,
}

impl<T: OutputTarget> StackBuilder<T> {
    pub fn new(target: T, config: &RenderConfig) -> Self {
        Self {
            target,
            start_id: config.start_id.clone(),
            diagnostics: config.diagnostics.clone(),
            stack: Vec::new(),
            results: Vec::new(),
            next_root_index: 0,
            recovered: HashSet::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Number of frames currently open
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Addresses of the open frames, bottom first
    pub fn open_addresses(&self) -> Vec<&str> {
        self.stack.iter().map(|f| f.address.as_str()).collect()
    }

    fn claim_index(&mut self) -> (Option<String>, usize) {
        match self.stack.last_mut() {
            Some(parent) => {
                let index = parent.next_index;
                parent.next_index += 1;
                (Some(parent.address.clone()), index)
            }
            None => {
                let index = self.next_root_index;
                self.next_root_index += 1;
                (None, index)
            }
        }
    }

    fn next_address(&mut self) -> String {
        match self.claim_index() {
            (Some(parent), index) => format!("{}.{}", parent, index),
            (None, index) => format!("{}{}", self.start_id, index),
        }
    }

    fn place(&mut self, node: RenderNode) {
        match (self.stack.last_mut(), node) {
            (Some(frame), RenderNode::Attribute(attr)) if frame.kind == FrameKind::Element => {
                frame.attributes.push(attr);
            }
            (_, RenderNode::Attribute(attr)) => {
                self.diagnostics.warn(Warning::new(
                    WarningKind::MisplacedAttribute,
                    format!("attribute '{}' produced outside of an element start tag", attr.name),
                ));
            }
            (Some(frame), node) => push_merged(&mut frame.children, node),
            (None, node) => push_merged(&mut self.results, node),
        }
    }

    fn pop_and_place(&mut self) {
        if let Some(frame) = self.stack.pop() {
            tracing::trace!(address = %frame.address, kind = %frame.kind, "close {}", frame.name);
            let node = self.target.finalize(frame.normalize());
            self.place(node);
        }
    }

    /// Close against an empty stack: the paragraph quirk synthesizes `<p></p>`,
    /// anything else is dropped
    fn unbalanced_close(&mut self, request: &CloseRequest) {
        if request.is_tag("p") {
            let handle = self.open_element(FrameKind::Element, "p");
            self.close_element(handle);
        } else {
            self.diagnostics.warn(Warning::new(
                WarningKind::StrayClose,
                format!(
                    "closing {} '{}' at {} has no open counterpart",
                    request.kind,
                    request.name,
                    request.address.as_deref().unwrap_or("<unknown>")
                ),
            ));
        }
    }
}

impl<T: OutputTarget> Builder for StackBuilder<T> {
    type Output = T::Output;

    fn open_element(&mut self, kind: FrameKind, value: &str) -> CloseRequest {
        let address = self.next_address();
        tracing::trace!(%address, %kind, "open {}", value);
        let frame = Frame {
            kind,
            name: value.to_string(),
            address,
            attributes: Vec::new(),
            children: Vec::new(),
            next_index: 0,
        };
        let request = frame.request();
        self.stack.push(frame);
        request
    }

    fn create_object(&mut self, node: RenderNode) {
        self.claim_index();
        let node = self.target.leaf(node);
        self.place(node);
    }

    fn close_element(&mut self, request: CloseRequest) {
        if let Some(address) = &request.address {
            if self.recovered.remove(address) {
                tracing::trace!(%address, "close already performed by recovery");
                return;
            }
        }

        let Some(top) = self.stack.last() else {
            self.unbalanced_close(&request);
            return;
        };

        let exact = match &request.address {
            Some(address) => *address == top.address,
            None => top.matches(&request),
        };
        if exact {
            if request.explicit {
                self.recovered.insert(top.address.clone());
            }
            self.pop_and_place();
            return;
        }

        self.diagnostics.warn(Warning::new(
            WarningKind::TagMismatch,
            format!(
                "closing {} '{}' expected at {} but top of stack is '{}' at {}",
                request.kind,
                request.name,
                request.address.as_deref().unwrap_or("<unknown>"),
                top.name,
                top.address
            ),
        ));

        while let Some(top) = self.stack.last() {
            if top.matches(&request) {
                break;
            }
            self.recovered.insert(top.address.clone());
            self.pop_and_place();
        }

        match self.stack.last() {
            Some(top) => {
                if request.explicit || request.address.as_deref() != Some(top.address.as_str()) {
                    self.recovered.insert(top.address.clone());
                }
                self.pop_and_place();
            }
            None => self.unbalanced_close(&request),
        }
    }

    fn get_output(&mut self) -> T::Output {
        while let Some(top) = self.stack.last() {
            let request = top.request();
            let depth = self.stack.len();
            self.close_element(request);
            if self.stack.len() >= depth {
                self.pop_and_place();
            }
        }

        let mut results = mem::take(&mut self.results);
        self.clear();

        if results.len() == 1 {
            match results.pop() {
                Some(node) => self.target.single(node),
                None => self.target.process_array_output(results),
            }
        } else {
            self.target.process_array_output(results)
        }
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.results.clear();
        self.next_root_index = 0;
        self.recovered.clear();
    }
}
