//! Compiled template graph
//!
//! The graph is the contract with the external template compiler: a typed tree of
//! nodes decoded from a compact JSON shape.

pub mod node;
pub mod wire;

pub use node::{
    AttrValue, Attribute, ClosingTag, Element, Expr, Graph, Node, PartialRef, Section,
};
pub use wire::Compiled;
