//! Graft - a template rendering engine for compiled template graphs
//!
//! This library interprets precompiled template graphs against JSON data and drives
//! one of several output builders: a markup string, a renderable tree, or a
//! materialized fragment. Components can bind templates to themselves, in which case
//! elements hosting child components are replaced by widget placeholders that
//! delegate to the child's own rendering.
//!
//! # Example
//!
//! ```rust
//! use graft::render_html;
//! use serde_json::json;
//!
//! let html = render_html(
//!     r#"{"t": 7, "e": "li", "a": {"class": "item"}, "f": ["hi"]}"#,
//!     &json!({}),
//! )
//! .unwrap();
//! assert_eq!(html, r#"<li class="item">hi</li>"#);
//! ```

pub mod builder;
pub mod component;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod template;

pub use builder::{Builder, CloseRequest, FrameKind, RenderNode, RenderTree};
pub use component::{Component, ComponentRef, ComponentWidget, View, Widget, WidgetWrapper};
pub use config::RenderConfig;
pub use context::{DataContext, JsonContext};
pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use dom::{Fragment, Materializer};
pub use error::{ConfigError, GraphError};
pub use graph::{Graph, Node};
pub use interpreter::Interpreter;
pub use template::{PartialRegistry, Partials, Template};

use serde_json::Value;

/// Decode a wire document and render it to markup
///
/// Partials are resolved against the document's inline partials and the
/// process-wide registry.
pub fn render_html(source: &str, data: &Value) -> Result<String, GraphError> {
    Ok(Template::from_json(source)?.to_html(data))
}

/// Decode a wire document and render it with an explicit configuration
pub fn render_html_with_config(
    source: &str,
    data: &Value,
    config: RenderConfig,
) -> Result<String, GraphError> {
    Ok(Template::from_json(source)?.with_config(config).to_html(data))
}
