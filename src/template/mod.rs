//! Templates: graphs bound to partials, registries and components
//!
//! A [`Template`] owns a shared, immutable graph and knows how to render it through
//! any builder. Binding a template to a component with [`Template::attach_view`]
//! runs the attachment pass, replacing elements that host child components with
//! widget placeholders.
//!
//! # Example
//!
//! ```rust
//! use graft::template::Template;
//! use serde_json::json;
//!
//! let template = Template::from_json(r#"{"t": 7, "e": "li", "f": [{"t": 2, "r": "name"}]}"#).unwrap();
//! assert_eq!(template.to_html(&json!({"name": "ann"})), "<li>ann</li>");
//! ```

mod attach;
mod registry;
mod render;

pub use attach::{attach, Attachment};
pub use registry::{resolve, PartialDef, PartialRegistry, Partials, ResolvedPartial};
pub use render::Template;
