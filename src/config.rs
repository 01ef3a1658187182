//! Render configuration
//!
//! Settings can be built in code or loaded from a TOML file:
//!
//! ```toml
//! [render]
//! start_id = "c1-"
//! wrap_tag = "section"
//! max_partial_depth = 32
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::ConfigError;

/// HTML elements that never have content or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Configuration shared by builders, the interpreter and the attachment pass
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Prefix for the addresses of root-level frames
    pub start_id: String,

    /// Tag used when wrapping a template without an explicit tag
    pub wrap_tag: String,

    /// Maximum nesting of partials while interpreting
    pub max_partial_depth: usize,

    /// Elements serialized without a closing tag when they have no children
    pub void_elements: Vec<String>,

    /// Sink for recoverable anomalies
    pub diagnostics: Arc<dyn Diagnostics>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            start_id: String::new(),
            wrap_tag: "div".to_string(),
            max_partial_depth: 64,
            void_elements: VOID_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
struct TomlConfig {
    render: Option<TomlRender>,
}

#[derive(Deserialize)]
struct TomlRender {
    start_id: Option<String>,
    wrap_tag: Option<String>,
    max_partial_depth: Option<usize>,
    void_elements: Option<Vec<String>>,
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(render) = parsed.render {
            if let Some(start_id) = render.start_id {
                config.start_id = start_id;
            }
            if let Some(wrap_tag) = render.wrap_tag {
                config.wrap_tag = wrap_tag;
            }
            if let Some(depth) = render.max_partial_depth {
                config.max_partial_depth = depth;
            }
            if let Some(void_elements) = render.void_elements {
                config.void_elements = void_elements;
            }
        }
        Ok(config)
    }

    /// Set the root address prefix
    pub fn with_start_id(mut self, start_id: impl Into<String>) -> Self {
        self.start_id = start_id.into();
        self
    }

    /// Set the default wrapper tag
    pub fn with_wrap_tag(mut self, tag: impl Into<String>) -> Self {
        self.wrap_tag = tag.into();
        self
    }

    /// Set the partial nesting limit
    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    /// Replace the void element list
    pub fn with_void_elements<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.void_elements = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the diagnostics sink
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn is_void(&self, tag_name: &str) -> bool {
        self.void_elements
            .iter()
            .any(|v| v.eq_ignore_ascii_case(tag_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.start_id, "");
        assert_eq!(config.wrap_tag, "div");
        assert_eq!(config.max_partial_depth, 64);
        assert!(config.is_void("br"));
        assert!(config.is_void("IMG"));
        assert!(!config.is_void("div"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = RenderConfig::new()
            .with_start_id("c1-")
            .with_wrap_tag("section")
            .with_max_partial_depth(8);

        assert_eq!(config.start_id, "c1-");
        assert_eq!(config.wrap_tag, "section");
        assert_eq!(config.max_partial_depth, 8);
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = RenderConfig::from_toml(
            r#"
            [render]
            wrap_tag = "main"
            void_elements = ["br"]
            "#,
        )
        .unwrap();
        assert_eq!(config.wrap_tag, "main");
        assert_eq!(config.start_id, "");
        assert!(config.is_void("br"));
        assert!(!config.is_void("img"));
    }

    #[test]
    fn test_from_toml_empty() {
        let config = RenderConfig::from_toml("").unwrap();
        assert_eq!(config.max_partial_depth, 64);
    }

    #[test]
    fn test_from_toml_invalid() {
        let result = RenderConfig::from_toml("[render]\nmax_partial_depth = \"deep\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
