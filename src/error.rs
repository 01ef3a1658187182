//! Error types for loading graphs and configuration
//!
//! Rendering itself never fails; anomalies found while rendering are reported through
//! [`crate::diagnostics::Diagnostics`] instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding a compiled graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed JSON, or JSON that does not have the wire shape
    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Node with a type tag outside the documented mapping
    #[error("unknown node type tag: {tag}")]
    UnknownNodeType { tag: u8 },

    /// Node missing a field its type requires
    #[error("{node} node is missing required field '{field}'")]
    MissingField {
        node: &'static str,
        field: &'static str,
    },

    /// Graph file could not be read
    #[error("error reading graph file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading a render configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GraphError::UnknownNodeType { tag: 42 };
        assert_eq!(err.to_string(), "unknown node type tag: 42");

        let err = GraphError::MissingField {
            node: "partial",
            field: "r",
        };
        assert_eq!(err.to_string(), "partial node is missing required field 'r'");
    }
}
