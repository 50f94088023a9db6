use thiserror::Error;

/// Errors that can occur while transforming a document.
///
/// Shape errors abort the whole transformation: silently skipping a malformed
/// node would desynchronize note numbering, so there is no partial-output mode.
/// Unrecognized node kinds are not errors; they pass through (blocks) or fall
/// back to raw-payload rendering (inlines).
#[derive(Debug, Error)]
pub enum SidenoteError {
    /// IO error while reading or writing the document stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The input stream is not well-formed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A node lacks a field its rendering rule requires.
    #[error("Shape error in {node} node: {message}")]
    Shape {
        /// Node kind tag (e.g. "Link", "Note").
        node: String,
        /// What was missing or mistyped.
        message: String,
    },
}

impl SidenoteError {
    /// Create a shape error for a node kind.
    pub fn shape(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            node: node.into(),
            message: message.into(),
        }
    }
}
