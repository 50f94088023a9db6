//! NAPI-exposed data structures.

use napi_derive::napi;

/// Options accepted by the transform functions.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Whether plain text and attribute values are HTML-escaped (default
    /// true). Set to false for byte-for-byte parity with the historical
    /// JavaScript filter, which emitted source text verbatim.
    pub escape_text: Option<bool>,
}
