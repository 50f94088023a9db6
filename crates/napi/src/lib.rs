#![deny(missing_docs)]
//! Node.js bindings that surface the sidenote filter's Rust implementation.

use napi_derive::napi;
use sidenote_core::{Options, transform_json};

/// Batch processing types and functions.
pub mod batch;
/// NAPI-exposed data structures.
pub mod types;

pub use batch::*;
pub use types::*;

/// Maps an optional JS-side config onto core transform options.
pub(crate) fn build_options(config: Option<&TransformConfig>) -> Options {
    let mut options = Options::default();
    if let Some(config) = config
        && let Some(escape_text) = config.escape_text
    {
        options.escape_text = escape_text;
    }
    options
}

/// Transforms a serialized Pandoc JSON document, replacing every footnote
/// with an inline sidenote or margin-note widget, and returns the serialized
/// result.
#[napi]
pub fn transform_document(
    json: String,
    config: Option<TransformConfig>,
) -> napi::Result<String> {
    let options = build_options(config.as_ref());
    transform_json(&json, &options).map_err(|e| napi::Error::from_reason(e.to_string()))
}
