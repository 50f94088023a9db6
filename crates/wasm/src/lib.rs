//! WebAssembly bindings for the sidenote filter.

use serde::Serialize;
use sidenote_core::{Document, Options};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Configuration accepted by the WASM transform functions.
/// Mirrors the NAPI `TransformConfig` for parity.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct WasmTransformConfig {
    #[serde(default, alias = "escapeText")]
    pub escape_text: Option<bool>,
}

fn parse_config(config: JsValue) -> WasmTransformConfig {
    if config.is_undefined() || config.is_null() {
        return WasmTransformConfig::default();
    }
    serde_wasm_bindgen::from_value(config).unwrap_or_default()
}

fn build_options(cfg: &WasmTransformConfig) -> Options {
    let mut options = Options::default();
    if let Some(escape_text) = cfg.escape_text {
        options.escape_text = escape_text;
    }
    options
}

/// Transforms a serialized Pandoc JSON document, replacing every footnote
/// with an inline sidenote or margin-note widget.
///
/// # Arguments
///
/// * `json` - The serialized Pandoc document
/// * `config` - Optional configuration object (`{ escapeText?: boolean }`)
///
/// # Returns
///
/// The transformed document as serialized JSON.
#[wasm_bindgen]
pub fn transform(json: &str, config: JsValue) -> Result<String, JsError> {
    let cfg = parse_config(config);
    sidenote_core::transform_json(json, &build_options(&cfg))
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Transforms an already-parsed document object (e.g. the result of
/// `JSON.parse` on pandoc output), returning the transformed object.
#[wasm_bindgen(js_name = transform_tree)]
pub fn transform_tree(value: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let cfg = parse_config(config);
    let json_value: serde_json::Value = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid document: {}", e)))?;
    let document =
        Document::from_value(&json_value).map_err(|e| JsError::new(&e.to_string()))?;
    let transformed = sidenote_core::transform(document, &build_options(&cfg))
        .map_err(|e| JsError::new(&e.to_string()))?;
    // The default serializer turns JSON objects into ES Maps; callers hand us
    // JSON.parse output, so hand back plain objects.
    transformed
        .to_value()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
