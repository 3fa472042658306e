//! WASM bindings for georeferencing documents.
//!
//! Documents live in WASM memory as [`JsTransformDocument`] handles. They are
//! created from a finished two-point workflow, updated by re-solving, and
//! converted to and from the persisted JSON text.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const doc = create_document(
//!   { filename: "sheet.png", width: 1000, height: 800 },
//!   p1, p2, preparation, undefined,
//! );
//! const json = serialize_document(doc);
//! const restored = deserialize_document(json);
//! ```

use georef_core::{ControlPointSet, Preparation, SourceInfo, TransformDocument};
use log::info;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::error::{georef_to_js, input_to_js};
use crate::transform::{parse_config, parse_pair};
use crate::types::{to_js, JsTransformDocument};

/// Source description passed from JavaScript.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SourceInput {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Falls back to the configured coordinate system
    #[serde(default)]
    pub coordinate_system: Option<String>,
}

impl SourceInput {
    pub(crate) fn into_source_info(self, default_crs: &str) -> SourceInfo {
        let crs = self
            .coordinate_system
            .unwrap_or_else(|| default_crs.to_string());
        SourceInfo::new(self.filename, self.width, self.height, crs)
    }
}

fn parse_preparation(value: JsValue) -> Result<Option<Preparation>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| input_to_js("preparation", e))
}

/// Create a document from a completed two-point workflow.
///
/// # Arguments
///
/// * `source` - `{ filename, width, height, coordinateSystem? }`
/// * `first`, `second` - Control point pairs
/// * `preparation` - Optional `{ legendRemoval: {...} }`, carried unchanged
/// * `config` - Optional partial `GeorefConfig`
#[wasm_bindgen]
pub fn create_document(
    source: JsValue,
    first: JsValue,
    second: JsValue,
    preparation: JsValue,
    config: JsValue,
) -> Result<JsTransformDocument, JsValue> {
    let config = parse_config(config)?;
    let source: SourceInput =
        serde_wasm_bindgen::from_value(source).map_err(|e| input_to_js("source", e))?;
    let set = ControlPointSet::new(parse_pair(first)?, parse_pair(second)?);

    let doc = TransformDocument::create(
        source.into_source_info(&config.coordinate_system),
        set,
        parse_preparation(preparation)?,
        &config,
    )
    .map_err(georef_to_js)?;
    info!("created georeferencing document for '{}'", doc.source().filename);
    Ok(JsTransformDocument::from_core(doc))
}

/// Re-solve a document with new control points; the input handle is unchanged.
#[wasm_bindgen]
pub fn update_control_points(
    document: &JsTransformDocument,
    first: JsValue,
    second: JsValue,
    config: JsValue,
) -> Result<JsTransformDocument, JsValue> {
    let config = parse_config(config)?;
    let set = ControlPointSet::new(parse_pair(first)?, parse_pair(second)?);
    document
        .core()
        .with_control_points(set, &config)
        .map(JsTransformDocument::from_core)
        .map_err(georef_to_js)
}

/// Encode a document as the persisted JSON text.
#[wasm_bindgen]
pub fn serialize_document(document: &JsTransformDocument) -> Result<String, JsValue> {
    georef_core::serialize(document.core()).map_err(georef_to_js)
}

/// Load a document from persisted JSON text.
///
/// Failures are `IncompatibleVersionError` or `MalformedDocumentError`.
#[wasm_bindgen]
pub fn deserialize_document(text: &str) -> Result<JsTransformDocument, JsValue> {
    georef_core::deserialize(text)
        .map(JsTransformDocument::from_core)
        .map_err(georef_to_js)
}

/// The stored footprint `{ top_left, top_right, bottom_right, bottom_left }`.
#[wasm_bindgen]
pub fn document_bounds(document: &JsTransformDocument) -> Result<JsValue, JsValue> {
    to_js(document.core().bounds())
}

/// The two control point pairs as an array.
#[wasm_bindgen]
pub fn document_control_points(document: &JsTransformDocument) -> Result<JsValue, JsValue> {
    to_js(document.core().control_points().pairs())
}

/// Preparation metadata, or `null` when the document has none.
#[wasm_bindgen]
pub fn document_preparation(document: &JsTransformDocument) -> Result<JsValue, JsValue> {
    to_js(&document.core().preparation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_input_uses_given_crs() {
        let input = SourceInput {
            filename: "sheet.png".to_string(),
            width: 10,
            height: 20,
            coordinate_system: Some("EPSG:4326".to_string()),
        };
        let info = input.into_source_info("WGS84");
        assert_eq!(info, SourceInfo::new("sheet.png", 10, 20, "EPSG:4326"));
    }

    #[test]
    fn test_source_input_falls_back_to_config_crs() {
        let input = SourceInput {
            filename: "sheet.png".to_string(),
            width: 10,
            height: 20,
            coordinate_system: None,
        };
        assert_eq!(input.into_source_info("WGS84").coordinate_system, "WGS84");
    }
}
