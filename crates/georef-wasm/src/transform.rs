//! WASM bindings for solving and applying transforms.
//!
//! Control point pairs are passed as plain objects:
//!
//! ```typescript
//! const pair = {
//!   id: "p1",
//!   image: { x: 100, y: 100 },
//!   geo: { longitude: 13.845, latitude: 46.6085 },
//! };
//! ```

use georef_core::{
    ControlPointPair, ControlPointSet, GeoPoint, GeorefConfig, ImagePoint, SimilaritySolver,
};
use wasm_bindgen::prelude::*;

use crate::error::{georef_to_js, input_to_js};
use crate::types::{to_js, JsTransform};

pub(crate) fn parse_pair(value: JsValue) -> Result<ControlPointPair, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| input_to_js("control point pair", e))
}

/// Parse an optional configuration object; `undefined` or `null` means defaults.
pub(crate) fn parse_config(value: JsValue) -> Result<GeorefConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(GeorefConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| input_to_js("configuration", e))
}

/// Solve a similarity transform from two control point pairs.
///
/// # Arguments
///
/// * `first` - First pair `{ id, image: {x, y}, geo: {longitude, latitude} }`
/// * `second` - Second pair, same shape
/// * `config` - Optional partial `GeorefConfig` (camelCase keys)
///
/// # Example (TypeScript)
///
/// ```typescript
/// const t = solve(p1, p2);
/// console.log(t.scale, t.rotation);
/// ```
#[wasm_bindgen]
pub fn solve(first: JsValue, second: JsValue, config: JsValue) -> Result<JsTransform, JsValue> {
    let set = ControlPointSet::new(parse_pair(first)?, parse_pair(second)?);
    let solver = SimilaritySolver::new(parse_config(config)?);
    solver
        .solve(&set)
        .map(JsTransform::from_core)
        .map_err(georef_to_js)
}

/// Compute the image footprint.
///
/// Returns `{ top_left, top_right, bottom_right, bottom_left }`, each
/// `{ longitude, latitude }`.
#[wasm_bindgen]
pub fn compute_bounds(
    transform: &JsTransform,
    width: u32,
    height: u32,
) -> Result<JsValue, JsValue> {
    let bounds = georef_core::compute_bounds(transform.core(), width, height);
    to_js(&bounds)
}

/// Map an image pixel to `{ longitude, latitude }`.
#[wasm_bindgen]
pub fn map_forward(transform: &JsTransform, x: f64, y: f64) -> Result<JsValue, JsValue> {
    let geo = georef_core::map_point(transform.core(), ImagePoint::new(x, y));
    to_js(&geo)
}

/// Map a geographic coordinate to an image pixel `{ x, y }`.
#[wasm_bindgen]
pub fn map_inverse(
    transform: &JsTransform,
    longitude: f64,
    latitude: f64,
) -> Result<JsValue, JsValue> {
    let pixel = georef_core::map_inverse(transform.core(), GeoPoint::new(longitude, latitude))
        .map_err(georef_to_js)?;
    to_js(&pixel)
}
