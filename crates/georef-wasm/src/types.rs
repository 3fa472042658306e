//! WASM-compatible wrapper types.
//!
//! Handles keep the core values in WASM memory and expose read-only getters,
//! so a solved transform or loaded document can be reused across calls
//! without re-validating it.

use georef_core::{SourceImage, Transform, TransformDocument};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Convert a serializable value into a plain JavaScript object.
///
/// Maps become ordinary objects rather than `Map` instances, so opaque
/// preparation metadata reads the same as it does in the JSON document.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

/// A solved similarity transform.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsTransform {
    inner: Transform,
}

#[wasm_bindgen]
impl JsTransform {
    /// Projected meters per source pixel
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale()
    }

    /// Rotation in degrees, in (-180, 180]
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.rotation_degrees()
    }

    /// Longitude of pixel (0, 0)
    #[wasm_bindgen(getter)]
    pub fn translation_lon(&self) -> f64 {
        self.inner.translation().longitude
    }

    /// Latitude of pixel (0, 0)
    #[wasm_bindgen(getter)]
    pub fn translation_lat(&self) -> f64 {
        self.inner.translation().latitude
    }

    /// True ground meters per pixel at the anchor latitude
    #[wasm_bindgen(getter)]
    pub fn ground_resolution(&self) -> f64 {
        self.inner.ground_resolution()
    }

    /// Human-readable summary, for logs and debugging panels.
    pub fn describe(&self) -> String {
        self.inner.to_string()
    }
}

impl JsTransform {
    pub(crate) fn from_core(inner: Transform) -> Self {
        Self { inner }
    }

    pub(crate) fn core(&self) -> &Transform {
        &self.inner
    }
}

/// Native dimensions of a probed source image.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }
}

impl JsSourceImage {
    pub(crate) fn from_core(inner: SourceImage) -> Self {
        Self { inner }
    }
}

/// A georeferencing document held in WASM memory.
///
/// Structured parts (control points, bounds, preparation) are read through
/// the functions in the document bindings.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsTransformDocument {
    inner: TransformDocument,
}

#[wasm_bindgen]
impl JsTransformDocument {
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String {
        self.inner.version().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.source().filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.source().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.source().height
    }

    /// Creation time, RFC 3339
    #[wasm_bindgen(getter)]
    pub fn created(&self) -> String {
        self.inner.metadata().created.to_rfc3339()
    }

    /// Last modification time, RFC 3339
    #[wasm_bindgen(getter)]
    pub fn modified(&self) -> String {
        self.inner.metadata().modified.to_rfc3339()
    }

    #[wasm_bindgen(getter)]
    pub fn software(&self) -> String {
        self.inner.metadata().software.clone()
    }

    /// The document's solved transform as a separate handle.
    pub fn transform(&self) -> JsTransform {
        JsTransform::from_core(*self.inner.transform())
    }

    /// Whether the stored bounds still match the transform and dimensions.
    pub fn bounds_current(&self) -> bool {
        self.inner.is_bounds_current(1e-6)
    }
}

impl JsTransformDocument {
    pub(crate) fn from_core(inner: TransformDocument) -> Self {
        Self { inner }
    }

    pub(crate) fn core(&self) -> &TransformDocument {
        &self.inner
    }
}
