//! Source image probing WASM bindings.
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const source = probe_source_image(file.name, bytes);
//! console.log(`${source.filename}: ${source.width}x${source.height}`);
//! ```

use georef_core::SourceImage;
use wasm_bindgen::prelude::*;

use crate::error::source_to_js;
use crate::types::JsSourceImage;

/// Read the native dimensions of a PNG or JPEG without decoding pixels.
///
/// # Errors
///
/// A `SourceImageError` string if the bytes are not a recognized image or
/// the header is unreadable.
#[wasm_bindgen]
pub fn probe_source_image(filename: &str, bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    SourceImage::probe(filename, bytes)
        .map(JsSourceImage::from_core)
        .map_err(source_to_js)
}
