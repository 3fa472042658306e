//! Georef WASM - WebAssembly bindings for the georeferencing engine
//!
//! This crate exposes georef-core to JavaScript/TypeScript map viewers.
//!
//! # Module Structure
//!
//! - `transform` - Solving transforms, mapping points, computing bounds
//! - `document` - Creating, updating and (de)serializing documents
//! - `source` - Reading native dimensions from an uploaded raster
//! - `types` - Opaque handles with getters
//!
//! Errors are thrown as strings prefixed with the error kind, e.g.
//! `"DegenerateInputError: ..."`.
//!
//! # Usage
//!
//! ```typescript
//! import init, { solve, compute_bounds } from '@georef/wasm';
//!
//! await init();
//!
//! const t = solve(p1, p2);
//! const bounds = compute_bounds(t, image.width, image.height);
//! overlay.setCorners(bounds.top_left, bounds.top_right, bounds.bottom_right, bounds.bottom_left);
//! ```

use wasm_bindgen::prelude::*;

mod document;
mod error;
mod source;
mod transform;
mod types;

pub use document::{
    create_document, deserialize_document, document_bounds, document_control_points,
    document_preparation, serialize_document, update_control_points,
};
pub use source::probe_source_image;
pub use transform::{compute_bounds, map_forward, map_inverse, solve};
pub use types::{JsSourceImage, JsTransform, JsTransformDocument};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. a re-instantiated module) keeps the existing logger
    if console_log::init_with_level(log::Level::Debug).is_ok() {
        log::debug!("georef-wasm {} ready", version());
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
