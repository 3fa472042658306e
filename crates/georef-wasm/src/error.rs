//! Conversion of engine errors into JavaScript values.
//!
//! Errors cross the boundary as strings of the form `"<Kind>: <message>"` so
//! callers can branch on the prefix.

use georef_core::{GeorefError, SourceError};
use log::warn;
use wasm_bindgen::JsValue;

/// Prefix used for every source probing failure.
pub(crate) const SOURCE_ERROR_KIND: &str = "SourceImageError";

pub(crate) fn georef_error_message(err: &GeorefError) -> String {
    format!("{}: {}", err.kind(), err)
}

pub(crate) fn source_error_message(err: &SourceError) -> String {
    format!("{}: {}", SOURCE_ERROR_KIND, err)
}

pub(crate) fn georef_to_js(err: GeorefError) -> JsValue {
    let message = georef_error_message(&err);
    warn!("{}", message);
    JsValue::from_str(&message)
}

pub(crate) fn source_to_js(err: SourceError) -> JsValue {
    let message = source_error_message(&err);
    warn!("{}", message);
    JsValue::from_str(&message)
}

/// Invalid structured input from JavaScript.
pub(crate) fn input_to_js(what: &str, err: serde_wasm_bindgen::Error) -> JsValue {
    let message = format!("InvalidInputError: invalid {}: {}", what, err);
    warn!("{}", message);
    JsValue::from_str(&message)
}
