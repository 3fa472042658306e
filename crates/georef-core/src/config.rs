//! Engine configuration.
//!
//! All thresholds are carried in an explicit value passed by the caller; there
//! is no process-wide state. Every field has a serde default so hosts may
//! supply a partial JSON object.

use serde::{Deserialize, Serialize};

use crate::document::TransformationKind;

/// Default minimum separation between the two image points, in pixels.
pub const DEFAULT_MIN_PIXEL_SEPARATION: f64 = 1.0;

/// Default minimum ground separation between the two geographic points, in meters.
pub const DEFAULT_MIN_GROUND_SEPARATION_M: f64 = 1.0;

/// Default coordinate system identifier written to new documents.
pub const DEFAULT_COORDINATE_SYSTEM: &str = "WGS84";

/// Configuration for validation, solving and document creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeorefConfig {
    /// Image points closer than this (pixels) are degenerate
    pub min_pixel_separation: f64,
    /// Geographic points closer than this on the ground (meters) are degenerate
    pub min_ground_separation_m: f64,
    /// `software` label stamped into document metadata
    pub software: String,
    /// Coordinate system identifier for new documents
    pub coordinate_system: String,
    /// Transformation type label for new documents
    pub transformation_kind: TransformationKind,
}

impl Default for GeorefConfig {
    fn default() -> Self {
        Self {
            min_pixel_separation: DEFAULT_MIN_PIXEL_SEPARATION,
            min_ground_separation_m: DEFAULT_MIN_GROUND_SEPARATION_M,
            software: format!("georef-core {}", env!("CARGO_PKG_VERSION")),
            coordinate_system: DEFAULT_COORDINATE_SYSTEM.to_string(),
            transformation_kind: TransformationKind::Similarity,
        }
    }
}

impl GeorefConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}
