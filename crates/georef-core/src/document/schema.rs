//! JSON layout of a persisted document.
//!
//! ```text
//! version: "1.0"
//! metadata: { created, modified, software }
//! source: { filename, dimensions: { width, height }, coordinateSystem }
//! preparation: { legendRemoval: { enabled, mode, selections: [...] } }   (optional)
//! georeferencing: {
//!   referencePoints: [ { id, image: { x, y, unit }, world: { x, y, unit } } ]
//!   transformation: {
//!     type: "similarity" | "affine",
//!     parameters: { scale, rotation, translation: { x, y } },
//!     bounds: { topLeft, topRight, bottomRight, bottomLeft: [lon, lat] }
//!   }
//! }
//! ```
//!
//! The record types here only describe structure; range checks and unit
//! conversion happen when a record is turned into a
//! [`TransformDocument`](super::TransformDocument).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::TransformationKind;

/// Whether legend selections mark regions to remove or to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    #[default]
    Remove,
    Keep,
}

/// One rectangle drawn in the legend/frame removal tool.
///
/// Values are kept as raw JSON and never interpreted. Keys beyond the required
/// six are carried through as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: Value,
    pub x: Value,
    pub y: Value,
    pub width: Value,
    pub height: Value,
    pub unit: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Legend/frame removal settings produced by the preparation step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegendRemoval {
    pub enabled: bool,
    pub mode: RemovalMode,
    pub selections: Vec<Selection>,
    /// Unrecognized keys, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raster preparation metadata stored alongside the transform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preparation {
    pub legend_removal: LegendRemoval,
    /// Output of other preparation tools, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentRecord {
    pub version: String,
    pub metadata: MetadataRecord,
    pub source: SourceRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<Preparation>,
    pub georeferencing: GeoreferencingRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MetadataRecord {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub software: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SourceRecord {
    pub filename: String,
    pub dimensions: DimensionsRecord,
    pub coordinate_system: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct DimensionsRecord {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeoreferencingRecord {
    pub reference_points: Vec<ReferencePointRecord>,
    pub transformation: TransformationRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ImageUnit {
    /// Fractions of the source width/height
    Normalized,
    Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WorldUnit {
    /// Longitude/latitude
    Degrees,
    /// Web Mercator meters
    Meters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ImageCoordRecord {
    pub x: f64,
    pub y: f64,
    pub unit: ImageUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WorldCoordRecord {
    pub x: f64,
    pub y: f64,
    pub unit: WorldUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ReferencePointRecord {
    pub id: String,
    pub image: ImageCoordRecord,
    pub world: WorldCoordRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TransformationRecord {
    #[serde(rename = "type")]
    pub kind: TransformationKind,
    pub parameters: ParametersRecord,
    pub bounds: BoundsRecord,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct XyRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ParametersRecord {
    pub scale: f64,
    /// Degrees
    pub rotation: f64,
    /// Anchor longitude (x) and latitude (y), degrees
    pub translation: XyRecord,
}

/// Corners as `[lon, lat]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BoundsRecord {
    pub top_left: [f64; 2],
    pub top_right: [f64; 2],
    pub bottom_right: [f64; 2],
    pub bottom_left: [f64; 2],
}
