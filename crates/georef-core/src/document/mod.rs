//! Persisted georeferencing documents.
//!
//! A [`TransformDocument`] bundles everything needed to restore an alignment:
//! provenance metadata, the source raster's native dimensions, the two control
//! points, the solved transform and its bounds. Documents are values; every
//! change produces a new document with a re-solved transform and recomputed
//! bounds.
//!
//! # Persistence
//!
//! [`serialize`] and [`deserialize`] convert documents to and from a JSON
//! record (see [`schema`] for the field layout). Deserialization is
//! all-or-nothing: a record either loads completely or fails with
//! `IncompatibleVersion` / `MalformedDocument`.
//!
//! # Preparation metadata
//!
//! Legend/frame removal selections produced by the drawing tool are opaque:
//! they are carried through unchanged and never interpreted numerically.

pub mod schema;
mod serializer;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::GeorefConfig;
use crate::control_points::ControlPointSet;
use crate::error::{GeorefError, GeorefResult};
use crate::projection;
use crate::transform::{compute_bounds, BoundsQuad, SimilaritySolver, Transform};

pub use schema::{LegendRemoval, Preparation, RemovalMode, Selection};
pub use serializer::{deserialize, deserialize_bytes, serialize, serialize_bytes};

/// Version written to new documents.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Major document version this build reads.
pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// Transformation type label stored in documents.
///
/// Two control points only determine a similarity transform; `Affine` is the
/// legacy label older documents carry for the same model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationKind {
    #[default]
    Similarity,
    Affine,
}

/// Provenance of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Producing software and version
    pub software: String,
}

/// The source raster a document georeferences.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub filename: String,
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
    /// Coordinate system identifier (e.g. "WGS84")
    pub coordinate_system: String,
}

impl SourceInfo {
    pub fn new(
        filename: impl Into<String>,
        width: u32,
        height: u32,
        coordinate_system: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
            coordinate_system: coordinate_system.into(),
        }
    }
}

/// A complete, persisted georeferencing result.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDocument {
    version: String,
    metadata: DocumentMetadata,
    source: SourceInfo,
    preparation: Option<Preparation>,
    control_points: ControlPointSet,
    transform: Transform,
    kind: TransformationKind,
    bounds: BoundsQuad,
}

fn check_dimensions(width: u32, height: u32) -> GeorefResult<()> {
    if width == 0 || height == 0 {
        return Err(GeorefError::DegenerateInput(format!(
            "source image has zero size ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Compute bounds and require every corner to be projectable, so the
/// document can be persisted and read back.
fn checked_bounds(transform: &Transform, width: u32, height: u32) -> GeorefResult<BoundsQuad> {
    let bounds = compute_bounds(transform, width, height);
    let names = ["top-left", "top-right", "bottom-right", "bottom-left"];
    for (name, corner) in names.iter().zip(bounds.corners()) {
        projection::check_domain(corner).map_err(|e| match e {
            GeorefError::OutOfDomain(msg) => {
                GeorefError::OutOfDomain(format!("{} image corner: {}", name, msg))
            }
            other => other,
        })?;
    }
    Ok(bounds)
}

impl TransformDocument {
    /// Create a document from a completed two-point workflow.
    ///
    /// Validates and solves the control points, computes bounds for the
    /// source dimensions, and stamps `created == modified == now`.
    ///
    /// # Errors
    ///
    /// - `DegenerateInput` for degenerate control points or a zero-sized source
    /// - `OutOfDomain` for unprojectable control points, or when an image
    ///   corner maps outside the projection domain
    pub fn create(
        source: SourceInfo,
        control_points: ControlPointSet,
        preparation: Option<Preparation>,
        config: &GeorefConfig,
    ) -> GeorefResult<Self> {
        check_dimensions(source.width, source.height)?;
        let transform = SimilaritySolver::new(config.clone()).solve(&control_points)?;
        let bounds = checked_bounds(&transform, source.width, source.height)?;
        let now = Utc::now();

        debug!(
            "created document for '{}' ({}x{}): {}",
            source.filename, source.width, source.height, transform
        );

        Ok(Self {
            version: DOCUMENT_VERSION.to_string(),
            metadata: DocumentMetadata {
                created: now,
                modified: now,
                software: config.software.clone(),
            },
            source,
            preparation,
            control_points,
            transform,
            kind: config.transformation_kind,
            bounds,
        })
    }

    /// Re-create this document with new control points.
    ///
    /// The transform is re-solved and the bounds recomputed; `created` is kept
    /// and `modified` is bumped.
    pub fn with_control_points(
        &self,
        control_points: ControlPointSet,
        config: &GeorefConfig,
    ) -> GeorefResult<Self> {
        let transform = SimilaritySolver::new(config.clone()).solve(&control_points)?;
        let bounds = checked_bounds(&transform, self.source.width, self.source.height)?;
        debug!(
            "re-solved document for '{}': {}",
            self.source.filename, transform
        );
        Ok(Self {
            metadata: self.touched_metadata(),
            control_points,
            transform,
            bounds,
            ..self.clone()
        })
    }

    /// Re-create this document for a source with different native dimensions.
    ///
    /// Fails with `OutOfDomain` if the larger footprint leaves the projection
    /// domain.
    pub fn with_source_dimensions(&self, width: u32, height: u32) -> GeorefResult<Self> {
        check_dimensions(width, height)?;
        let bounds = checked_bounds(&self.transform, width, height)?;
        let source = SourceInfo {
            width,
            height,
            ..self.source.clone()
        };
        Ok(Self {
            metadata: self.touched_metadata(),
            bounds,
            source,
            ..self.clone()
        })
    }

    fn touched_metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            modified: Utc::now().max(self.metadata.created),
            ..self.metadata.clone()
        }
    }

    /// Assemble a document from already-validated parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        version: String,
        metadata: DocumentMetadata,
        source: SourceInfo,
        preparation: Option<Preparation>,
        control_points: ControlPointSet,
        transform: Transform,
        kind: TransformationKind,
        bounds: BoundsQuad,
    ) -> Self {
        Self {
            version,
            metadata,
            source,
            preparation,
            control_points,
            transform,
            kind,
            bounds,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn preparation(&self) -> Option<&Preparation> {
        self.preparation.as_ref()
    }

    pub fn control_points(&self) -> &ControlPointSet {
        &self.control_points
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transformation_kind(&self) -> TransformationKind {
        self.kind
    }

    /// Bounds as stored. For loaded documents this is the persisted cache;
    /// see [`TransformDocument::is_bounds_current`].
    pub fn bounds(&self) -> &BoundsQuad {
        &self.bounds
    }

    /// Whether the stored bounds match a recomputation from the transform and
    /// source dimensions, within `tolerance` degrees.
    pub fn is_bounds_current(&self, tolerance: f64) -> bool {
        let fresh = compute_bounds(&self.transform, self.source.width, self.source.height);
        fresh.approx_eq(&self.bounds, tolerance)
    }

    /// Field-by-field comparison within persistence tolerances: 1e-9 for scale
    /// and rotation, 1e-6 degrees for coordinates, 1e-6 pixels for image points.
    pub fn approx_eq(&self, other: &TransformDocument) -> bool {
        const PARAM_TOLERANCE: f64 = 1e-9;
        const COORD_TOLERANCE: f64 = 1e-6;
        const PIXEL_TOLERANCE: f64 = 1e-6;

        let pairs_match = self
            .control_points
            .pairs()
            .iter()
            .zip(other.control_points.pairs().iter())
            .all(|(a, b)| {
                a.id == b.id
                    && a.image.distance(&b.image) <= PIXEL_TOLERANCE
                    && a.geo.approx_eq(&b.geo, COORD_TOLERANCE)
            });

        self.version == other.version
            && self.metadata == other.metadata
            && self.source == other.source
            && self.preparation == other.preparation
            && self.kind == other.kind
            && pairs_match
            && self
                .transform
                .approx_eq(&other.transform, PARAM_TOLERANCE, COORD_TOLERANCE)
            && self.bounds.approx_eq(&other.bounds, COORD_TOLERANCE)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::{ControlPointPair, GeoPoint, ImagePoint};

    pub(crate) fn scenario_set() -> ControlPointSet {
        ControlPointSet::new(
            ControlPointPair::new(
                "p1",
                ImagePoint::new(100.0, 100.0),
                GeoPoint::new(13.845, 46.6085),
            ),
            ControlPointPair::new(
                "p2",
                ImagePoint::new(900.0, 100.0),
                GeoPoint::new(13.847, 46.6085),
            ),
        )
    }

    pub(crate) fn scenario_document() -> TransformDocument {
        TransformDocument::create(
            SourceInfo::new("sheet-42.png", 1000, 800, "WGS84"),
            scenario_set(),
            None,
            &GeorefConfig::default(),
        )
        .unwrap()
    }
}
