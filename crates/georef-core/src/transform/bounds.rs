//! Geographic footprint of the source image.
//!
//! The four pixel corners are pushed through the forward mapping in a fixed
//! order so overlay renderers can rely on corner identity regardless of how
//! far the image is rotated:
//!
//! ```text
//! (0,0) ──────── (w,0)        top_left ──── top_right
//!   │              │     ->      │              │
//! (0,h) ──────── (w,h)       bottom_left ── bottom_right
//! ```

use serde::{Deserialize, Serialize};

use super::similarity::Transform;
use crate::error::GeorefResult;
use crate::projection;
use crate::types::{GeoPoint, ImagePoint, ProjectedPoint};

/// The image corners mapped to geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsQuad {
    /// Pixel (0, 0)
    pub top_left: GeoPoint,
    /// Pixel (width, 0)
    pub top_right: GeoPoint,
    /// Pixel (width, height)
    pub bottom_right: GeoPoint,
    /// Pixel (0, height)
    pub bottom_left: GeoPoint,
}

/// Axis-aligned envelope of a footprint, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExtent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundsQuad {
    /// Build from corners ordered `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn from_corners(corners: [GeoPoint; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = corners;
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners ordered `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Smallest lon/lat box containing all four corners.
    pub fn extent(&self) -> GeoExtent {
        let corners = self.corners();
        let mut extent = GeoExtent {
            west: f64::INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            north: f64::NEG_INFINITY,
        };
        for c in &corners {
            extent.west = extent.west.min(c.longitude);
            extent.east = extent.east.max(c.longitude);
            extent.south = extent.south.min(c.latitude);
            extent.north = extent.north.max(c.latitude);
        }
        extent
    }

    /// Geographic location of the image center.
    ///
    /// The footprint is a parallelogram in projected space, so the center is
    /// the mean of the projected corners.
    pub fn center(&self) -> GeorefResult<GeoPoint> {
        let mut sum = glam::DVec2::ZERO;
        for c in self.corners() {
            sum += projection::project(c)?.to_vec();
        }
        Ok(projection::unproject(ProjectedPoint::from_vec(sum / 4.0)))
    }

    pub fn approx_eq(&self, other: &BoundsQuad, tolerance: f64) -> bool {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

/// Map the image corners through a transform.
///
/// # Arguments
///
/// * `transform` - Solved transform
/// * `width` - Source width in native pixels
/// * `height` - Source height in native pixels
///
/// # Returns
///
/// Corners in `[top_left, top_right, bottom_right, bottom_left]` order.
pub fn compute_bounds(transform: &Transform, width: u32, height: u32) -> BoundsQuad {
    let (w, h) = (width as f64, height as f64);
    BoundsQuad::from_corners([
        transform.forward(ImagePoint::new(0.0, 0.0)),
        transform.forward(ImagePoint::new(w, 0.0)),
        transform.forward(ImagePoint::new(w, h)),
        transform.forward(ImagePoint::new(0.0, h)),
    ])
}

/// Map an arbitrary image point to a geographic coordinate.
pub fn map_point(transform: &Transform, point: ImagePoint) -> GeoPoint {
    transform.forward(point)
}

/// Map a geographic coordinate to an image point.
///
/// # Errors
///
/// `OutOfDomain` if `geo` cannot be projected.
pub fn map_inverse(transform: &Transform, geo: GeoPoint) -> GeorefResult<ImagePoint> {
    transform.inverse(geo)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
