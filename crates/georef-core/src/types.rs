//! Point types shared by every stage of the engine.
//!
//! Three coordinate spaces are involved:
//!
//! - **Image space** ([`ImagePoint`]): native source pixels, origin top-left,
//!   y increases downward.
//! - **Geographic space** ([`GeoPoint`]): longitude/latitude in degrees.
//! - **Projected space** ([`ProjectedPoint`]): Web Mercator meters, y increases
//!   northward. Only produced by [`crate::projection::project`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GeorefResult;
use crate::projection;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Latitude in degrees (exclusive of the poles)
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Check that this coordinate can be projected.
    pub fn validate(&self) -> GeorefResult<()> {
        projection::check_domain(*self)
    }

    /// Returns true if this coordinate lies inside the projection domain.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Component-wise comparison with an absolute tolerance in degrees.
    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.longitude - other.longitude).abs() <= tolerance
            && (self.latitude - other.latitude).abs() <= tolerance
    }
}

/// A point in the planar projection's metric space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Easting in meters
    pub x: f64,
    /// Northing in meters
    pub y: f64,
}

impl ProjectedPoint {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub(crate) fn from_vec(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }

    /// Euclidean distance in projected meters.
    pub fn distance(&self, other: &ProjectedPoint) -> f64 {
        self.to_vec().distance(other.to_vec())
    }
}

/// A location in the source raster's native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    /// Column in pixels (left to right)
    pub x: f64,
    /// Row in pixels (top to bottom)
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to a y-up vector so image space shares the handedness of
    /// projected space.
    #[inline]
    pub(crate) fn flipped(self) -> DVec2 {
        DVec2::new(self.x, -self.y)
    }

    /// Inverse of [`ImagePoint::flipped`].
    #[inline]
    pub(crate) fn from_flipped(v: DVec2) -> Self {
        Self { x: v.x, y: -v.y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: &ImagePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One user-supplied correspondence between a pixel and a geographic coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointPair {
    /// Caller-chosen identifier, persisted with the document
    pub id: String,
    /// Location in the source image
    pub image: ImagePoint,
    /// Matching location on the map
    pub geo: GeoPoint,
}

impl ControlPointPair {
    pub fn new(id: impl Into<String>, image: ImagePoint, geo: GeoPoint) -> Self {
        Self {
            id: id.into(),
            image,
            geo,
        }
    }
}
