//! Two-point similarity solve.
//!
//! # Model
//!
//! For both control pairs the solved transform satisfies
//!
//! ```text
//! project(geo_i) = t + s * R(θ) * F(image_i)
//! ```
//!
//! where `F(x, y) = (x, -y)` turns the downward image y axis into the upward
//! projected y axis, `s` is meters per pixel and `R(θ)` rotates
//! counter-clockwise.
//!
//! Two correspondences give four equations, which is exactly the four
//! degrees of freedom of a similarity transform (scale, rotation, 2D
//! translation). Independent axis scaling or shear would need a third point.
//!
//! # Algorithm
//!
//! ```text
//! d_img = F(image_2) - F(image_1)
//! d_geo = project(geo_2) - project(geo_1)
//! s     = |d_geo| / |d_img|
//! θ     = atan2(d_geo) - atan2(d_img)        normalized to (-180°, 180°]
//! t     = project(geo_1) - s * R(θ) * F(image_1)
//! ```

use std::fmt;

use glam::DVec2;
use log::{debug, trace};

use crate::config::GeorefConfig;
use crate::control_points::ControlPointSet;
use crate::error::{GeorefError, GeorefResult};
use crate::projection;
use crate::types::{ControlPointPair, GeoPoint, ImagePoint, ProjectedPoint};

/// Normalize an angle in degrees to the half-open range (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// A solved similarity transform from image pixels to geographic coordinates.
///
/// The translation anchor is the geographic location of pixel `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
    rotation_degrees: f64,
    translation: GeoPoint,
    /// `translation` in projected meters, kept so mapping never re-validates.
    origin: ProjectedPoint,
}

impl Transform {
    /// Build a transform from its persisted parameters.
    ///
    /// # Errors
    ///
    /// - `DegenerateInput` if `scale` is not a finite positive number
    /// - `MalformedDocument` if `rotation_degrees` is not finite or lies
    ///   outside (-180, 180]
    /// - `OutOfDomain` if the translation anchor cannot be projected
    pub fn new(scale: f64, rotation_degrees: f64, translation: GeoPoint) -> GeorefResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeorefError::DegenerateInput(format!(
                "scale must be finite and positive, got {}",
                scale
            )));
        }
        if !rotation_degrees.is_finite() || rotation_degrees <= -180.0 || rotation_degrees > 180.0 {
            return Err(GeorefError::malformed(format!(
                "rotation must be finite and within (-180, 180], got {}",
                rotation_degrees
            )));
        }
        let origin = projection::project(translation)?;
        Ok(Self {
            scale,
            rotation_degrees,
            translation,
            origin,
        })
    }

    /// Meters (projected) per source pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Counter-clockwise rotation from image axes to map axes, in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    /// Geographic location of pixel `(0, 0)`.
    pub fn translation(&self) -> GeoPoint {
        self.translation
    }

    /// Approximate ground meters per pixel at the anchor latitude.
    pub fn ground_resolution(&self) -> f64 {
        self.scale / projection::scale_factor(self.translation.latitude)
    }

    #[inline]
    fn rotation(&self) -> DVec2 {
        DVec2::from_angle(self.rotation_degrees.to_radians())
    }

    /// Map an image point into projected meters.
    pub fn forward_projected(&self, p: ImagePoint) -> ProjectedPoint {
        let v = self.origin.to_vec() + self.scale * self.rotation().rotate(p.flipped());
        ProjectedPoint::from_vec(v)
    }

    /// Map an image point to a geographic coordinate.
    pub fn forward(&self, p: ImagePoint) -> GeoPoint {
        projection::unproject(self.forward_projected(p))
    }

    /// Map projected meters back into image space.
    pub fn inverse_projected(&self, p: ProjectedPoint) -> GeorefResult<ImagePoint> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(GeorefError::DegenerateInput(
                "cannot invert a transform with zero scale".to_string(),
            ));
        }
        let v = (p.to_vec() - self.origin.to_vec()) / self.scale;
        let unrotated = DVec2::from_angle(-self.rotation_degrees.to_radians()).rotate(v);
        Ok(ImagePoint::from_flipped(unrotated))
    }

    /// Map a geographic coordinate back to an image point.
    ///
    /// # Errors
    ///
    /// `OutOfDomain` if `geo` cannot be projected.
    pub fn inverse(&self, geo: GeoPoint) -> GeorefResult<ImagePoint> {
        self.inverse_projected(projection::project(geo)?)
    }

    /// Pixel error of each control pair under this transform.
    ///
    /// Near zero for the set the transform was solved from; a large residual
    /// means the set changed and the transform is stale.
    pub fn residuals(&self, set: &ControlPointSet) -> GeorefResult<[f64; 2]> {
        let residual = |pair: &ControlPointPair| -> GeorefResult<f64> {
            Ok(self.inverse(pair.geo)?.distance(&pair.image))
        };
        Ok([residual(set.first())?, residual(set.second())?])
    }

    /// Parameter comparison with absolute tolerances: `param_tolerance` for
    /// scale and rotation, `coord_tolerance` (degrees) for the anchor.
    pub fn approx_eq(&self, other: &Transform, param_tolerance: f64, coord_tolerance: f64) -> bool {
        (self.scale - other.scale).abs() <= param_tolerance
            && (self.rotation_degrees - other.rotation_degrees).abs() <= param_tolerance
            && self.translation.approx_eq(&other.translation, coord_tolerance)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Similarity(scale={:.6} m/px, rot={:.4}°, anchor=({:.6}, {:.6}))",
            self.scale, self.rotation_degrees, self.translation.longitude, self.translation.latitude
        )
    }
}

/// Derives similarity transforms from validated control point sets.
#[derive(Debug, Clone, Default)]
pub struct SimilaritySolver {
    config: GeorefConfig,
}

impl SimilaritySolver {
    pub fn new(config: GeorefConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeorefConfig {
        &self.config
    }

    /// Solve the unique similarity transform for a control point set.
    ///
    /// The set is validated first, so degenerate or out-of-domain input is
    /// reported before any arithmetic.
    ///
    /// # Errors
    ///
    /// - `DegenerateInput` for coincident or near-coincident points
    /// - `OutOfDomain` for unprojectable control points, or when pixel
    ///   `(0, 0)` would land outside the projection domain
    pub fn solve(&self, set: &ControlPointSet) -> GeorefResult<Transform> {
        set.validate(&self.config)?;

        let first = set.first();
        let second = set.second();

        let g1 = projection::project(first.geo)?.to_vec();
        let g2 = projection::project(second.geo)?.to_vec();
        let i1 = first.image.flipped();
        let i2 = second.image.flipped();

        let d_img = i2 - i1;
        let d_geo = g2 - g1;
        trace!("solve deltas: image={:?} projected={:?}", d_img, d_geo);

        let img_len = d_img.length();
        if img_len < self.config.min_pixel_separation || img_len == 0.0 {
            return Err(GeorefError::DegenerateInput(format!(
                "image baseline of {:.3} px is too short",
                img_len
            )));
        }

        let scale = d_geo.length() / img_len;
        if scale == 0.0 || !scale.is_finite() {
            return Err(GeorefError::DegenerateInput(format!(
                "solved scale {} is not usable",
                scale
            )));
        }

        let theta = d_geo.y.atan2(d_geo.x) - d_img.y.atan2(d_img.x);
        let rotation_degrees = normalize_degrees(theta.to_degrees());

        let rotated = DVec2::from_angle(rotation_degrees.to_radians()).rotate(i1);
        let origin = ProjectedPoint::from_vec(g1 - scale * rotated);
        let translation = projection::unproject(origin);
        projection::check_domain(translation)?;

        let transform = Transform {
            scale,
            rotation_degrees,
            translation,
            origin,
        };
        debug!(
            "solved {} from control points '{}' and '{}'",
            transform, first.id, second.id
        );
        Ok(transform)
    }
}

/// Solve a transform from two pairs using the default configuration.
pub fn solve(first: ControlPointPair, second: ControlPointPair) -> GeorefResult<Transform> {
    SimilaritySolver::default().solve(&ControlPointSet::new(first, second))
}



// ============================================================================
// Property-Based Tests
// ============================================================================
