//! Spherical Web Mercator projection (EPSG:3857).
//!
//! Provides a locally metric planar space in which distances and angles
//! between control points can be measured. The sphere radius is the WGS84
//! semi-major axis, the same constant web map tiles use, so projected meters
//! line up with the basemap the overlay is drawn on.
//!
//! # Formulas
//!
//! ```text
//! x = R * λ
//! y = R * ln(tan(π/4 + φ/2))
//!
//! λ = x / R
//! φ = 2 * atan(exp(y / R)) - π/2
//! ```
//!
//! Projected meters are only true ground meters on the equator; elsewhere they
//! are stretched by [`scale_factor`] (`sec φ`).

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use crate::error::{GeorefError, GeorefResult};
use crate::types::{GeoPoint, ProjectedPoint};

/// Sphere radius in meters (WGS84 semi-major axis).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude magnitude (degrees) at and beyond which projection is refused.
pub const MAX_LATITUDE: f64 = 89.9999;

/// Maximum longitude magnitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Check that a coordinate lies inside the projection domain.
pub fn check_domain(geo: GeoPoint) -> GeorefResult<()> {
    if !geo.longitude.is_finite() || !geo.latitude.is_finite() {
        return Err(GeorefError::OutOfDomain(format!(
            "non-finite coordinate ({}, {})",
            geo.longitude, geo.latitude
        )));
    }
    if geo.longitude.abs() > MAX_LONGITUDE {
        return Err(GeorefError::OutOfDomain(format!(
            "longitude {:.6} outside [-{MAX_LONGITUDE}, {MAX_LONGITUDE}]",
            geo.longitude
        )));
    }
    if geo.latitude.abs() >= MAX_LATITUDE {
        return Err(GeorefError::OutOfDomain(format!(
            "latitude {:.6} too close to a pole (|lat| must be < {MAX_LATITUDE})",
            geo.latitude
        )));
    }
    Ok(())
}

/// Project a geographic coordinate to Web Mercator meters.
///
/// # Errors
///
/// Returns `OutOfDomain` when the latitude is within 0.0001° of a pole, the
/// longitude is outside [-180, 180], or either value is not finite.
pub fn project(geo: GeoPoint) -> GeorefResult<ProjectedPoint> {
    check_domain(geo)?;

    let lambda = geo.longitude.to_radians();
    let phi = geo.latitude.to_radians();

    let x = EARTH_RADIUS_M * lambda;
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + phi / 2.0).tan().ln();

    Ok(ProjectedPoint::new(x, y))
}

/// Convert Web Mercator meters back to a geographic coordinate.
///
/// Total: every finite projected point has a latitude strictly inside
/// (-90, 90). Longitudes are not wrapped, so points east or west of the
/// projected world edge come back beyond ±180.
pub fn unproject(p: ProjectedPoint) -> GeoPoint {
    let longitude = (p.x / EARTH_RADIUS_M).to_degrees();
    let latitude = (2.0 * (p.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    GeoPoint::new(longitude, latitude)
}

/// Mercator point scale factor at a latitude (degrees).
///
/// A ground distance of one meter spans `scale_factor(lat)` projected meters.
pub fn scale_factor(latitude: f64) -> f64 {
    1.0 / latitude.to_radians().cos()
}

/// Approximate ground distance in meters between two coordinates.
///
/// Uses the projected distance corrected by the scale factor at the mean
/// latitude; accurate for the short baselines of a single map sheet.
pub fn ground_distance(a: GeoPoint, b: GeoPoint) -> GeorefResult<f64> {
    let pa = project(a)?;
    let pb = project(b)?;
    let mean_lat = (a.latitude + b.latitude) / 2.0;
    Ok(pa.distance(&pb) / scale_factor(mean_lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_zero() {
        let p = project(GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_extent() {
        // Web Mercator world extent is ±20037508.34 m
        let p = project(GeoPoint::new(180.0, 0.0)).unwrap();
        assert!((p.x - 20_037_508.342_789_244).abs() < 1e-6);
    }

    #[test]
    fn test_known_value() {
        // 85.0511287798° is the latitude where y equals the x extent
        let p = project(GeoPoint::new(0.0, 85.051_128_779_8)).unwrap();
        assert!((p.y - 20_037_508.342_789_244).abs() < 1e-2, "y was {}", p.y);
    }

    #[test]
    fn test_round_trip() {
        let geo = GeoPoint::new(13.845, 46.6085);
        let back = unproject(project(geo).unwrap());
        assert!(back.approx_eq(&geo, 1e-12));
    }

    #[test]
    fn test_northward_is_positive_y() {
        let south = project(GeoPoint::new(10.0, 45.0)).unwrap();
        let north = project(GeoPoint::new(10.0, 46.0)).unwrap();
        assert!(north.y > south.y);
    }

    #[test]
    fn test_pole_rejected() {
        for lat in [90.0, -90.0, 89.9999, -89.9999, 95.0] {
            let result = project(GeoPoint::new(0.0, lat));
            assert!(
                matches!(result, Err(GeorefError::OutOfDomain(_))),
                "latitude {} should be rejected",
                lat
            );
        }
    }

    #[test]
    fn test_near_pole_accepted() {
        assert!(project(GeoPoint::new(0.0, 89.9998)).is_ok());
        assert!(project(GeoPoint::new(0.0, -89.9998)).is_ok());
    }

    #[test]
    fn test_longitude_out_of_range_rejected() {
        assert!(matches!(
            project(GeoPoint::new(180.0001, 0.0)),
            Err(GeorefError::OutOfDomain(_))
        ));
        assert!(matches!(
            project(GeoPoint::new(-200.0, 0.0)),
            Err(GeorefError::OutOfDomain(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(project(GeoPoint::new(f64::NAN, 0.0)).is_err());
        assert!(project(GeoPoint::new(0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_scale_factor() {
        assert!((scale_factor(0.0) - 1.0).abs() < 1e-12);
        assert!((scale_factor(60.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ground_distance_one_degree_on_equator() {
        let d = ground_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0)).unwrap();
        // 2πR / 360
        assert!((d - 111_319.490_793_273_57).abs() < 1e-3, "distance was {}", d);
    }

    #[test]
    fn test_ground_distance_shrinks_with_latitude() {
        let equator = ground_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.0)).unwrap();
        let north = ground_distance(GeoPoint::new(0.0, 60.0), GeoPoint::new(0.01, 60.0)).unwrap();
        assert!((north / equator - 0.5).abs() < 1e-6);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
