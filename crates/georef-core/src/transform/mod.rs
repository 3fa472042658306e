//! Image-to-map transformation: solving and applying.
//!
//! This module derives a similarity transform from two control point pairs
//! and applies it to arbitrary image points and to the image corners.
//!
//! # Pipeline
//!
//! 1. Validate the control point set
//! 2. Solve scale, rotation and translation in Web Mercator meters
//! 3. Map points or corners forward (pixels -> degrees) or back
//!
//! # Coordinate System
//!
//! - Image points are native source pixels, origin top-left, y down
//! - Rotation angles are in degrees, positive = counter-clockwise on the map
//! - Scale is projected meters per pixel

mod bounds;
mod similarity;

pub use bounds::{compute_bounds, map_inverse, map_point, BoundsQuad, GeoExtent};
pub use similarity::{normalize_degrees, solve, SimilaritySolver, Transform};
