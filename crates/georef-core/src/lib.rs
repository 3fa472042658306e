//! Georef Core - two-point georeferencing engine
//!
//! This crate aligns a scanned map or plan with the Earth from two control
//! point pairs. It solves a similarity transform (uniform scale, rotation,
//! translation) in Web Mercator, maps image pixels to longitude/latitude and
//! back, computes the image's geographic footprint, and persists the result
//! as a versioned JSON document.
//!
//! # Modules
//!
//! - [`projection`]: spherical Web Mercator forward/inverse
//! - [`control_points`]: the two-pair input set and its validation
//! - [`transform`]: solver, point mapping and bounds
//! - [`document`]: the persisted document and its JSON form
//! - [`source`]: reading native dimensions from an encoded raster

pub mod config;
pub mod control_points;
pub mod document;
pub mod error;
pub mod projection;
pub mod source;
pub mod transform;
pub mod types;

pub use config::GeorefConfig;
pub use control_points::ControlPointSet;
pub use document::{
    deserialize, deserialize_bytes, serialize, serialize_bytes, DocumentMetadata, LegendRemoval,
    Preparation, RemovalMode, Selection, SourceInfo, TransformDocument, TransformationKind,
};
pub use error::{GeorefError, GeorefResult};
pub use source::{SourceError, SourceImage};
pub use transform::{
    compute_bounds, map_inverse, map_point, solve, BoundsQuad, GeoExtent, SimilaritySolver,
    Transform,
};
pub use types::{ControlPointPair, GeoPoint, ImagePoint, ProjectedPoint};
