//! The two control point correspondences a transform is solved from.

use crate::config::GeorefConfig;
use crate::error::{GeorefError, GeorefResult};
use crate::projection;
use crate::types::ControlPointPair;

/// Exactly two control point pairs, addressed by order.
///
/// A set is a value: replacing a pair with [`ControlPointSet::with_first`] or
/// [`ControlPointSet::with_second`] yields a new set, and any transform solved
/// from the old one is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSet {
    pairs: [ControlPointPair; 2],
}

impl ControlPointSet {
    pub fn new(first: ControlPointPair, second: ControlPointPair) -> Self {
        Self {
            pairs: [first, second],
        }
    }

    pub fn first(&self) -> &ControlPointPair {
        &self.pairs[0]
    }

    pub fn second(&self) -> &ControlPointPair {
        &self.pairs[1]
    }

    /// Both pairs in order.
    pub fn pairs(&self) -> &[ControlPointPair; 2] {
        &self.pairs
    }

    /// A new set with the first pair replaced.
    pub fn with_first(&self, pair: ControlPointPair) -> Self {
        Self::new(pair, self.pairs[1].clone())
    }

    /// A new set with the second pair replaced.
    pub fn with_second(&self, pair: ControlPointPair) -> Self {
        Self::new(self.pairs[0].clone(), pair)
    }

    /// Check that the pairs determine a unique similarity transform.
    ///
    /// # Errors
    ///
    /// - `OutOfDomain` if either geographic point cannot be projected
    /// - `DegenerateInput` if the image points are closer than
    ///   `config.min_pixel_separation`, or the geographic points are closer
    ///   than `config.min_ground_separation_m` on the ground
    pub fn validate(&self, config: &GeorefConfig) -> GeorefResult<()> {
        let [a, b] = &self.pairs;

        for pair in &self.pairs {
            if !pair.image.is_finite() {
                return Err(GeorefError::DegenerateInput(format!(
                    "image point of '{}' is not finite",
                    pair.id
                )));
            }
        }

        let pa = projection::project(a.geo)?;
        let pb = projection::project(b.geo)?;

        let pixel_distance = a.image.distance(&b.image);
        if pixel_distance < config.min_pixel_separation {
            return Err(GeorefError::DegenerateInput(format!(
                "image points '{}' and '{}' are {:.3} px apart (minimum {} px)",
                a.id, b.id, pixel_distance, config.min_pixel_separation
            )));
        }

        // Projected meters are stretched by sec(lat), so the threshold is too
        let mean_lat = (a.geo.latitude + b.geo.latitude) / 2.0;
        let threshold = config.min_ground_separation_m * projection::scale_factor(mean_lat);
        let projected_distance = pa.distance(&pb);
        if projected_distance < threshold {
            return Err(GeorefError::DegenerateInput(format!(
                "geographic points '{}' and '{}' are {:.3} projected m apart (minimum {:.3})",
                a.id, b.id, projected_distance, threshold
            )));
        }

        Ok(())
    }
}
