//! Error taxonomy for the georeferencing engine.
//!
//! Every failure is local and recoverable by the caller: the engine never
//! panics on bad input and never returns partial results.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type GeorefResult<T> = Result<T, GeorefError>;

/// Error types for georeferencing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeorefError {
    /// A geographic coordinate lies outside the projection domain
    /// (near the poles, longitude out of range, or not finite).
    #[error("Coordinate out of projection domain: {0}")]
    OutOfDomain(String),

    /// Control points are coincident or too close in image or map space,
    /// or the solved scale is zero.
    #[error("Degenerate control points: {0}")]
    DegenerateInput(String),

    /// The persisted document uses a major version this build cannot read.
    #[error("Incompatible document version {found} (supported major version: {supported})")]
    IncompatibleVersion {
        /// Version string found in the document.
        found: String,
        /// Supported major version.
        supported: u32,
    },

    /// The persisted document is structurally invalid or carries out-of-range data.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl GeorefError {
    /// Stable short name of the error kind, for hosts that branch on it.
    pub fn kind(&self) -> &'static str {
        match self {
            GeorefError::OutOfDomain(_) => "OutOfDomainError",
            GeorefError::DegenerateInput(_) => "DegenerateInputError",
            GeorefError::IncompatibleVersion { .. } => "IncompatibleVersionError",
            GeorefError::MalformedDocument(_) => "MalformedDocumentError",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        GeorefError::MalformedDocument(message.into())
    }
}

impl From<serde_json::Error> for GeorefError {
    fn from(err: serde_json::Error) -> Self {
        GeorefError::MalformedDocument(err.to_string())
    }
}
