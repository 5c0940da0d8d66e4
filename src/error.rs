//! Error type shared by loading, conversion and interpolation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::surface::FieldKind;

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Describes why a surface operation failed.
///
/// Load failures (`FileNotFound`, `Format`, `Xml`) leave the store empty.
/// The remaining variants abort a single query or conversion and leave the
/// store untouched.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The input file could not be opened.
    #[error("could not open '{}': {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Malformed section, wrong cell arity or an array length that does not
    /// match its declared count.
    #[error("malformed surface data: {0}")]
    Format(String),
    /// The XML document could not be deserialized.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// A query or conversion named a field that is not stored.
    #[error("{kind} field '{name}' does not exist")]
    FieldNotFound { kind: FieldKind, name: String },
    /// No surface feature was found for a target point.
    #[error("interpolation at point {coordinates:?} failed")]
    InterpolationFailed { coordinates: Vec<f64> },
    /// Conversions only go from cell to point fields or back.
    #[error("unsupported conversion from {from} field to {to} field")]
    UnsupportedConversion { from: FieldKind, to: FieldKind },
    /// The marker slice must run parallel to the target points.
    #[error("{markers} markers given for {points} target points")]
    MarkerCount { points: usize, markers: usize },
    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SurfaceError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// `true` for errors that abort a load and leave the store empty.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::Format(_) | Self::Xml(_))
    }
}
