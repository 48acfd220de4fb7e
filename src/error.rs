//! Error types for ascot5io
//!
//! File-format and numeric failures are passed through unchanged; the only
//! condition given its own meaning is a missing file, group or attribute.

use thiserror::Error;

use crate::context::Capability;

/// Result type alias for ascot5io operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// File, group, dataset or attribute does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Raw HDF5 library error
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// String could not be encoded as an HDF5 string
    #[error("HDF5 string error: {0}")]
    String(#[from] hdf5::types::StringError),

    /// Array shape mismatch from ndarray
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Flux basis description has the wrong number of coefficients
    #[error("Expected {expected} psi coefficients, got {found}")]
    CoefficientCount { expected: usize, found: usize },

    /// Grid triple cannot be turned into a coordinate vector
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Input value has the wrong kind
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Identifier is not a 10-digit qid
    #[error("Invalid qid: {0:?}")]
    InvalidQid(String),

    /// Evaluator does not provide the requested quantity
    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),

    /// File lacks the input a component needs
    #[error("Input not present in file: {0:?}")]
    MissingCapability(Capability),

    /// Configuration or input TOML could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `NotFound` for a path
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// True for missing file/group/attribute errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("options/opt-0000000001");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: options/opt-0000000001");
    }

    #[test]
    fn test_coefficient_count_display() {
        let err = Error::CoefficientCount { expected: 13, found: 12 };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("13"));
    }
}
