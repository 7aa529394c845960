//! Error types for potential evaluation.
//!
//! The accumulation loop itself has no error path. Every precondition it
//! relies on (index ranges, buffer lengths, sign values, group size) is
//! checked once by the host entry points before any lane runs, and reported
//! through [`PotentialError`].

use thiserror::Error;

/// Errors reported by the host-side entry points.
#[derive(Debug, Error)]
pub enum PotentialError {
    /// Lane-group size must be at least one lane.
    #[error("invalid group size: {0} (must be > 0)")]
    InvalidGroupSize(usize),

    /// Batch size must cover at least one element slot.
    #[error("invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    /// A flat buffer does not have the length implied by the launch.
    #[error("{name} has length {got}, expected {expected}")]
    LengthMismatch {
        /// Buffer name
        name: &'static str,
        /// Length required by the launch
        expected: usize,
        /// Length supplied
        got: usize,
    },

    /// An element slot refers to an element the mesh does not have.
    #[error("element index {index} out of range for mesh with {num_elements} elements")]
    ElementOutOfRange {
        /// Offending element id
        index: usize,
        /// Number of mesh elements
        num_elements: usize,
    },

    /// An element refers to a vertex the mesh does not have.
    #[error("element {element} references vertex {index}, mesh has {num_vertices} vertices")]
    VertexOutOfRange {
        /// Element id
        element: usize,
        /// Offending vertex index
        index: usize,
        /// Number of mesh vertices
        num_vertices: usize,
    },

    /// Normal signs must be exactly +1 or -1.
    #[error("normal sign {sign} of element {element} is not +1 or -1")]
    InvalidNormalSign {
        /// Element id
        element: usize,
        /// Offending sign value
        sign: i32,
    },

    /// Quadrature rule is empty or inconsistent.
    #[error("invalid quadrature rule: {0}")]
    InvalidQuadrature(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading or writing a configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for potential evaluation.
pub type Result<T> = std::result::Result<T, PotentialError>;

impl PotentialError {
    /// Returns `true` if the error comes from an index or sign check on the inputs.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PotentialError::ElementOutOfRange { .. }
                | PotentialError::VertexOutOfRange { .. }
                | PotentialError::InvalidNormalSign { .. }
        )
    }

    /// Returns `true` if the error is a buffer-length mismatch.
    pub fn is_length_error(&self) -> bool {
        matches!(self, PotentialError::LengthMismatch { .. })
    }
}
