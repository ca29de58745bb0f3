//! Error types for variational message passing nodes.

use thiserror::Error;

/// Errors that can occur while building, observing or querying nodes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmpError {
    /// An alternative message approximation was requested but is not available
    #[error("Unsupported approximation: {0}")]
    UnsupportedApproximation(String),

    /// Invalid node configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An observed statistic does not have shape `plates + dims[index]`
    #[error(
        "Dimensionality of the observations incorrect for moment {index}.\n\
         Shape of input: {got:?}\n\
         Expected shape: {expected:?}\n\
         Check plates."
    )]
    ShapeMismatch {
        index: usize,
        got: Vec<usize>,
        expected: Vec<usize>,
    },

    /// Number of computed statistics differs from the number of moment slots
    #[error("Expected {expected} moment arrays, got {got}")]
    MomentCountMismatch { expected: usize, got: usize },

    /// Plate shapes that cannot be broadcast together
    #[error("Plate shapes {left:?} and {right:?} are not broadcastable")]
    PlateMismatch { left: Vec<usize>, right: Vec<usize> },

    /// Mask that cannot be broadcast against the node plates
    #[error("Mask of shape {mask:?} is not broadcastable to plates {plates:?}")]
    InvalidMask {
        mask: Vec<usize>,
        plates: Vec<usize>,
    },

    /// Parent index does not exist
    #[error("Parent index {index} out of range for node with {count} parents")]
    ParentIndexOutOfRange { index: usize, count: usize },

    /// Node not found in the model graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Moments requested before the node was observed or updated
    #[error("Moments of node '{0}' are undefined")]
    MomentsUndefined(String),

    /// Observed data outside the support of the moments conversion
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// Operation not supported by this node type
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Error raised by a user supplied log-density
    #[error("Log-density evaluation failed: {0}")]
    Density(String),
}

/// Result type for VMP operations.
pub type Result<T> = std::result::Result<T, VmpError>;
