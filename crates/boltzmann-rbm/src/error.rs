use boltzmann_core::MatrixError;
use thiserror::Error;

use crate::units::VisibleUnitType;

/// Errors raised by RBM construction, training and inference.
///
/// All of these are precondition violations: the operation returns before
/// touching parameters or chain state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RbmError {
    #[error("RBM parameters are not initialized; call initialize() first")]
    NotInitialized,

    #[error("Cannot add visible groups after the parameters have been initialized")]
    AlreadyInitialized,

    #[error("Number of features ({got}) must match the RBM's number of visible units ({expected})")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Visible group index ({index}) out of bounds ({count})")]
    GroupIndex { index: usize, count: usize },

    #[error("Evidence has {got} rows but visible group {group} has {expected} units")]
    EvidenceMismatch {
        group: usize,
        expected: usize,
        got: usize,
    },

    #[error("Parameter buffer has length {got}, expected {expected}")]
    ParameterLength { expected: usize, got: usize },

    #[error(
        "{operation} is only supported for binary visible units, group {group} is {unit_type:?}"
    )]
    UnsupportedUnitType {
        operation: &'static str,
        group: usize,
        unit_type: VisibleUnitType,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature matrix has no samples")]
    EmptyFeatures,

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type RbmResult<T> = Result<T, RbmError>;
