//! Error taxonomy for a packing request.
//!
//! Geometric infeasibility and cancellation are NOT errors — they surface as
//! unpacked items and as the `Cancelled` search outcome. Everything here
//! aborts the whole request: bad input, a store failure, or an algorithm
//! task dying unexpectedly.

use crate::model::ValidationError;
use crate::store::StoreError;

/// A request-level failure. No partial result is persisted for these.
#[derive(Debug)]
pub enum SolverError {
    /// Manifest/shipment/type data missing or malformed.
    Input(String),
    /// Entity construction from upstream data failed validation.
    Validation(ValidationError),
    /// The data-store collaborator failed.
    Store(StoreError),
    /// An algorithm task raised an unhandled fault.
    AlgorithmFailure(String),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::Input(msg) => write!(f, "Input error: {}", msg),
            SolverError::Validation(err) => write!(f, "Validation error: {}", err),
            SolverError::Store(err) => write!(f, "Store error: {}", err),
            SolverError::AlgorithmFailure(msg) => write!(f, "Algorithm failure: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Validation(err) => Some(err),
            SolverError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SolverError {
    fn from(err: ValidationError) -> Self {
        SolverError::Validation(err)
    }
}

impl From<StoreError> for SolverError {
    fn from(err: StoreError) -> Self {
        SolverError::Store(err)
    }
}
