use rt_types::ProofIndex;
use thiserror::Error;

/// Errors from snapshot retrieval.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("unknown proof index: {0}")]
    UnknownProofIndex(ProofIndex),

    #[error("solution position {position} out of range (count {count})")]
    IndexOutOfRange { position: usize, count: usize },
}
