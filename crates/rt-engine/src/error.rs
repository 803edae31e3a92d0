use rt_kernel_proof::ProofError;
use rt_kernel_resolver::ResolveError;
use rt_kernel_store::StoreError;
use rt_types::{Principal, ProofIndex, Role, Weight};
use thiserror::Error;

/// Every failure the engine reports.
///
/// Component errors are flattened into these kinds so a caller can tell
/// "role not yet created" from "not authorized" from "budget exhausted"
/// with a single match. No failure leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RtError {
    #[error("role already registered: {0}")]
    DuplicateRole(Role),

    #[error("unknown role: {0}")]
    UnknownRole(Role),

    #[error("signer {signer} is not the owner {owner} of the defined role")]
    Unauthorized { signer: Principal, owner: Principal },

    #[error("invalid weight {weight}: must be in 1..={max}")]
    InvalidWeight { weight: Weight, max: u32 },

    #[error("unknown proof index: {0}")]
    UnknownProofIndex(ProofIndex),

    #[error("solution position {position} out of range (count {count})")]
    IndexOutOfRange { position: usize, count: usize },

    #[error("resource budget exhausted: limit {limit}, needed {needed}")]
    ResourceExhausted { limit: u64, needed: u64 },
}

pub type RtResult<T> = Result<T, RtError>;

impl From<StoreError> for RtError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateRole(role) => RtError::DuplicateRole(role),
            StoreError::UnknownRole(role) => RtError::UnknownRole(role),
            StoreError::Unauthorized { signer, owner } => RtError::Unauthorized { signer, owner },
            StoreError::InvalidWeight { weight, max } => RtError::InvalidWeight { weight, max },
        }
    }
}

impl From<ResolveError> for RtError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownRole(role) => RtError::UnknownRole(role),
            ResolveError::ResourceExhausted { limit, needed } => {
                RtError::ResourceExhausted { limit, needed }
            }
        }
    }
}

impl From<ProofError> for RtError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::UnknownProofIndex(index) => RtError::UnknownProofIndex(index),
            ProofError::IndexOutOfRange { position, count } => {
                RtError::IndexOutOfRange { position, count }
            }
        }
    }
}
