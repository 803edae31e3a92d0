use rt_types::{Principal, Role, Weight};
use thiserror::Error;

/// Errors from credential and role registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("role already registered: {0}")]
    DuplicateRole(Role),

    #[error("unknown role: {0}")]
    UnknownRole(Role),

    #[error("signer {signer} is not the owner {owner} of the defined role")]
    Unauthorized { signer: Principal, owner: Principal },

    #[error("invalid weight {weight}: must be in 1..={max}")]
    InvalidWeight { weight: Weight, max: u32 },
}
