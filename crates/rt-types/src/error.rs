use thiserror::Error;

/// Errors raised while parsing or constructing core identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("role name is too long: {0} bytes (max 32)")]
    RoleNameTooLong(usize),
}
