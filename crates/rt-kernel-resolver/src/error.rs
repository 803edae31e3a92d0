use rt_types::Role;
use thiserror::Error;

/// Errors from role resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown role: {0}")]
    UnknownRole(Role),

    #[error("resolution budget exhausted: limit {limit}, needed {needed}")]
    ResourceExhausted { limit: u64, needed: u64 },
}
