//! RT Engine: role-based trust management over weighted credentials.
//!
//! [`RtEngine`] is the single entry point. Principals register roles they
//! own and issue credentials defining them; queries resolve a role's
//! membership and keep the result as an immutable snapshot addressed by a
//! [`ProofIndex`].
//!
//! ```text
//! new_role / add_* ──► CredentialStore (append-only)
//!                             │ read
//!                             ▼
//! search / backward_search ──► Resolver ──► ProofStore (append-only)
//!                                                 │
//! role_solutions_count / role_solution ◄──────────┘
//! ```
//!
//! # Invariants
//!
//! - Only the owner of a role can define it.
//! - Every referenced role must exist when the credential is inserted,
//!   except the linked name of a linked inclusion.
//! - Weights lie in `1..=max_weight`; a derived membership weighs the
//!   minimum along its chain and the maximum over all chains.
//! - Every successful query records exactly one snapshot; indices are
//!   dense and increasing from zero.
//! - A failed operation changes nothing.

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;

pub use config::{CostSchedule, EngineConfig};
pub use engine::{QueryReceipt, Receipt, RtEngine};
pub use error::{RtError, RtResult};

pub use rt_kernel_proof::ResolutionSnapshot;
pub use rt_kernel_resolver::{Derivation, Premise, ResolutionCosts, ResolutionStats};
pub use rt_types::{
    Credential, CredentialBody, CredentialId, CredentialKind, Principal, ProofIndex, Role,
    RoleName, SearchMode, Weight,
};
