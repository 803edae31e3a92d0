//! Core types for the RT trust-management engine.
//!
//! RT credentials delegate authority over *roles*. A role is a name scoped to
//! an owning principal (`Alice.friend`), and its membership is defined by the
//! credentials that owner issues:
//!
//! | Kind | Shape |
//! |---|---|
//! | Simple member | `R ← P, w` |
//! | Simple inclusion | `R1 ← R2, w` |
//! | Linked inclusion | `R1 ← R2.R3, w` |
//! | Intersection inclusion | `R1 ← R2 ∩ R3, w` |
//!
//! Every credential carries a [`Weight`]. Weights attenuate along a derivation
//! chain: a derived membership never carries more trust than the weakest link
//! that produced it.

#![deny(unsafe_code)]

pub mod credential;
pub mod error;
pub mod ids;
pub mod principal;
pub mod role;
pub mod weight;

pub use credential::{Credential, CredentialBody, CredentialId, CredentialKind};
pub use error::TypeError;
pub use ids::{ProofIndex, SearchMode};
pub use principal::Principal;
pub use role::{Role, RoleName};
pub use weight::Weight;
