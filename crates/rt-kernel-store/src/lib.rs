//! Credential Store: append-only repository of RT delegation credentials.
//!
//! ## Invariants
//!
//! - **Authorization**: a credential is accepted only from the owner of the
//!   role it defines.
//! - **Explicit roles**: roles are registered with [`CredentialStore::register_role`]
//!   before any credential may define or reference them.
//! - **Bounded weights**: every credential weight lies in `1..=max_weight`.
//! - **Append-only**: there is no delete or update. Insertion cost does not
//!   depend on how many credentials are already stored.

#![deny(unsafe_code)]

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{CredentialStore, RoleRecord, StoreConfig, StoredCredential};
