//! Proof Snapshot Store: the result of every resolution, kept forever.
//!
//! Each query records a new [`ResolutionSnapshot`] under the next
//! [`ProofIndex`], even when neither the store nor the queried role changed.
//! Snapshots are never mutated, invalidated or recomputed, so results of
//! different queries can be compared after the fact.

#![deny(unsafe_code)]

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::ProofError;
pub use snapshot::ResolutionSnapshot;
pub use store::ProofStore;

pub use rt_types::ProofIndex;
