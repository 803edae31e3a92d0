//! Role Graph Resolver: computes weighted role membership over the
//! credential graph.
//!
//! Role graphs may be cyclic (`Charles.friend ← Charles.friend.friend`), so
//! resolution is an iterative worklist fixpoint rather than recursion. Each
//! role keeps one entry per member carrying the best weight derivable over
//! any chain, where a chain's weight is the minimum along it. Sets only grow
//! and weights only rise, both bounded, so evaluation terminates.
//!
//! Two strategies share the same rules and produce the same memberships:
//!
//! - [`SearchMode::Forward`]: breadth-first queue outward from the queried role.
//! - [`SearchMode::Backward`]: depth-first, goal-directed. A role that reads
//!   an unsolved role is suspended until that subgoal has been evaluated.
//!
//! Resolution never mutates the store, so a [`ResolveError::ResourceExhausted`]
//! abort is always side-effect free.

#![deny(unsafe_code)]

pub mod error;
pub mod fixpoint;
pub mod meter;
pub mod resolution;
pub mod solutions;

pub use error::ResolveError;
pub use fixpoint::Resolver;
pub use meter::{CostMeter, ResolutionCosts};
pub use resolution::{Resolution, ResolutionStats};
pub use solutions::{Derivation, Membership, Premise, RoleSolutions};

pub use rt_types::SearchMode;
