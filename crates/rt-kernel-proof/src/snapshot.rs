use rt_kernel_resolver::{Resolution, ResolutionStats, RoleSolutions};
use rt_types::{CredentialId, Principal, ProofIndex, Role, SearchMode, Weight};
use serde::Serialize;

/// Immutable record of one resolution.
///
/// Holds the solution set of every role the resolution visited, not only
/// the queried one.
#[derive(Clone, Debug, Serialize)]
pub struct ResolutionSnapshot {
    pub proof_index: ProofIndex,
    /// Total cost charged for the query that produced this snapshot.
    pub cost: u64,
    resolution: Resolution,
}

impl ResolutionSnapshot {
    pub(crate) fn new(proof_index: ProofIndex, cost: u64, resolution: Resolution) -> Self {
        Self {
            proof_index,
            cost,
            resolution,
        }
    }

    pub fn query(&self) -> Role {
        self.resolution.query
    }

    pub fn mode(&self) -> SearchMode {
        self.resolution.mode
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.resolution.stats
    }

    /// Solutions of `role`, if this resolution visited it.
    pub fn role(&self, role: &Role) -> Option<&RoleSolutions> {
        self.resolution.role(role)
    }

    /// Solutions of the queried role.
    pub fn answer(&self) -> Option<&RoleSolutions> {
        self.resolution.answer()
    }

    /// Number of solutions recorded for `role`; zero if it was not visited.
    pub fn solutions_count(&self, role: &Role) -> usize {
        self.role(role).map_or(0, |set| set.len())
    }

    pub fn solution(&self, role: &Role, position: usize) -> Option<(Principal, Weight)> {
        self.role(role).and_then(|set| set.get_index(position))
    }

    /// Roles visited, in activation order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.resolution.solutions.keys()
    }

    /// Total entries across all visited roles.
    pub fn entry_count(&self) -> usize {
        self.resolution.solutions.values().map(|set| set.len()).sum()
    }

    /// Credentials supporting the queried role's memberships.
    pub fn certificate(&self) -> Vec<CredentialId> {
        self.resolution.certificate(&self.resolution.query)
    }
}
