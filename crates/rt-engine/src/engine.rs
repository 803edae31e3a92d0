use rt_kernel_proof::{ProofStore, ResolutionSnapshot};
use rt_kernel_resolver::Resolver;
use rt_kernel_store::CredentialStore;
use rt_types::{
    Credential, CredentialId, Principal, ProofIndex, Role, RoleName, SearchMode, Weight,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{RtError, RtResult};

/// Cost report for a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub cost: u64,
    /// Set when the mutation appended a credential.
    pub credential_id: Option<CredentialId>,
}

/// Cost report for a query, with the index of the snapshot it recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReceipt {
    pub proof_index: ProofIndex,
    pub cost: u64,
}

/// The RT engine: credential store, resolver and proof snapshots behind
/// one set of operations.
///
/// Operations are applied one at a time. Mutations append to the
/// credential store; queries resolve against everything appended before
/// them and record exactly one new snapshot. Any failure leaves both
/// stores as they were.
pub struct RtEngine {
    config: EngineConfig,
    credentials: CredentialStore,
    proofs: ProofStore,
    resolver: Resolver,
}

impl RtEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            credentials: CredentialStore::new(config.store_config()),
            proofs: ProofStore::new(),
            resolver: Resolver::new(config.costs.resolution.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn proofs(&self) -> &ProofStore {
        &self.proofs
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Register role `caller.name`.
    pub fn new_role(&mut self, caller: Principal, name: RoleName) -> RtResult<Receipt> {
        self.credentials
            .register_role(caller, name)
            .inspect_err(|err| warn!(caller = %caller, error = %err, "Role registration rejected"))?;
        Ok(Receipt {
            cost: self.config.costs.role_registration,
            credential_id: None,
        })
    }

    /// `caller.name ← member, weight`
    pub fn add_simple_member(
        &mut self,
        caller: Principal,
        name: RoleName,
        member: Principal,
        weight: u32,
    ) -> RtResult<Receipt> {
        let credential =
            Credential::simple_member(Role::new(caller, name), member, Weight::new(weight));
        self.submit(caller, credential)
    }

    /// `caller.name1 ← owner2.name2, weight`
    pub fn add_simple_inclusion(
        &mut self,
        caller: Principal,
        name1: RoleName,
        owner2: Principal,
        name2: RoleName,
        weight: u32,
    ) -> RtResult<Receipt> {
        let credential = Credential::simple_inclusion(
            Role::new(caller, name1),
            Role::new(owner2, name2),
            Weight::new(weight),
        );
        self.submit(caller, credential)
    }

    /// `caller.name1 ← owner2.name2.name3, weight`
    pub fn add_linked_inclusion(
        &mut self,
        caller: Principal,
        name1: RoleName,
        owner2: Principal,
        name2: RoleName,
        name3: RoleName,
        weight: u32,
    ) -> RtResult<Receipt> {
        let credential = Credential::linked_inclusion(
            Role::new(caller, name1),
            Role::new(owner2, name2),
            name3,
            Weight::new(weight),
        );
        self.submit(caller, credential)
    }

    /// `caller.name1 ← owner2.name2 ∩ owner3.name3, weight`
    #[allow(clippy::too_many_arguments)]
    pub fn add_intersection_inclusion(
        &mut self,
        caller: Principal,
        name1: RoleName,
        owner2: Principal,
        name2: RoleName,
        owner3: Principal,
        name3: RoleName,
        weight: u32,
    ) -> RtResult<Receipt> {
        let credential = Credential::intersection_inclusion(
            Role::new(caller, name1),
            Role::new(owner2, name2),
            Role::new(owner3, name3),
            Weight::new(weight),
        );
        self.submit(caller, credential)
    }

    /// Append a credential signed by `signer`.
    pub fn submit(&mut self, signer: Principal, credential: Credential) -> RtResult<Receipt> {
        let id = self
            .credentials
            .insert(signer, credential)
            .inspect_err(|err| warn!(signer = %signer, error = %err, "Credential rejected"))?;
        Ok(Receipt {
            cost: self.config.costs.credential_insertion,
            credential_id: Some(id),
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Forward search of `owner.name`, under the configured default budget.
    pub fn search(&mut self, owner: Principal, name: RoleName) -> RtResult<QueryReceipt> {
        let budget = self.config.default_budget;
        self.query(Role::new(owner, name), SearchMode::Forward, budget)
    }

    /// Goal-directed search of `owner.name`, under the configured default budget.
    pub fn backward_search(&mut self, owner: Principal, name: RoleName) -> RtResult<QueryReceipt> {
        let budget = self.config.default_budget;
        self.query(Role::new(owner, name), SearchMode::Backward, budget)
    }

    pub fn search_with_budget(
        &mut self,
        owner: Principal,
        name: RoleName,
        budget: u64,
    ) -> RtResult<QueryReceipt> {
        self.query(Role::new(owner, name), SearchMode::Forward, Some(budget))
    }

    pub fn backward_search_with_budget(
        &mut self,
        owner: Principal,
        name: RoleName,
        budget: u64,
    ) -> RtResult<QueryReceipt> {
        self.query(Role::new(owner, name), SearchMode::Backward, Some(budget))
    }

    /// Resolve `role` and record the result as a new snapshot.
    ///
    /// The snapshot is only recorded once the whole cost, including the
    /// per-entry snapshot charge, fits the budget.
    pub fn query(
        &mut self,
        role: Role,
        mode: SearchMode,
        budget: Option<u64>,
    ) -> RtResult<QueryReceipt> {
        let resolution = self
            .resolver
            .resolve(&self.credentials, role, mode, budget)
            .inspect_err(|err| warn!(role = %role, mode = %mode, error = %err, "Query failed"))?;

        let entries: u64 = resolution
            .solutions
            .values()
            .map(|set| set.len() as u64)
            .sum();
        let cost = resolution
            .cost
            .saturating_add(entries.saturating_mul(self.config.costs.snapshot_entry));
        if let Some(limit) = budget {
            if cost > limit {
                warn!(role = %role, limit, needed = cost, "Snapshot exceeds query budget");
                return Err(RtError::ResourceExhausted {
                    limit,
                    needed: cost,
                });
            }
        }

        let proof_index = self.proofs.record(resolution, cost);
        debug!(role = %role, proof_index = proof_index.0, entries, "Query complete");
        Ok(QueryReceipt { proof_index, cost })
    }

    // =========================================================================
    // SNAPSHOT ACCESSORS
    // =========================================================================

    pub fn role_solutions_count(
        &self,
        proof_index: ProofIndex,
        owner: Principal,
        name: RoleName,
    ) -> RtResult<usize> {
        Ok(self
            .proofs
            .role_solutions_count(proof_index, &Role::new(owner, name))?)
    }

    pub fn role_solution(
        &self,
        proof_index: ProofIndex,
        owner: Principal,
        name: RoleName,
        position: usize,
    ) -> RtResult<(Principal, Weight)> {
        Ok(self
            .proofs
            .role_solution(proof_index, &Role::new(owner, name), position)?)
    }

    /// Solution count of the role the snapshot was queried for.
    pub fn proof_solution_count(&self, proof_index: ProofIndex) -> RtResult<usize> {
        Ok(self.proofs.proof_solution_count(proof_index)?)
    }

    pub fn proof_solution(
        &self,
        proof_index: ProofIndex,
        position: usize,
    ) -> RtResult<(Principal, Weight)> {
        Ok(self.proofs.proof_solution(proof_index, position)?)
    }

    pub fn snapshot(&self, proof_index: ProofIndex) -> RtResult<&ResolutionSnapshot> {
        Ok(self.proofs.snapshot(proof_index)?)
    }

    /// Credentials supporting the queried role's memberships in a snapshot.
    pub fn certificate(&self, proof_index: ProofIndex) -> RtResult<Vec<CredentialId>> {
        Ok(self.proofs.snapshot(proof_index)?.certificate())
    }
}

impl Default for RtEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
