use rt_kernel_resolver::Resolution;
use rt_types::{Principal, ProofIndex, Role, Weight};
use tracing::info;

use crate::error::ProofError;
use crate::snapshot::ResolutionSnapshot;

/// Proof Snapshot Store: arena of immutable snapshots addressed by
/// [`ProofIndex`]. APPEND-ONLY.
#[derive(Default)]
pub struct ProofStore {
    snapshots: Vec<ResolutionSnapshot>,
}

impl ProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next recorded snapshot will receive.
    pub fn next_index(&self) -> ProofIndex {
        ProofIndex(self.snapshots.len() as u64)
    }

    /// Store `resolution` under the next index.
    pub fn record(&mut self, resolution: Resolution, cost: u64) -> ProofIndex {
        let proof_index = self.next_index();
        let snapshot = ResolutionSnapshot::new(proof_index, cost, resolution);
        info!(
            proof_index = proof_index.0,
            query = %snapshot.query(),
            mode = %snapshot.mode(),
            solutions = snapshot.answer().map_or(0, |set| set.len()),
            cost,
            "Recorded resolution snapshot"
        );
        self.snapshots.push(snapshot);
        proof_index
    }

    pub fn snapshot(&self, proof_index: ProofIndex) -> Result<&ResolutionSnapshot, ProofError> {
        usize::try_from(proof_index.0)
            .ok()
            .and_then(|position| self.snapshots.get(position))
            .ok_or(ProofError::UnknownProofIndex(proof_index))
    }

    /// Number of solutions `role` had in snapshot `proof_index`.
    pub fn role_solutions_count(
        &self,
        proof_index: ProofIndex,
        role: &Role,
    ) -> Result<usize, ProofError> {
        Ok(self.snapshot(proof_index)?.solutions_count(role))
    }

    /// Solution at `position` of `role` in snapshot `proof_index`.
    pub fn role_solution(
        &self,
        proof_index: ProofIndex,
        role: &Role,
        position: usize,
    ) -> Result<(Principal, Weight), ProofError> {
        let snapshot = self.snapshot(proof_index)?;
        snapshot
            .solution(role, position)
            .ok_or(ProofError::IndexOutOfRange {
                position,
                count: snapshot.solutions_count(role),
            })
    }

    /// Number of solutions of the snapshot's queried role.
    pub fn proof_solution_count(&self, proof_index: ProofIndex) -> Result<usize, ProofError> {
        let snapshot = self.snapshot(proof_index)?;
        Ok(snapshot.solutions_count(&snapshot.query()))
    }

    /// Solution at `position` of the snapshot's queried role.
    pub fn proof_solution(
        &self,
        proof_index: ProofIndex,
        position: usize,
    ) -> Result<(Principal, Weight), ProofError> {
        let query = self.snapshot(proof_index)?.query();
        self.role_solution(proof_index, &query, position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolutionSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
