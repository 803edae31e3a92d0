use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use rt_types::{CredentialId, Role, SearchMode};
use serde::{Serialize, Serializer};

use crate::solutions::{Premise, RoleSolutions};

/// Work counters for one resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub roles_visited: u64,
    pub evaluations: u64,
    pub suspensions: u64,
    pub writes: u64,
}

/// Outcome of resolving one role: the solution set of every role visited
/// along the way, in activation order.
#[derive(Clone, Debug, Serialize)]
pub struct Resolution {
    pub query: Role,
    pub mode: SearchMode,
    #[serde(serialize_with = "serialize_role_sets")]
    pub solutions: IndexMap<Role, RoleSolutions>,
    pub cost: u64,
    pub stats: ResolutionStats,
}

fn serialize_role_sets<S: Serializer>(
    sets: &IndexMap<Role, RoleSolutions>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(sets.values())
}

impl Resolution {
    /// Solutions of the queried role.
    pub fn answer(&self) -> Option<&RoleSolutions> {
        self.solutions.get(&self.query)
    }

    pub fn role(&self, role: &Role) -> Option<&RoleSolutions> {
        self.solutions.get(role)
    }

    /// Credentials supporting every membership of `role`, transitively.
    ///
    /// Follows each entry's derivation through its premises. Returned in
    /// first-visit order without duplicates.
    pub fn certificate(&self, role: &Role) -> Vec<CredentialId> {
        let mut used = IndexSet::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<Premise> = match self.solutions.get(role) {
            Some(set) => set.members().rev().map(|m| Premise::new(*role, *m)).collect(),
            None => return vec![],
        };

        while let Some(premise) = stack.pop() {
            if !visited.insert(premise) {
                continue;
            }
            let Some(membership) = self
                .solutions
                .get(&premise.role)
                .and_then(|set| set.membership(&premise.member))
            else {
                continue;
            };
            used.insert(membership.derivation.credential);
            stack.extend(membership.derivation.premises.iter().rev().copied());
        }

        used.into_iter().collect()
    }
}
