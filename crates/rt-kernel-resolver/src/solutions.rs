use indexmap::map::Entry;
use indexmap::IndexMap;
use rt_types::{CredentialId, Principal, Role, Weight};
use serde::{Deserialize, Serialize};

/// A membership fact a derivation relied on: `member ∈ role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Premise {
    pub role: Role,
    pub member: Principal,
}

impl Premise {
    pub fn new(role: Role, member: Principal) -> Self {
        Self { role, member }
    }
}

/// How a membership obtained its current weight: the credential applied and
/// the memberships it consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    pub credential: CredentialId,
    pub premises: Vec<Premise>,
}

/// One member's entry in a role's solution set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub weight: Weight,
    pub derivation: Derivation,
}

/// Solution set of a single role: one entry per member, in order of first
/// discovery, each holding the best weight found so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSolutions {
    pub role: Role,
    members: IndexMap<Principal, Membership>,
}

impl RoleSolutions {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            members: IndexMap::new(),
        }
    }

    /// Insert `member` or raise its weight.
    ///
    /// Returns `true` if the set changed. A raise keeps the member's
    /// position; an equal or lower weight is ignored.
    pub fn raise(&mut self, member: Principal, weight: Weight, derivation: Derivation) -> bool {
        match self.members.entry(member) {
            Entry::Occupied(mut entry) => {
                if entry.get().weight >= weight {
                    return false;
                }
                *entry.get_mut() = Membership { weight, derivation };
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(Membership { weight, derivation });
                true
            }
        }
    }

    pub fn weight_of(&self, member: &Principal) -> Option<Weight> {
        self.members.get(member).map(|m| m.weight)
    }

    pub fn membership(&self, member: &Principal) -> Option<&Membership> {
        self.members.get(member)
    }

    /// Entry at `position` in discovery order.
    pub fn get_index(&self, position: usize) -> Option<(Principal, Weight)> {
        self.members
            .get_index(position)
            .map(|(member, entry)| (*member, entry.weight))
    }

    /// `(member, weight)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (Principal, Weight)> + '_ {
        self.members.iter().map(|(member, entry)| (*member, entry.weight))
    }

    pub fn members(&self) -> impl DoubleEndedIterator<Item = &Principal> {
        self.members.keys()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_types::{Credential, RoleName};

    fn derivation(weight: u32) -> Derivation {
        let role = Role::new(Principal::from_label("Alice"), RoleName::from_byte(1));
        let cred = Credential::simple_member(role, Principal::from_label("Bob"), Weight::new(weight));
        Derivation {
            credential: cred.id(),
            premises: vec![],
        }
    }

    fn solutions() -> RoleSolutions {
        RoleSolutions::new(Role::new(Principal::from_label("Alice"), RoleName::from_byte(1)))
    }

    #[test]
    fn raise_keeps_best_weight_and_position() {
        let mut set = solutions();
        let bob = Principal::from_label("Bob");
        let erin = Principal::from_label("Erin");

        assert!(set.raise(bob, Weight::new(20), derivation(20)));
        assert!(set.raise(erin, Weight::new(70), derivation(70)));
        assert!(!set.raise(bob, Weight::new(20), derivation(20)));
        assert!(!set.raise(bob, Weight::new(10), derivation(10)));
        assert!(set.raise(bob, Weight::new(90), derivation(90)));

        let entries: Vec<_> = set.iter().collect();
        assert_eq!(entries, vec![(bob, Weight::new(90)), (erin, Weight::new(70))]);
        assert_eq!(set.membership(&bob).unwrap().derivation, derivation(90));
    }

    #[test]
    fn index_lookup() {
        let mut set = solutions();
        let bob = Principal::from_label("Bob");
        set.raise(bob, Weight::new(5), derivation(5));
        assert_eq!(set.get_index(0), Some((bob, Weight::new(5))));
        assert_eq!(set.get_index(1), None);
        assert_eq!(set.len(), 1);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The stored weight is the maximum ever offered, and each member
            /// keeps the position of its first offer.
            #[test]
            fn raise_keeps_maximum(offers in proptest::collection::vec((0usize..5, 1u32..=100), 1..40)) {
                let mut set = solutions();
                let mut best: Vec<(usize, u32)> = Vec::new();
                for (who, weight) in &offers {
                    let member = Principal::from_label(&format!("m{who}"));
                    set.raise(member, Weight::new(*weight), derivation(*weight));
                    match best.iter_mut().find(|(seen, _)| seen == who) {
                        Some(entry) => entry.1 = entry.1.max(*weight),
                        None => best.push((*who, *weight)),
                    }
                }

                prop_assert_eq!(set.len(), best.len());
                for (position, (who, weight)) in best.iter().enumerate() {
                    let member = Principal::from_label(&format!("m{who}"));
                    prop_assert_eq!(set.get_index(position), Some((member, Weight::new(*weight))));
                }
            }
        }
    }
}
