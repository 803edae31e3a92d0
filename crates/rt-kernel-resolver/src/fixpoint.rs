use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use rt_kernel_store::{CredentialStore, StoredCredential};
use rt_types::{CredentialBody, CredentialId, Principal, Role, SearchMode, Weight};
use tracing::debug;

use crate::error::ResolveError;
use crate::meter::{CostMeter, ResolutionCosts};
use crate::resolution::{Resolution, ResolutionStats};
use crate::solutions::{Derivation, Premise, RoleSolutions};

/// Role Graph Resolver.
///
/// Stateless apart from its cost schedule; the credential store is passed
/// to every call and only ever read.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    costs: ResolutionCosts,
}

impl Resolver {
    pub fn new(costs: ResolutionCosts) -> Self {
        Self { costs }
    }

    pub fn costs(&self) -> &ResolutionCosts {
        &self.costs
    }

    /// Resolve the membership of `query` against the current store.
    ///
    /// `budget` caps the total cost; exceeding it aborts with
    /// [`ResolveError::ResourceExhausted`] and nothing is returned.
    pub fn resolve(
        &self,
        store: &CredentialStore,
        query: Role,
        mode: SearchMode,
        budget: Option<u64>,
    ) -> Result<Resolution, ResolveError> {
        if !store.role_exists(&query) {
            return Err(ResolveError::UnknownRole(query));
        }

        let mut run = Fixpoint::new(store, &self.costs, mode, budget);
        run.meter.charge(self.costs.base)?;
        run.activate(query)?;
        run.schedule(query);

        while let Some(role) = run.agenda.pop() {
            run.queued.remove(&role);
            run.evaluate(role)?;
        }

        let resolution = run.finish(query);
        debug!(
            query = %query,
            mode = %mode,
            roles = resolution.stats.roles_visited,
            evaluations = resolution.stats.evaluations,
            members = resolution.answer().map_or(0, |set| set.len()),
            cost = resolution.cost,
            "Resolved role"
        );
        Ok(resolution)
    }
}

/// Pending roles. FIFO for forward search, LIFO for backward search.
enum Agenda {
    Queue(VecDeque<Role>),
    Stack(Vec<Role>),
}

impl Agenda {
    fn for_mode(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Forward => Agenda::Queue(VecDeque::new()),
            SearchMode::Backward => Agenda::Stack(Vec::new()),
        }
    }

    fn push(&mut self, role: Role) {
        match self {
            Agenda::Queue(queue) => queue.push_back(role),
            Agenda::Stack(stack) => stack.push(role),
        }
    }

    fn pop(&mut self) -> Option<Role> {
        match self {
            Agenda::Queue(queue) => queue.pop_front(),
            Agenda::Stack(stack) => stack.pop(),
        }
    }
}

struct Contribution {
    member: Principal,
    weight: Weight,
    premises: Vec<Premise>,
}

/// State of a single resolution run.
struct Fixpoint<'a> {
    store: &'a CredentialStore,
    costs: &'a ResolutionCosts,
    mode: SearchMode,
    meter: CostMeter,
    solutions: IndexMap<Role, RoleSolutions>,
    /// Role → roles whose credentials read it.
    dependents: HashMap<Role, IndexSet<Role>>,
    agenda: Agenda,
    queued: HashSet<Role>,
    stats: ResolutionStats,
}

impl<'a> Fixpoint<'a> {
    fn new(
        store: &'a CredentialStore,
        costs: &'a ResolutionCosts,
        mode: SearchMode,
        budget: Option<u64>,
    ) -> Self {
        Self {
            store,
            costs,
            mode,
            meter: CostMeter::new(budget),
            solutions: IndexMap::new(),
            dependents: HashMap::new(),
            agenda: Agenda::for_mode(mode),
            queued: HashSet::new(),
            stats: ResolutionStats::default(),
        }
    }

    /// Give `role` an empty solution set if it has none yet.
    /// Returns `true` if the role was newly activated.
    fn activate(&mut self, role: Role) -> Result<bool, ResolveError> {
        if self.solutions.contains_key(&role) {
            return Ok(false);
        }
        self.meter.charge(self.costs.role_activation)?;
        self.solutions.insert(role, RoleSolutions::new(role));
        self.stats.roles_visited += 1;
        Ok(true)
    }

    fn schedule(&mut self, role: Role) {
        if self.queued.insert(role) {
            self.agenda.push(role);
        }
    }

    fn evaluate(&mut self, role: Role) -> Result<(), ResolveError> {
        self.stats.evaluations += 1;
        let store = self.store;

        for stored in store.credentials_for(&role) {
            self.meter.charge(self.costs.credential_evaluation)?;

            let mut fresh = Vec::new();
            self.observe_body(role, &stored.credential.body, &mut fresh)?;
            if !fresh.is_empty() {
                match self.mode {
                    SearchMode::Forward => {
                        for subgoal in fresh {
                            self.schedule(subgoal);
                        }
                    }
                    SearchMode::Backward => {
                        self.suspend(role, fresh);
                        return Ok(());
                    }
                }
            }

            let (contributions, examined) = self.contributions(stored);
            self.meter
                .charge(self.costs.candidate_check.saturating_mul(examined))?;
            for contribution in contributions {
                self.apply(role, stored.id, contribution)?;
            }
        }

        Ok(())
    }

    /// Put `role` back on the agenda beneath its unsolved subgoals.
    fn suspend(&mut self, role: Role, subgoals: Vec<Role>) {
        self.stats.suspensions += 1;
        self.schedule(role);
        for subgoal in subgoals.into_iter().rev() {
            self.schedule(subgoal);
        }
    }

    /// Activate every role `body` reads and register `reader` as dependent
    /// on it. Newly activated roles are collected in `fresh`.
    fn observe_body(
        &mut self,
        reader: Role,
        body: &CredentialBody,
        fresh: &mut Vec<Role>,
    ) -> Result<(), ResolveError> {
        match body {
            CredentialBody::Member(_) => {}
            CredentialBody::Inclusion(included) => self.observe(reader, *included, fresh)?,
            CredentialBody::Linked { base, linked } => {
                self.observe(reader, *base, fresh)?;
                let links: Vec<Role> = self
                    .members_of(base)
                    .map(|(member, _)| Role::new(member, *linked))
                    .collect();
                for link in links {
                    self.observe(reader, link, fresh)?;
                }
            }
            CredentialBody::Intersection(left, right) => {
                self.observe(reader, *left, fresh)?;
                self.observe(reader, *right, fresh)?;
            }
        }
        Ok(())
    }

    fn observe(
        &mut self,
        reader: Role,
        read: Role,
        fresh: &mut Vec<Role>,
    ) -> Result<(), ResolveError> {
        if self.activate(read)? {
            fresh.push(read);
        }
        self.dependents.entry(read).or_default().insert(reader);
        Ok(())
    }

    fn members_of<'s>(&'s self, role: &Role) -> impl Iterator<Item = (Principal, Weight)> + 's {
        self.solutions
            .get(role)
            .into_iter()
            .flat_map(|set| set.iter())
    }

    /// Memberships `stored` derives from the current solution sets, and the
    /// number of candidates examined to find them.
    fn contributions(&self, stored: &StoredCredential) -> (Vec<Contribution>, u64) {
        let cap = stored.credential.weight;
        let mut out = Vec::new();
        let mut examined = 0u64;

        match &stored.credential.body {
            CredentialBody::Member(member) => {
                examined += 1;
                out.push(Contribution {
                    member: *member,
                    weight: cap,
                    premises: vec![],
                });
            }
            CredentialBody::Inclusion(included) => {
                for (member, weight) in self.members_of(included) {
                    examined += 1;
                    out.push(Contribution {
                        member,
                        weight: cap.attenuate(weight),
                        premises: vec![Premise::new(*included, member)],
                    });
                }
            }
            CredentialBody::Linked { base, linked } => {
                for (via, via_weight) in self.members_of(base) {
                    let link = Role::new(via, *linked);
                    for (member, weight) in self.members_of(&link) {
                        examined += 1;
                        out.push(Contribution {
                            member,
                            weight: cap.attenuate(via_weight).attenuate(weight),
                            premises: vec![Premise::new(*base, via), Premise::new(link, member)],
                        });
                    }
                }
            }
            CredentialBody::Intersection(left, right) => {
                let right_set = self.solutions.get(right);
                for (member, left_weight) in self.members_of(left) {
                    examined += 1;
                    if let Some(right_weight) = right_set.and_then(|set| set.weight_of(&member)) {
                        out.push(Contribution {
                            member,
                            weight: cap.attenuate(left_weight).attenuate(right_weight),
                            premises: vec![
                                Premise::new(*left, member),
                                Premise::new(*right, member),
                            ],
                        });
                    }
                }
            }
        }

        (out, examined)
    }

    fn apply(
        &mut self,
        role: Role,
        credential: CredentialId,
        contribution: Contribution,
    ) -> Result<(), ResolveError> {
        let improves = self
            .solutions
            .get(&role)
            .and_then(|set| set.weight_of(&contribution.member))
            .map_or(true, |current| current < contribution.weight);
        if !improves {
            return Ok(());
        }

        self.meter.charge(self.costs.membership_write)?;
        if let Some(set) = self.solutions.get_mut(&role) {
            set.raise(
                contribution.member,
                contribution.weight,
                Derivation {
                    credential,
                    premises: contribution.premises,
                },
            );
        }
        self.stats.writes += 1;

        let dependents: Vec<Role> = self
            .dependents
            .get(&role)
            .map(|readers| readers.iter().copied().collect())
            .unwrap_or_default();
        for dependent in dependents {
            self.schedule(dependent);
        }
        Ok(())
    }

    fn finish(self, query: Role) -> Resolution {
        Resolution {
            query,
            mode: self.mode,
            solutions: self.solutions,
            cost: self.meter.used(),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_types::{Credential, RoleName};

    fn p(label: &str) -> Principal {
        Principal::from_label(label)
    }

    fn role(owner: &str, name: u8) -> Role {
        Role::new(p(owner), RoleName::from_byte(name))
    }

    fn register(store: &mut CredentialStore, owner: &str, name: u8) {
        store.register_role(p(owner), RoleName::from_byte(name)).unwrap();
    }

    fn add(store: &mut CredentialStore, credential: Credential) {
        store.insert(credential.defines.owner, credential).unwrap();
    }

    fn sorted(resolution: &Resolution, role: &Role) -> Vec<(Principal, Weight)> {
        let mut entries: Vec<_> = resolution.role(role).unwrap().iter().collect();
        entries.sort();
        entries
    }

    /// Charles.friend ← Charles.friend.friend, 70 with the friend graph
    /// Alice→Jeffrey, Bob→Johan, Johan→Sandro. Sandro.friend is never
    /// registered.
    fn friends_store() -> CredentialStore {
        let mut store = CredentialStore::default();
        for owner in ["Bob", "Alice", "Charles", "Johan"] {
            register(&mut store, owner, 0x20);
        }
        add(&mut store, Credential::simple_member(role("Johan", 0x20), p("Sandro"), Weight::new(70)));
        add(&mut store, Credential::simple_member(role("Bob", 0x20), p("Johan"), Weight::new(60)));
        add(&mut store, Credential::simple_member(role("Alice", 0x20), p("Jeffrey"), Weight::new(80)));
        add(&mut store, Credential::simple_member(role("Charles", 0x20), p("Bob"), Weight::new(90)));
        add(&mut store, Credential::simple_member(role("Charles", 0x20), p("Alice"), Weight::new(100)));
        add(
            &mut store,
            Credential::linked_inclusion(
                role("Charles", 0x20),
                role("Charles", 0x20),
                RoleName::from_byte(0x20),
                Weight::new(70),
            ),
        );
        store
    }

    #[test]
    fn unknown_query_role_fails() {
        let store = CredentialStore::default();
        let err = Resolver::default()
            .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownRole(role("Alice", 1)));
    }

    #[test]
    fn empty_role_resolves_to_empty_set() {
        let mut store = CredentialStore::default();
        register(&mut store, "Alice", 1);
        let resolution = Resolver::default()
            .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
            .unwrap();
        assert!(resolution.answer().unwrap().is_empty());
    }

    #[test]
    fn self_referential_link_terminates_in_discovery_order() {
        let store = friends_store();
        let resolution = Resolver::default()
            .resolve(&store, role("Charles", 0x20), SearchMode::Forward, None)
            .unwrap();

        let entries: Vec<_> = resolution.answer().unwrap().iter().collect();
        assert_eq!(
            entries,
            vec![
                (p("Bob"), Weight::new(90)),
                (p("Alice"), Weight::new(100)),
                (p("Johan"), Weight::new(60)),
                (p("Jeffrey"), Weight::new(70)),
                (p("Sandro"), Weight::new(60)),
            ]
        );
        // Unregistered linked roles are visited but stay empty
        assert!(resolution.role(&role("Sandro", 0x20)).unwrap().is_empty());
    }

    #[test]
    fn backward_matches_forward_on_cycles() {
        let store = friends_store();
        let resolver = Resolver::default();
        let forward = resolver
            .resolve(&store, role("Charles", 0x20), SearchMode::Forward, None)
            .unwrap();
        let backward = resolver
            .resolve(&store, role("Charles", 0x20), SearchMode::Backward, None)
            .unwrap();

        assert_eq!(backward.mode, SearchMode::Backward);
        assert_eq!(
            sorted(&forward, &role("Charles", 0x20)),
            sorted(&backward, &role("Charles", 0x20))
        );
        assert!(backward.stats.suspensions > 0);
    }

    #[test]
    fn best_path_keeps_maximum_weight() {
        let mut store = CredentialStore::default();
        register(&mut store, "Alice", 1);
        register(&mut store, "Bob", 1);
        register(&mut store, "Carol", 1);
        add(&mut store, Credential::simple_member(role("Bob", 1), p("Dave"), Weight::new(90)));
        add(&mut store, Credential::simple_member(role("Carol", 1), p("Dave"), Weight::new(40)));
        add(&mut store, Credential::simple_inclusion(role("Alice", 1), role("Carol", 1), Weight::new(100)));
        add(&mut store, Credential::simple_inclusion(role("Alice", 1), role("Bob", 1), Weight::new(50)));

        let resolution = Resolver::default()
            .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
            .unwrap();
        assert_eq!(
            resolution.answer().unwrap().weight_of(&p("Dave")),
            Some(Weight::new(50))
        );
    }

    #[test]
    fn intersection_requires_both_sides() {
        let mut store = CredentialStore::default();
        register(&mut store, "EPapers", 0x10);
        register(&mut store, "EOrg", 0x11);
        register(&mut store, "EOrg", 0x12);
        add(
            &mut store,
            Credential::intersection_inclusion(
                role("EPapers", 0x10),
                role("EOrg", 0x11),
                role("EOrg", 0x12),
                Weight::new(100),
            ),
        );
        add(&mut store, Credential::simple_member(role("EOrg", 0x11), p("Ann"), Weight::new(80)));
        add(&mut store, Credential::simple_member(role("EOrg", 0x12), p("Ben"), Weight::new(80)));

        let resolver = Resolver::default();
        let before = resolver
            .resolve(&store, role("EPapers", 0x10), SearchMode::Forward, None)
            .unwrap();
        assert!(before.answer().unwrap().is_empty());

        add(&mut store, Credential::simple_member(role("EOrg", 0x12), p("Ann"), Weight::new(30)));
        let after = resolver
            .resolve(&store, role("EPapers", 0x10), SearchMode::Forward, None)
            .unwrap();
        let entries: Vec<_> = after.answer().unwrap().iter().collect();
        assert_eq!(entries, vec![(p("Ann"), Weight::new(30))]);
    }

    #[test]
    fn certificate_cites_the_supporting_chain() {
        let mut store = CredentialStore::default();
        register(&mut store, "Alice", 1);
        register(&mut store, "Bob", 1);
        register(&mut store, "Carol", 1);
        let member = Credential::simple_member(role("Carol", 1), p("Dave"), Weight::new(80));
        let hop = Credential::simple_inclusion(role("Bob", 1), role("Carol", 1), Weight::new(90));
        let top = Credential::simple_inclusion(role("Alice", 1), role("Bob", 1), Weight::new(70));
        let unrelated = Credential::simple_member(role("Bob", 1), p("Eve"), Weight::new(10));
        for cred in [&member, &hop, &top, &unrelated] {
            add(&mut store, cred.clone());
        }

        let resolution = Resolver::default()
            .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
            .unwrap();
        let certificate = resolution.certificate(&role("Alice", 1));
        assert!(certificate.contains(&top.id()));
        assert!(certificate.contains(&hop.id()));
        assert!(certificate.contains(&member.id()));
        // Eve reaches Alice's role through Bob's, so her credential is cited too
        assert!(certificate.contains(&unrelated.id()));
        assert_eq!(certificate.len(), 4);
        assert_eq!(resolution.certificate(&role("Carol", 1)), vec![member.id()]);
    }

    #[test]
    fn budget_exhaustion_aborts() {
        let store = friends_store();
        let resolver = Resolver::default();
        let full = resolver
            .resolve(&store, role("Charles", 0x20), SearchMode::Forward, None)
            .unwrap();

        let err = resolver
            .resolve(
                &store,
                role("Charles", 0x20),
                SearchMode::Forward,
                Some(full.cost - 1),
            )
            .unwrap_err();
        assert!(matches!(err, ResolveError::ResourceExhausted { .. }));

        let exact = resolver
            .resolve(&store, role("Charles", 0x20), SearchMode::Forward, Some(full.cost))
            .unwrap();
        assert_eq!(exact.cost, full.cost);
    }

    #[test]
    fn cost_grows_with_membership() {
        let mut store = CredentialStore::default();
        register(&mut store, "Alice", 1);
        let resolver = Resolver::default();
        let mut last = resolver
            .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
            .unwrap()
            .cost;
        for n in 0..5 {
            add(
                &mut store,
                Credential::simple_member(role("Alice", 1), p(&format!("member-{n}")), Weight::new(100)),
            );
            let cost = resolver
                .resolve(&store, role("Alice", 1), SearchMode::Forward, None)
                .unwrap()
                .cost;
            assert!(cost > last);
            last = cost;
        }
    }
}
