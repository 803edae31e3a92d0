//! Policy scripts
//!
//! A script names its principals and roles, then lists the operations to
//! replay against a fresh engine:
//!
//! ```toml
//! [principals]
//! Alice = "0x00000000000000000000000000000000000000a1"
//!
//! [roles]
//! friend = "0x20"
//!
//! [[step]]
//! op = "new_role"
//! owner = "Alice"
//! role = "friend"
//!
//! [[step]]
//! op = "simple_member"
//! owner = "Alice"
//! role = "friend"
//! member = "Bob"
//! weight = 80
//!
//! [[step]]
//! op = "search"
//! owner = "Alice"
//! role = "friend"
//! expect_count = 1
//! ```
//!
//! Principals missing from `[principals]` get an address derived from their
//! label. Roles missing from `[roles]` use the label's bytes as their name.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use rt_engine::{Principal, RoleName, SearchMode};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub principals: BTreeMap<String, Principal>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleName>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    NewRole {
        owner: String,
        role: String,
    },
    SimpleMember {
        owner: String,
        role: String,
        member: String,
        weight: u32,
    },
    SimpleInclusion {
        owner: String,
        role: String,
        target_owner: String,
        target_role: String,
        weight: u32,
    },
    LinkedInclusion {
        owner: String,
        role: String,
        base_owner: String,
        base_role: String,
        linked_role: String,
        weight: u32,
    },
    IntersectionInclusion {
        owner: String,
        role: String,
        left_owner: String,
        left_role: String,
        right_owner: String,
        right_role: String,
        weight: u32,
    },
    Search {
        owner: String,
        role: String,
        expect_count: Option<usize>,
        budget: Option<u64>,
    },
    BackwardSearch {
        owner: String,
        role: String,
        expect_count: Option<usize>,
        budget: Option<u64>,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::NewRole { .. } => "new_role",
            Step::SimpleMember { .. } => "simple_member",
            Step::SimpleInclusion { .. } => "simple_inclusion",
            Step::LinkedInclusion { .. } => "linked_inclusion",
            Step::IntersectionInclusion { .. } => "intersection_inclusion",
            Step::Search { .. } => "search",
            Step::BackwardSearch { .. } => "backward_search",
        }
    }

    /// Search mode, for query steps.
    pub fn mode(&self) -> Option<SearchMode> {
        match self {
            Step::Search { .. } => Some(SearchMode::Forward),
            Step::BackwardSearch { .. } => Some(SearchMode::Backward),
            _ => None,
        }
    }

    /// Human-readable form of the step.
    pub fn describe(&self) -> String {
        match self {
            Step::NewRole { owner, role } => format!("{owner}.{role}"),
            Step::SimpleMember {
                owner,
                role,
                member,
                weight,
            } => format!("{owner}.{role} <- {member}, {weight}"),
            Step::SimpleInclusion {
                owner,
                role,
                target_owner,
                target_role,
                weight,
            } => format!("{owner}.{role} <- {target_owner}.{target_role}, {weight}"),
            Step::LinkedInclusion {
                owner,
                role,
                base_owner,
                base_role,
                linked_role,
                weight,
            } => format!("{owner}.{role} <- {base_owner}.{base_role}.{linked_role}, {weight}"),
            Step::IntersectionInclusion {
                owner,
                role,
                left_owner,
                left_role,
                right_owner,
                right_role,
                weight,
            } => format!(
                "{owner}.{role} <- {left_owner}.{left_role} & {right_owner}.{right_role}, {weight}"
            ),
            Step::Search { owner, role, .. } | Step::BackwardSearch { owner, role, .. } => {
                format!("{owner}.{role}")
            }
        }
    }

    fn principal_labels(&self) -> Vec<&String> {
        match self {
            Step::NewRole { owner, .. }
            | Step::Search { owner, .. }
            | Step::BackwardSearch { owner, .. } => vec![owner],
            Step::SimpleMember { owner, member, .. } => vec![owner, member],
            Step::SimpleInclusion {
                owner,
                target_owner,
                ..
            } => vec![owner, target_owner],
            Step::LinkedInclusion {
                owner, base_owner, ..
            } => vec![owner, base_owner],
            Step::IntersectionInclusion {
                owner,
                left_owner,
                right_owner,
                ..
            } => vec![owner, left_owner, right_owner],
        }
    }

    fn role_labels(&self) -> Vec<&String> {
        match self {
            Step::NewRole { role, .. }
            | Step::SimpleMember { role, .. }
            | Step::Search { role, .. }
            | Step::BackwardSearch { role, .. } => vec![role],
            Step::SimpleInclusion {
                role, target_role, ..
            } => vec![role, target_role],
            Step::LinkedInclusion {
                role,
                base_role,
                linked_role,
                ..
            } => vec![role, base_role, linked_role],
            Step::IntersectionInclusion {
                role,
                left_role,
                right_role,
                ..
            } => vec![role, left_role, right_role],
        }
    }
}

impl Script {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parsing policy script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("in {}", path.display()))
    }

    pub fn principal(&self, label: &str) -> Principal {
        self.principals
            .get(label)
            .copied()
            .unwrap_or_else(|| Principal::from_label(label))
    }

    pub fn role_name(&self, label: &str) -> Result<RoleName> {
        match self.roles.get(label) {
            Some(name) => Ok(*name),
            None => RoleName::from_bytes(label.as_bytes())
                .with_context(|| format!("role name {label:?}")),
        }
    }

    /// Check that every label in every step resolves.
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            for label in step.role_labels() {
                self.role_name(label)
                    .with_context(|| format!("step {index} ({})", step.op()))?;
            }
        }
        Ok(())
    }

    /// Address → label, for every principal the script mentions.
    pub fn labels(&self) -> HashMap<Principal, String> {
        let mut labels: HashMap<Principal, String> = self
            .steps
            .iter()
            .flat_map(|step| step.principal_labels())
            .map(|label| (self.principal(label), label.to_string()))
            .collect();
        for (label, principal) in &self.principals {
            labels.insert(*principal, label.clone());
        }
        labels
    }
}
