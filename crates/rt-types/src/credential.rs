use std::fmt;

use serde::{Deserialize, Serialize};

use crate::principal::Principal;
use crate::role::{Role, RoleName};
use crate::weight::Weight;

/// Content hash of a credential (BLAKE3 over its canonical encoding).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub [u8; 32]);

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cred:{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialId({})", hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    SimpleMember,
    SimpleInclusion,
    LinkedInclusion,
    IntersectionInclusion,
}

impl CredentialKind {
    fn tag(self) -> u8 {
        match self {
            CredentialKind::SimpleMember => 1,
            CredentialKind::SimpleInclusion => 2,
            CredentialKind::LinkedInclusion => 3,
            CredentialKind::IntersectionInclusion => 4,
        }
    }
}

/// Right-hand side of a credential.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBody {
    /// `R ← P`
    Member(Principal),
    /// `R1 ← R2`
    Inclusion(Role),
    /// `R1 ← R2.R3`: for each member `M` of `base`, members of `M.linked`.
    Linked { base: Role, linked: RoleName },
    /// `R1 ← R2 ∩ R3`
    Intersection(Role, Role),
}

/// A delegation credential: `defines ← body, weight`.
///
/// Credentials are immutable; the store only ever appends them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    pub defines: Role,
    pub body: CredentialBody,
    pub weight: Weight,
}

impl Credential {
    pub fn simple_member(defines: Role, member: Principal, weight: Weight) -> Self {
        Self {
            defines,
            body: CredentialBody::Member(member),
            weight,
        }
    }

    pub fn simple_inclusion(defines: Role, included: Role, weight: Weight) -> Self {
        Self {
            defines,
            body: CredentialBody::Inclusion(included),
            weight,
        }
    }

    pub fn linked_inclusion(defines: Role, base: Role, linked: RoleName, weight: Weight) -> Self {
        Self {
            defines,
            body: CredentialBody::Linked { base, linked },
            weight,
        }
    }

    pub fn intersection_inclusion(defines: Role, left: Role, right: Role, weight: Weight) -> Self {
        Self {
            defines,
            body: CredentialBody::Intersection(left, right),
            weight,
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self.body {
            CredentialBody::Member(_) => CredentialKind::SimpleMember,
            CredentialBody::Inclusion(_) => CredentialKind::SimpleInclusion,
            CredentialBody::Linked { .. } => CredentialKind::LinkedInclusion,
            CredentialBody::Intersection(..) => CredentialKind::IntersectionInclusion,
        }
    }

    /// Roles that must already exist for this credential to be accepted.
    ///
    /// A linked inclusion only names its base role here: the linked role
    /// is resolved per member when the credential is evaluated.
    pub fn referenced_roles(&self) -> Vec<Role> {
        match &self.body {
            CredentialBody::Member(_) => vec![],
            CredentialBody::Inclusion(role) => vec![*role],
            CredentialBody::Linked { base, .. } => vec![*base],
            CredentialBody::Intersection(left, right) => vec![*left, *right],
        }
    }

    /// Content hash over the canonical encoding.
    pub fn id(&self) -> CredentialId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.kind().tag()]);
        hash_role(&mut hasher, &self.defines);
        match &self.body {
            CredentialBody::Member(member) => {
                hasher.update(member.as_bytes());
            }
            CredentialBody::Inclusion(role) => hash_role(&mut hasher, role),
            CredentialBody::Linked { base, linked } => {
                hash_role(&mut hasher, base);
                hasher.update(linked.as_bytes());
            }
            CredentialBody::Intersection(left, right) => {
                hash_role(&mut hasher, left);
                hash_role(&mut hasher, right);
            }
        }
        hasher.update(&self.weight.value().to_be_bytes());
        CredentialId(*hasher.finalize().as_bytes())
    }
}

fn hash_role(hasher: &mut blake3::Hasher, role: &Role) {
    hasher.update(role.owner.as_bytes());
    hasher.update(role.name.as_bytes());
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            CredentialBody::Member(member) => {
                write!(f, "{} <- {}, {}", self.defines, member, self.weight)
            }
            CredentialBody::Inclusion(role) => {
                write!(f, "{} <- {}, {}", self.defines, role, self.weight)
            }
            CredentialBody::Linked { base, linked } => {
                write!(f, "{} <- {}.{}, {}", self.defines, base, linked, self.weight)
            }
            CredentialBody::Intersection(left, right) => {
                write!(f, "{} <- {} & {}, {}", self.defines, left, right, self.weight)
            }
        }
    }
}
