use std::collections::HashMap;

use rt_types::{Credential, CredentialId, Principal, Role, RoleName};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;

/// Configuration for the Credential Store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Largest weight a credential may carry (default: 100)
    pub max_weight: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_weight: 100 }
    }
}

/// Metadata kept for every registered role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub role: Role,
    /// Position of this role in registration order.
    pub sequence: u64,
}

/// A credential as accepted by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub id: CredentialId,
    pub issuer: Principal,
    pub credential: Credential,
    /// Position in the append-only arena.
    pub sequence: u64,
}

/// Credential Store: append-only arena of credentials indexed by the role
/// they define, plus the explicit registry of roles.
///
/// No delete or modify operations exist.
pub struct CredentialStore {
    config: StoreConfig,
    roles: HashMap<Role, RoleRecord>,
    credentials: Vec<StoredCredential>,
    /// Defined role → arena positions, in insertion order.
    by_role: HashMap<Role, Vec<usize>>,
    /// First arena position carrying each credential id.
    by_id: HashMap<CredentialId, usize>,
}

impl CredentialStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            roles: HashMap::new(),
            credentials: Vec::new(),
            by_role: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Register `owner.name`. Fails if the owner already registered that name.
    pub fn register_role(&mut self, owner: Principal, name: RoleName) -> Result<(), StoreError> {
        let role = Role::new(owner, name);
        if self.roles.contains_key(&role) {
            return Err(StoreError::DuplicateRole(role));
        }

        let record = RoleRecord {
            role,
            sequence: self.roles.len() as u64,
        };
        self.roles.insert(role, record);
        debug!(role = %role, "Registered role");
        Ok(())
    }

    /// Validate and append a credential signed by `signer`.
    ///
    /// All checks run before anything is written, so a rejected credential
    /// leaves the store untouched.
    pub fn insert(
        &mut self,
        signer: Principal,
        credential: Credential,
    ) -> Result<CredentialId, StoreError> {
        self.validate(signer, &credential)?;

        let id = credential.id();
        let position = self.credentials.len();
        let defines = credential.defines;

        self.credentials.push(StoredCredential {
            id,
            issuer: signer,
            credential,
            sequence: position as u64,
        });
        self.by_role.entry(defines).or_default().push(position);
        self.by_id.entry(id).or_insert(position);

        debug!(
            credential_id = %id,
            defines = %defines,
            position,
            "Appended credential"
        );
        Ok(id)
    }

    fn validate(&self, signer: Principal, credential: &Credential) -> Result<(), StoreError> {
        let defines = credential.defines;
        if defines.owner != signer {
            return Err(StoreError::Unauthorized {
                signer,
                owner: defines.owner,
            });
        }

        if !self.role_exists(&defines) {
            return Err(StoreError::UnknownRole(defines));
        }

        if let Some(missing) = credential
            .referenced_roles()
            .into_iter()
            .find(|role| !self.role_exists(role))
        {
            return Err(StoreError::UnknownRole(missing));
        }

        if !credential.weight.is_within(self.config.max_weight) {
            return Err(StoreError::InvalidWeight {
                weight: credential.weight,
                max: self.config.max_weight,
            });
        }

        Ok(())
    }

    pub fn role_exists(&self, role: &Role) -> bool {
        self.roles.contains_key(role)
    }

    pub fn role(&self, role: &Role) -> Option<&RoleRecord> {
        self.roles.get(role)
    }

    /// Credentials defining `role`, in insertion order.
    pub fn credentials_for<'a>(
        &'a self,
        role: &Role,
    ) -> impl Iterator<Item = &'a StoredCredential> + 'a {
        self.by_role
            .get(role)
            .map(|positions| positions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |position| &self.credentials[*position])
    }

    /// Look up a credential by its content hash.
    pub fn get(&self, id: &CredentialId) -> Option<&StoredCredential> {
        self.by_id.get(id).map(|position| &self.credentials[*position])
    }

    /// All credentials, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredCredential> {
        self.credentials.iter()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
