use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::principal::Principal;

/// RoleName: opaque 32-byte identifier scoped to a principal.
///
/// Short names are left-aligned, so `0x10` is `10 00 .. 00`. Display trims
/// trailing zero bytes but always keeps at least one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleName([u8; RoleName::LEN]);

impl RoleName {
    pub const LEN: usize = 32;

    pub const fn from_array(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Single-byte role name, e.g. `RoleName::from_byte(0x10)` for `0x10`.
    pub const fn from_byte(byte: u8) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[0] = byte;
        Self(bytes)
    }

    /// Left-aligned role name from up to 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() > Self::LEN {
            return Err(TypeError::RoleNameTooLong(bytes.len()));
        }
        let mut padded = [0u8; Self::LEN];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(padded))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    fn significant(&self) -> &[u8] {
        let end = self
            .0
            .iter()
            .rposition(|b| *b != 0)
            .map_or(1, |last| last + 1);
        &self.0[..end]
    }
}

impl FromStr for RoleName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&decoded)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.significant()))
    }
}

impl fmt::Debug for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleName({})", self)
    }
}

impl Serialize for RoleName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoleName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Role: a name scoped to its owning principal, written `Owner.name`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role {
    pub owner: Principal,
    pub name: RoleName,
}

impl Role {
    pub const fn new(owner: Principal, name: RoleName) -> Self {
        Self { owner, name }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}
