use std::fmt;

use serde::{Deserialize, Serialize};

/// Trust weight carried by a credential or a derived membership.
///
/// Valid weights are positive and bounded by the engine's configured
/// maximum; the credential store enforces both. Weights only ever
/// attenuate along a derivation chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(u32);

impl Weight {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether this weight lies in `1..=max`.
    pub const fn is_within(self, max: u32) -> bool {
        self.0 > 0 && self.0 <= max
    }

    /// Combine two links of a chain: the result is the weaker of the two.
    pub fn attenuate(self, other: Weight) -> Weight {
        self.min(other)
    }
}

impl From<u32> for Weight {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
