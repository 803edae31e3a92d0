use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Unit costs charged while resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionCosts {
    /// Charged once per resolution
    pub base: u64,
    /// Charged when a role is first visited
    pub role_activation: u64,
    /// Charged each time a credential is evaluated
    pub credential_evaluation: u64,
    /// Charged per candidate membership examined
    pub candidate_check: u64,
    /// Charged when a membership is added or its weight raised
    pub membership_write: u64,
}

impl Default for ResolutionCosts {
    fn default() -> Self {
        Self {
            base: 2_000,
            role_activation: 500,
            credential_evaluation: 200,
            candidate_check: 50,
            membership_write: 300,
        }
    }
}

/// Running cost total with an optional hard limit.
#[derive(Clone, Debug)]
pub struct CostMeter {
    limit: Option<u64>,
    used: u64,
}

impl CostMeter {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit, used: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Add `units` to the total, failing if that would pass the limit.
    ///
    /// A failed charge leaves the total unchanged.
    pub fn charge(&mut self, units: u64) -> Result<(), ResolveError> {
        let needed = self.used.saturating_add(units);
        if let Some(limit) = self.limit {
            if needed > limit {
                return Err(ResolveError::ResourceExhausted { limit, needed });
            }
        }
        self.used = needed;
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}
