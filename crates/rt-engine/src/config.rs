use rt_kernel_resolver::ResolutionCosts;
use rt_kernel_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Unit costs reported for every engine operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSchedule {
    /// Fixed cost of `new_role`
    pub role_registration: u64,
    /// Fixed cost of inserting any credential
    pub credential_insertion: u64,
    /// Cost per entry written into a snapshot
    pub snapshot_entry: u64,
    /// Costs charged by the resolver
    pub resolution: ResolutionCosts,
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            role_registration: 20_000,
            credential_insertion: 40_000,
            snapshot_entry: 100,
            resolution: ResolutionCosts::default(),
        }
    }
}

/// Configuration for the RT engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest weight a credential may carry (default: 100)
    pub max_weight: u32,
    /// Cost budget applied to queries that don't supply their own (default: none)
    pub default_budget: Option<u64>,
    pub costs: CostSchedule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_weight: 100,
            default_budget: None,
            costs: CostSchedule::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_max_weight(mut self, max_weight: u32) -> Self {
        self.max_weight = max_weight;
        self
    }

    pub fn with_default_budget(mut self, budget: u64) -> Self {
        self.default_budget = Some(budget);
        self
    }

    pub fn with_costs(mut self, costs: CostSchedule) -> Self {
        self.costs = costs;
        self
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_weight: self.max_weight,
        }
    }
}
