use serde::{Deserialize, Serialize};

/// Index of a recorded resolution snapshot. Assigned sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofIndex(pub u64);

impl ProofIndex {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ProofIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "proof:{}", self.0)
    }
}

/// Which resolution strategy produced a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Breadth-first worklist outward from asserted memberships.
    Forward,
    /// Depth-first, goal-directed: subgoals are solved before their parents.
    Backward,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Forward => write!(f, "forward"),
            SearchMode::Backward => write!(f, "backward"),
        }
    }
}
