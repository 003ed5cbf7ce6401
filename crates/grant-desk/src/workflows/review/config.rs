use serde::{Deserialize, Serialize};

/// Reviewing capacity assumed for one evaluator when none is configured.
pub const DEFAULT_EVALUATOR_CAPACITY: u32 = 5;

/// Tunable knobs of the review engine.
///
/// Capacity is a pool-wide ceiling on concurrently assigned proposals per
/// evaluator, not a per-call setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub evaluator_capacity: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            evaluator_capacity: DEFAULT_EVALUATOR_CAPACITY,
        }
    }
}
