//! Simulator configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so a file
//! only needs the values it overrides:
//!
//! ```json
//! {
//!   "policy": { "ia_days": 45, "enable_deep_archive": false },
//!   "prices": { "storage": { "standard": 0.021, "ia": 0.0125, "glacier": 0.0036, "deep-archive": 0.00099 } },
//!   "step_days": 15
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use tiersim_core::{LifecyclePolicy, PriceTable, Result, TierSimError};

use crate::simulator::{DEFAULT_STEP_DAYS, Simulator};

/// Settings for a simulation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial lifecycle policy
    pub policy: LifecyclePolicy,

    /// Storage and retrieval prices
    pub prices: PriceTable,

    /// Days added by `advance` when no count is given
    pub step_days: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: LifecyclePolicy::default(),
            prices: PriceTable::default(),
            step_days: DEFAULT_STEP_DAYS,
        }
    }
}

impl SimConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate a JSON config document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_days == 0 {
            return Err(TierSimError::config("step_days must be at least 1"));
        }
        self.prices.validate()
    }

    /// Build an empty simulator from this configuration
    pub fn build_simulator(&self) -> Simulator {
        Simulator::new(self.policy.clone(), self.prices.clone()).with_step_days(self.step_days)
    }
}
