//! Storage and retrieval price tables
//!
//! Prices are USD per GB. Storage prices are monthly; retrieval prices are
//! charged once per retrieval. A month is always 30 simulated days.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TierSimError};
use crate::types::StorageTier;

/// Simulated days in one billing month
pub const DAYS_PER_MONTH: f64 = 30.0;

/// One price per tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPrices {
    pub standard: f64,
    pub ia: f64,
    pub glacier: f64,
    #[serde(rename = "deep-archive")]
    pub deep_archive: f64,
}

impl TierPrices {
    pub fn get(&self, tier: StorageTier) -> f64 {
        match tier {
            StorageTier::Standard => self.standard,
            StorageTier::InfrequentAccess => self.ia,
            StorageTier::Archive => self.glacier,
            StorageTier::DeepArchive => self.deep_archive,
        }
    }

    fn validate(&self, table: &str) -> Result<()> {
        for tier in StorageTier::ALL {
            let price = self.get(tier);
            if !price.is_finite() || price < 0.0 {
                return Err(TierSimError::config(format!(
                    "{table} price for {} must be a non-negative number, got {price}",
                    tier.key()
                )));
            }
        }
        Ok(())
    }
}

/// Storage (monthly) and retrieval (one-off) prices per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    pub storage: TierPrices,
    pub retrieval: TierPrices,
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable {
            storage: TierPrices {
                standard: 0.023,
                ia: 0.0125,
                glacier: 0.004,
                deep_archive: 0.00099,
            },
            retrieval: TierPrices {
                standard: 0.0,
                ia: 0.01,
                glacier: 0.03,
                deep_archive: 0.02,
            },
        }
    }
}

impl PriceTable {
    /// Reject negative or non-finite prices (only reachable via config overrides)
    pub fn validate(&self) -> Result<()> {
        self.storage.validate("storage")?;
        self.retrieval.validate("retrieval")
    }

    pub fn storage_price(&self, tier: StorageTier) -> f64 {
        self.storage.get(tier)
    }

    pub fn retrieval_price(&self, tier: StorageTier) -> f64 {
        self.retrieval.get(tier)
    }

    /// Storage cost for the file's whole age, billed at the current tier's rate.
    ///
    /// Computed from scratch: a tier change re-prices the entire age.
    pub fn accrued_cost(&self, tier: StorageTier, size_gb: f64, age_days: u32) -> f64 {
        let months = age_days as f64 / DAYS_PER_MONTH;
        self.storage_price(tier) * size_gb * months
    }

    /// One-off price of retrieving `size_gb` from `tier`
    pub fn retrieval_cost(&self, tier: StorageTier, size_gb: f64) -> f64 {
        self.retrieval_price(tier) * size_gb
    }

    /// Compare storing `size_gb` for `months` in every tier.
    ///
    /// Both inputs must be finite and strictly positive. Ties for the cheapest
    /// tier go to the warmest one.
    pub fn estimate(&self, size_gb: f64, months: f64) -> Result<CostEstimate> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(size_gb) || !valid(months) {
            return Err(TierSimError::InvalidEstimate);
        }

        let tiers: Vec<TierCost> = StorageTier::ALL
            .into_iter()
            .map(|tier| {
                let monthly_cost = self.storage_price(tier) * size_gb;
                TierCost {
                    tier,
                    monthly_cost,
                    total_cost: monthly_cost * months,
                }
            })
            .collect();

        let mut cheapest = StorageTier::Standard;
        let mut lowest = f64::INFINITY;
        for cost in &tiers {
            if cost.total_cost < lowest {
                lowest = cost.total_cost;
                cheapest = cost.tier;
            }
        }

        Ok(CostEstimate {
            size_gb,
            months,
            tiers,
            cheapest,
        })
    }
}

/// Cost of one tier in an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCost {
    pub tier: StorageTier,
    pub monthly_cost: f64,
    pub total_cost: f64,
}

/// Result of comparing all tiers for a given size and duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub size_gb: f64,
    pub months: f64,
    /// One entry per tier, in enumeration order
    pub tiers: Vec<TierCost>,
    pub cheapest: StorageTier,
}
