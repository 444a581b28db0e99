//! Lifecycle policy and the tier transition rule

use serde::{Deserialize, Serialize};

use crate::error::{Result, TierSimError};
use crate::types::StorageTier;

/// A configurable rule in the lifecycle policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyRule {
    InfrequentAccess,
    Archive,
    DeepArchive,
    /// Declared but never acted on by the transition rule
    Deletion,
}

impl PolicyRule {
    pub const ALL: [PolicyRule; 4] = [
        PolicyRule::InfrequentAccess,
        PolicyRule::Archive,
        PolicyRule::DeepArchive,
        PolicyRule::Deletion,
    ];

    /// Key used in `policy set` commands (`<key>` toggles, `<key>-days` sets the threshold)
    pub fn key(self) -> &'static str {
        match self {
            PolicyRule::InfrequentAccess => "ia",
            PolicyRule::Archive => "glacier",
            PolicyRule::DeepArchive => "deep-archive",
            PolicyRule::Deletion => "deletion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        PolicyRule::ALL.into_iter().find(|rule| rule.key() == key)
    }

    /// Tier a file moves to when this rule fires
    pub fn target(self) -> Option<StorageTier> {
        match self {
            PolicyRule::InfrequentAccess => Some(StorageTier::InfrequentAccess),
            PolicyRule::Archive => Some(StorageTier::Archive),
            PolicyRule::DeepArchive => Some(StorageTier::DeepArchive),
            PolicyRule::Deletion => None,
        }
    }
}

/// Day thresholds and enable flags controlling automatic transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    pub enable_ia: bool,
    pub ia_days: u32,
    pub enable_glacier: bool,
    pub glacier_days: u32,
    pub enable_deep_archive: bool,
    pub deep_archive_days: u32,
    pub enable_deletion: bool,
    pub deletion_days: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        LifecyclePolicy {
            enable_ia: true,
            ia_days: 30,
            enable_glacier: true,
            glacier_days: 90,
            enable_deep_archive: true,
            deep_archive_days: 365,
            enable_deletion: false,
            deletion_days: 2555,
        }
    }
}

impl LifecyclePolicy {
    /// Tier a file of `age_days` currently in `current` should move to, if any.
    ///
    /// Rules are checked deep-archive first, then archive, then
    /// infrequent-access, and only the first eligible one applies. A file
    /// that crossed several thresholds at once therefore skips the
    /// intermediate tiers. The result is always colder than `current`.
    pub fn next_tier(&self, current: StorageTier, age_days: u32) -> Option<StorageTier> {
        if self.enable_deep_archive
            && age_days >= self.deep_archive_days
            && current != StorageTier::DeepArchive
        {
            Some(StorageTier::DeepArchive)
        } else if self.enable_glacier
            && age_days >= self.glacier_days
            && current < StorageTier::Archive
        {
            Some(StorageTier::Archive)
        } else if self.enable_ia
            && age_days >= self.ia_days
            && current == StorageTier::Standard
        {
            Some(StorageTier::InfrequentAccess)
        } else {
            None
        }
    }

    pub fn is_enabled(&self, rule: PolicyRule) -> bool {
        match rule {
            PolicyRule::InfrequentAccess => self.enable_ia,
            PolicyRule::Archive => self.enable_glacier,
            PolicyRule::DeepArchive => self.enable_deep_archive,
            PolicyRule::Deletion => self.enable_deletion,
        }
    }

    pub fn days(&self, rule: PolicyRule) -> u32 {
        match rule {
            PolicyRule::InfrequentAccess => self.ia_days,
            PolicyRule::Archive => self.glacier_days,
            PolicyRule::DeepArchive => self.deep_archive_days,
            PolicyRule::Deletion => self.deletion_days,
        }
    }

    pub fn set_enabled(&mut self, rule: PolicyRule, enabled: bool) {
        match rule {
            PolicyRule::InfrequentAccess => self.enable_ia = enabled,
            PolicyRule::Archive => self.enable_glacier = enabled,
            PolicyRule::DeepArchive => self.enable_deep_archive = enabled,
            PolicyRule::Deletion => self.enable_deletion = enabled,
        }
    }

    pub fn set_days(&mut self, rule: PolicyRule, days: u32) {
        match rule {
            PolicyRule::InfrequentAccess => self.ia_days = days,
            PolicyRule::Archive => self.glacier_days = days,
            PolicyRule::DeepArchive => self.deep_archive_days = days,
            PolicyRule::Deletion => self.deletion_days = days,
        }
    }

    /// Apply a single `key=value` setting, e.g. `glacier=off` or `ia-days=45`
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(rule_key) = key.strip_suffix("-days") {
            let rule = PolicyRule::from_key(rule_key)
                .ok_or_else(|| TierSimError::policy(format!("unknown rule '{rule_key}'")))?;
            let days = value.parse::<u32>().map_err(|_| {
                TierSimError::policy(format!("{key} expects a whole number of days, got '{value}'"))
            })?;
            self.set_days(rule, days);
        } else {
            let rule = PolicyRule::from_key(key)
                .ok_or_else(|| TierSimError::policy(format!("unknown rule '{key}'")))?;
            let enabled = parse_flag(value).ok_or_else(|| {
                TierSimError::policy(format!("{key} expects on/off, got '{value}'"))
            })?;
            self.set_enabled(rule, enabled);
        }
        Ok(())
    }

    /// Enabled transition thresholds as `(target tier, day)`, in rule order
    pub fn thresholds(&self) -> Vec<(StorageTier, u32)> {
        PolicyRule::ALL
            .into_iter()
            .filter(|rule| self.is_enabled(*rule))
            .filter_map(|rule| rule.target().map(|tier| (tier, self.days(rule))))
            .collect()
    }

    /// Whether enabled thresholds increase with coldness.
    ///
    /// Out-of-order thresholds are allowed; they just make some tiers unreachable.
    pub fn is_ascending(&self) -> bool {
        self.thresholds().windows(2).all(|pair| pair[0].1 <= pair[1].1)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
