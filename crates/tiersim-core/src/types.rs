//! Core types shared across tiersim components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TierSimError;

/// Megabytes per gigabyte used when converting file sizes for pricing
pub const MB_PER_GB: f64 = 1024.0;

/// Unique identifier for a simulated file (assigned from 1, never reused until reset)
pub type FileId = u64;

/// Storage class, ordered from warmest to coldest.
///
/// The derived `Ord` follows declaration order, so `a < b` means `b` is colder.
/// Lifecycle transitions only ever move a file to a greater tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StorageTier {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "ia")]
    InfrequentAccess,
    #[serde(rename = "glacier")]
    Archive,
    #[serde(rename = "deep-archive")]
    DeepArchive,
}

impl StorageTier {
    /// All tiers in enumeration order
    pub const ALL: [StorageTier; 4] = [
        StorageTier::Standard,
        StorageTier::InfrequentAccess,
        StorageTier::Archive,
        StorageTier::DeepArchive,
    ];

    /// Coldness index (standard=0 .. deep-archive=3)
    pub fn index(self) -> usize {
        match self {
            StorageTier::Standard => 0,
            StorageTier::InfrequentAccess => 1,
            StorageTier::Archive => 2,
            StorageTier::DeepArchive => 3,
        }
    }

    /// Stable key used in config files and commands
    pub fn key(self) -> &'static str {
        match self {
            StorageTier::Standard => "standard",
            StorageTier::InfrequentAccess => "ia",
            StorageTier::Archive => "glacier",
            StorageTier::DeepArchive => "deep-archive",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StorageTier::Standard => "Standard",
            StorageTier::InfrequentAccess => "Standard-IA",
            StorageTier::Archive => "Glacier",
            StorageTier::DeepArchive => "Deep Archive",
        }
    }

    pub fn latency(self) -> RetrievalLatency {
        match self {
            StorageTier::Standard | StorageTier::InfrequentAccess => RetrievalLatency::Instant,
            StorageTier::Archive => RetrievalLatency::Minutes,
            StorageTier::DeepArchive => RetrievalLatency::Hours,
        }
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for StorageTier {
    type Err = TierSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(StorageTier::Standard),
            "ia" | "standard-ia" => Ok(StorageTier::InfrequentAccess),
            "glacier" | "archive" => Ok(StorageTier::Archive),
            "deep-archive" | "deep" => Ok(StorageTier::DeepArchive),
            other => Err(TierSimError::command(format!("unknown storage tier '{other}'"))),
        }
    }
}

/// Retrieval latency class of a tier (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalLatency {
    Instant,
    Minutes,
    Hours,
}

impl RetrievalLatency {
    pub fn label(self) -> &'static str {
        match self {
            RetrievalLatency::Instant => "Instant",
            RetrievalLatency::Minutes => "1-5 minutes",
            RetrievalLatency::Hours => "12 hours",
        }
    }

    /// Wall-clock delay before a simulated restore reports completion.
    ///
    /// Instant tiers have no restore phase.
    pub fn restore_delay(self) -> Option<Duration> {
        match self {
            RetrievalLatency::Instant => None,
            RetrievalLatency::Minutes => Some(Duration::from_secs(5)),
            RetrievalLatency::Hours => Some(Duration::from_secs(15)),
        }
    }
}

impl std::fmt::Display for RetrievalLatency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A simulated object in the bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub size_mb: u64,
    pub tier: StorageTier,
    pub age_days: u32,
    pub accrued_cost: f64,
    pub latency: RetrievalLatency,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a freshly uploaded record in the Standard tier
    pub fn new(id: FileId, name: impl Into<String>, size_mb: u64, uploaded_at: DateTime<Utc>) -> Self {
        FileRecord {
            id,
            name: name.into(),
            size_mb,
            tier: StorageTier::Standard,
            age_days: 0,
            accrued_cost: 0.0,
            latency: StorageTier::Standard.latency(),
            uploaded_at,
        }
    }

    pub fn size_gb(&self) -> f64 {
        self.size_mb as f64 / MB_PER_GB
    }

    /// Move to `tier`, keeping the latency label in sync
    pub fn move_to(&mut self, tier: StorageTier) {
        self.tier = tier;
        self.latency = tier.latency();
    }
}

/// A single lifecycle transition applied by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub file_id: FileId,
    pub name: String,
    pub from: StorageTier,
    pub to: StorageTier,
}

/// Outcome of a retrieval request. Retrieval never mutates the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub file_id: FileId,
    pub name: String,
    pub tier: StorageTier,
    pub latency: RetrievalLatency,
    pub cost: f64,
}

/// Number of files per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub standard: usize,
    pub ia: usize,
    pub glacier: usize,
    #[serde(rename = "deep-archive")]
    pub deep_archive: usize,
}

impl TierCounts {
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileRecord>) -> Self {
        let mut counts = TierCounts::default();
        for file in files {
            *counts.slot_mut(file.tier) += 1;
        }
        counts
    }

    pub fn get(&self, tier: StorageTier) -> usize {
        match tier {
            StorageTier::Standard => self.standard,
            StorageTier::InfrequentAccess => self.ia,
            StorageTier::Archive => self.glacier,
            StorageTier::DeepArchive => self.deep_archive,
        }
    }

    fn slot_mut(&mut self, tier: StorageTier) -> &mut usize {
        match tier {
            StorageTier::Standard => &mut self.standard,
            StorageTier::InfrequentAccess => &mut self.ia,
            StorageTier::Archive => &mut self.glacier,
            StorageTier::DeepArchive => &mut self.deep_archive,
        }
    }

    /// Tiers currently holding at least one file, in enumeration order
    pub fn active(&self) -> Vec<StorageTier> {
        StorageTier::ALL
            .into_iter()
            .filter(|tier| self.get(*tier) > 0)
            .collect()
    }
}

/// Progress state of a timeline marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStatus {
    Completed,
    Active,
    Pending,
}

/// A milestone day on the lifecycle timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineMarker {
    pub day: u32,
    pub label: String,
    pub status: MarkerStatus,
}

/// Read-only view of the simulator used by presenters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_day: u32,
    pub files: Vec<FileRecord>,
    pub counts: TierCounts,
    /// Tiers holding at least one file, warmest first
    pub active: Vec<StorageTier>,
    pub timeline: Vec<TimelineMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: FileId, tier: StorageTier) -> FileRecord {
        let mut file = FileRecord::new(id, format!("file-{id}"), 1024, Utc::now());
        file.move_to(tier);
        file
    }

    #[test]
    fn test_tier_ordering_matches_index() {
        for pair in StorageTier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
    }

    #[test]
    fn test_tier_serialization_uses_keys() {
        for tier in StorageTier::ALL {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.key()));
            let parsed: StorageTier = tier.key().parse().unwrap();
            assert_eq!(parsed, tier);
        }
        assert!("tape".parse::<StorageTier>().is_err());
    }

    #[test]
    fn test_latency_labels_and_restore_delays() {
        assert_eq!(StorageTier::Standard.latency().label(), "Instant");
        assert_eq!(StorageTier::InfrequentAccess.latency().label(), "Instant");
        assert_eq!(StorageTier::Archive.latency().label(), "1-5 minutes");
        assert_eq!(StorageTier::DeepArchive.latency().label(), "12 hours");

        assert_eq!(RetrievalLatency::Instant.restore_delay(), None);
        assert_eq!(
            RetrievalLatency::Minutes.restore_delay(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            RetrievalLatency::Hours.restore_delay(),
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn test_new_record_starts_in_standard() {
        let file = FileRecord::new(7, "report.pdf", 512, Utc::now());
        assert_eq!(file.tier, StorageTier::Standard);
        assert_eq!(file.age_days, 0);
        assert_eq!(file.accrued_cost, 0.0);
        assert_eq!(file.latency, RetrievalLatency::Instant);
        assert_eq!(file.size_gb(), 0.5);
    }

    #[test]
    fn test_move_to_updates_latency() {
        let mut file = FileRecord::new(1, "a", 10, Utc::now());
        file.move_to(StorageTier::DeepArchive);
        assert_eq!(file.latency, RetrievalLatency::Hours);
    }

    #[test]
    fn test_tier_counts() {
        let files = vec![
            record(1, StorageTier::Standard),
            record(2, StorageTier::Standard),
            record(3, StorageTier::DeepArchive),
        ];
        let counts = TierCounts::from_files(&files);

        assert_eq!(counts.get(StorageTier::Standard), 2);
        assert_eq!(counts.get(StorageTier::InfrequentAccess), 0);
        assert_eq!(counts.get(StorageTier::DeepArchive), 1);
        assert_eq!(
            counts.active(),
            vec![StorageTier::Standard, StorageTier::DeepArchive]
        );
    }

    #[test]
    fn test_tier_counts_serialization() {
        let counts = TierCounts {
            deep_archive: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&counts).unwrap();
        assert!(json.contains("\"deep-archive\":2"));
    }
}
