//! Lifecycle and cost simulator
//!
//! Owns the simulated bucket (an ordered list of file records), the lifecycle
//! policy and the price tables. Every operation is synchronous and either
//! succeeds completely or returns a validation error without touching state.

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use tiersim_core::{
    FileId, FileRecord, LifecyclePolicy, MarkerStatus, PriceTable, Result, Retrieval, Snapshot,
    TierCounts, TierSimError, TimelineMarker, Transition,
};

/// Days added by one default lifecycle step
pub const DEFAULT_STEP_DAYS: u32 = 30;

/// Storage cost a file has accrued, recomputed from scratch.
///
/// Pure in (tier, size, age): the whole age is billed at the current tier.
pub fn recompute_cost(prices: &PriceTable, file: &FileRecord) -> f64 {
    prices.accrued_cost(file.tier, file.size_gb(), file.age_days)
}

/// Parse a user-entered file size in MB. Zero is a valid (empty) object.
pub fn parse_size_mb(text: &str) -> Result<u64> {
    let text = text.trim();
    text.parse::<u64>()
        .map_err(|_| TierSimError::InvalidSize(text.to_string()))
}

/// Single-bucket lifecycle simulator
#[derive(Debug, Clone)]
pub struct Simulator {
    files: Vec<FileRecord>,
    next_file_id: FileId,
    current_day: u32,
    policy: LifecyclePolicy,
    prices: PriceTable,
    step_days: u32,
}

impl Simulator {
    /// Create an empty simulator with the given policy and prices
    pub fn new(policy: LifecyclePolicy, prices: PriceTable) -> Self {
        Simulator {
            files: Vec::new(),
            next_file_id: 1,
            current_day: 0,
            policy,
            prices,
            step_days: DEFAULT_STEP_DAYS,
        }
    }

    /// Override the default `advance` step (also the timeline look-ahead)
    pub fn with_step_days(mut self, step_days: u32) -> Self {
        self.step_days = step_days;
        self
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn step_days(&self) -> u32 {
        self.step_days
    }

    /// Add a file to the Standard tier
    pub fn upload(&mut self, name: &str, size_mb: u64) -> Result<&FileRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TierSimError::EmptyName);
        }

        let id = self.next_file_id;
        self.next_file_id += 1;

        info!(file_id = id, name = %name, size_mb, "Uploaded file to Standard");
        self.files.push(FileRecord::new(id, name, size_mb, Utc::now()));

        Ok(&self.files[self.files.len() - 1])
    }

    /// Age every file by `days` and apply at most one transition per file.
    ///
    /// Returns the transitions in file order.
    pub fn advance(&mut self, days: u32) -> Result<Vec<Transition>> {
        if self.files.is_empty() {
            return Err(TierSimError::NothingToAdvance);
        }

        self.current_day = self.current_day.saturating_add(days);
        for file in &mut self.files {
            file.age_days = file.age_days.saturating_add(days);
        }

        let transitions = self.apply_transitions();
        self.recompute_costs();

        info!(
            day = self.current_day,
            days,
            transitions = transitions.len(),
            "Advanced lifecycle"
        );
        Ok(transitions)
    }

    /// Replace the policy and evaluate it once against every file without ageing them
    pub fn update_policy(&mut self, policy: LifecyclePolicy) -> Vec<Transition> {
        if !policy.is_ascending() {
            warn!(?policy, "Lifecycle thresholds are not ascending; some tiers are unreachable");
        }
        self.policy = policy;
        info!("Lifecycle policy updated");

        let transitions = self.apply_transitions();
        self.recompute_costs();
        transitions
    }

    /// Price a retrieval of the given file. Does not change the file.
    pub fn retrieve(&self, id: FileId) -> Result<Retrieval> {
        if self.files.is_empty() {
            return Err(TierSimError::NoFiles("retrieve"));
        }
        let file = self.file(id).ok_or(TierSimError::FileNotFound(id))?;
        Ok(self.retrieval_for(file))
    }

    /// Price a retrieval of a uniformly chosen file
    pub fn retrieve_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Retrieval> {
        let file = self
            .files
            .choose(rng)
            .ok_or(TierSimError::NoFiles("retrieve"))?;
        Ok(self.retrieval_for(file))
    }

    fn retrieval_for(&self, file: &FileRecord) -> Retrieval {
        let cost = self.prices.retrieval_cost(file.tier, file.size_gb());
        debug!(file_id = file.id, tier = %file.tier, cost, "Priced retrieval");

        Retrieval {
            file_id: file.id,
            name: file.name.clone(),
            tier: file.tier,
            latency: file.latency,
            cost,
        }
    }

    /// Remove the most recently uploaded file
    pub fn delete_last(&mut self) -> Result<FileRecord> {
        let file = self.files.pop().ok_or(TierSimError::NoFiles("delete"))?;
        info!(file_id = file.id, name = %file.name, tier = %file.tier, "Deleted file");
        Ok(file)
    }

    /// Clear all files and counters. The policy and prices are kept.
    pub fn reset(&mut self) {
        self.files.clear();
        self.next_file_id = 1;
        self.current_day = 0;
        info!("Simulation reset");
    }

    pub fn tier_counts(&self) -> TierCounts {
        TierCounts::from_files(&self.files)
    }

    /// Milestones at day 0 and each enabled threshold, sorted by day
    pub fn timeline(&self) -> Vec<TimelineMarker> {
        let mut markers = vec![(0, "Upload".to_string())];
        markers.extend(
            self.policy
                .thresholds()
                .into_iter()
                .map(|(tier, day)| (day, tier.display_name().to_string())),
        );
        markers.sort_by_key(|(day, _)| *day);

        markers
            .into_iter()
            .map(|(day, label)| TimelineMarker {
                day,
                label,
                status: self.marker_status(day),
            })
            .collect()
    }

    fn marker_status(&self, day: u32) -> MarkerStatus {
        if self.current_day >= day {
            MarkerStatus::Completed
        } else if self.current_day.saturating_add(self.step_days) >= day {
            MarkerStatus::Active
        } else {
            MarkerStatus::Pending
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let counts = self.tier_counts();
        Snapshot {
            current_day: self.current_day,
            files: self.files.clone(),
            active: counts.active(),
            counts,
            timeline: self.timeline(),
        }
    }

    fn apply_transitions(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for file in &mut self.files {
            let Some(target) = self.policy.next_tier(file.tier, file.age_days) else {
                continue;
            };

            let from = file.tier;
            file.move_to(target);
            info!(
                file_id = file.id,
                name = %file.name,
                from = %from,
                to = %target,
                "File transitioned"
            );

            transitions.push(Transition {
                file_id: file.id,
                name: file.name.clone(),
                from,
                to: target,
            });
        }

        transitions
    }

    fn recompute_costs(&mut self) {
        for file in &mut self.files {
            file.accrued_cost = recompute_cost(&self.prices, file);
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(LifecyclePolicy::default(), PriceTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tiersim_core::StorageTier;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sim_with_files(sizes: &[u64]) -> Simulator {
        let mut sim = Simulator::default();
        for (i, size) in sizes.iter().enumerate() {
            sim.upload(&format!("file-{i}"), *size).unwrap();
        }
        sim
    }

    #[test]
    fn test_upload_assigns_monotonic_ids() {
        let sim = sim_with_files(&[100, 200, 300]);
        let ids: Vec<_> = sim.files().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(sim.files().iter().all(|f| f.tier == StorageTier::Standard));
    }

    #[test]
    fn test_upload_trims_and_rejects_empty_name() {
        let mut sim = Simulator::default();
        assert!(matches!(sim.upload("   ", 10), Err(TierSimError::EmptyName)));
        assert!(sim.files().is_empty());

        let file = sim.upload("  photo.jpg ", 10).unwrap();
        assert_eq!(file.name, "photo.jpg");
        assert_eq!(file.id, 1);
    }

    #[test]
    fn test_zero_byte_upload_ages_at_no_cost() {
        let mut sim = Simulator::default();
        let file = sim.upload("empty.txt", 0).unwrap();
        assert_eq!(file.size_mb, 0);
        assert_eq!(file.accrued_cost, 0.0);

        sim.advance(400).unwrap();
        let file = &sim.files()[0];
        assert_eq!(file.tier, StorageTier::DeepArchive);
        assert_eq!(file.accrued_cost, 0.0);
        assert_eq!(sim.retrieve(file.id).unwrap().cost, 0.0);
    }

    #[test]
    fn test_parse_size_mb() {
        assert_eq!(parse_size_mb(" 250 ").unwrap(), 250);
        assert_eq!(parse_size_mb("0").unwrap(), 0);
        for bad in ["", "abc", "-5", "1.5"] {
            assert!(matches!(parse_size_mb(bad), Err(TierSimError::InvalidSize(_))));
        }
    }

    #[test]
    fn test_advance_empty_bucket_is_rejected() {
        let mut sim = Simulator::default();
        assert!(matches!(sim.advance(30), Err(TierSimError::NothingToAdvance)));
        assert_eq!(sim.current_day(), 0);
    }

    #[test]
    fn test_default_steps_walk_every_tier() {
        let mut sim = sim_with_files(&[1024]);
        let mut seen = Vec::new();

        for _ in 0..13 {
            sim.advance(DEFAULT_STEP_DAYS).unwrap();
            seen.push(sim.files()[0].tier);
        }

        assert_eq!(seen[0], StorageTier::InfrequentAccess); // day 30
        assert_eq!(seen[1], StorageTier::InfrequentAccess); // day 60
        assert_eq!(seen[2], StorageTier::Archive); // day 90
        assert_eq!(seen[11], StorageTier::Archive); // day 360
        assert_eq!(seen[12], StorageTier::DeepArchive); // day 390
        assert_eq!(sim.current_day(), 390);
    }

    #[test]
    fn test_large_jump_lands_on_deep_archive_only() {
        let mut sim = sim_with_files(&[1024]);
        let transitions = sim.advance(400).unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, StorageTier::Standard);
        assert_eq!(transitions[0].to, StorageTier::DeepArchive);
    }

    #[test]
    fn test_archive_threshold_reached_from_standard_and_ia() {
        let mut direct = sim_with_files(&[1024]);
        direct.advance(90).unwrap();
        assert_eq!(direct.files()[0].tier, StorageTier::Archive);

        let mut stepped = sim_with_files(&[1024]);
        stepped.advance(30).unwrap();
        assert_eq!(stepped.files()[0].tier, StorageTier::InfrequentAccess);
        stepped.advance(60).unwrap();
        assert_eq!(stepped.files()[0].tier, StorageTier::Archive);
    }

    #[test]
    fn test_tiers_never_warm_across_advances() {
        let mut sim = sim_with_files(&[10, 20, 30]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut last: Vec<StorageTier> = sim.files().iter().map(|f| f.tier).collect();

        for _ in 0..50 {
            sim.advance(rng.gen_range(0..120)).unwrap();
            let now: Vec<StorageTier> = sim.files().iter().map(|f| f.tier).collect();
            for (before, after) in last.iter().zip(&now) {
                assert!(after.index() >= before.index());
            }
            last = now;
        }
    }

    #[test]
    fn test_cost_recomputed_at_new_tier_rate() {
        let mut sim = sim_with_files(&[2048]); // 2 GB
        sim.advance(30).unwrap();

        let file = &sim.files()[0];
        assert_eq!(file.tier, StorageTier::InfrequentAccess);
        // whole month billed at the IA rate, not Standard
        assert!(approx(file.accrued_cost, 0.0125 * 2.0));
        assert_eq!(file.accrued_cost, recompute_cost(sim.prices(), file));
    }

    #[test]
    fn test_cost_accrues_without_transition() {
        let mut sim = sim_with_files(&[1024]);
        sim.advance(10).unwrap();
        assert!(approx(sim.files()[0].accrued_cost, 0.023 * 10.0 / 30.0));
    }

    #[test]
    fn test_update_policy_applies_without_ageing() {
        let mut sim = sim_with_files(&[1024]);
        sim.advance(20).unwrap();
        assert_eq!(sim.files()[0].tier, StorageTier::Standard);

        let mut policy = LifecyclePolicy::default();
        policy.ia_days = 15;
        let transitions = sim.update_policy(policy.clone());

        assert_eq!(transitions.len(), 1);
        assert_eq!(sim.files()[0].tier, StorageTier::InfrequentAccess);
        assert_eq!(sim.files()[0].age_days, 20);
        assert_eq!(sim.current_day(), 20);
        assert_eq!(sim.policy(), &policy);
    }

    #[test]
    fn test_retrieve_prices_without_mutation() {
        let mut sim = sim_with_files(&[2048]);
        sim.advance(90).unwrap();
        let before = sim.files().to_vec();

        let retrieval = sim.retrieve(1).unwrap();
        assert_eq!(retrieval.tier, StorageTier::Archive);
        assert_eq!(retrieval.latency.label(), "1-5 minutes");
        assert!(approx(retrieval.cost, 0.03 * 2.0));
        assert!(retrieval.latency.restore_delay().is_some());
        assert_eq!(sim.files(), before.as_slice());
    }

    #[test]
    fn test_retrieve_errors() {
        let sim = Simulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(sim.retrieve(1), Err(TierSimError::NoFiles("retrieve"))));
        assert!(matches!(
            sim.retrieve_random(&mut rng),
            Err(TierSimError::NoFiles("retrieve"))
        ));

        let sim = sim_with_files(&[1]);
        assert!(matches!(sim.retrieve(9), Err(TierSimError::FileNotFound(9))));
    }

    #[test]
    fn test_retrieve_random_is_reproducible() {
        let sim = sim_with_files(&[1, 2, 3, 4, 5]);
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| sim.retrieve_random(&mut rng).unwrap().file_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
        assert!(picks(42).iter().all(|id| (1..=5).contains(id)));
    }

    #[test]
    fn test_delete_pops_last() {
        let mut sim = sim_with_files(&[1, 2, 3]);
        let deleted = sim.delete_last().unwrap();
        assert_eq!(deleted.id, 3);
        assert_eq!(sim.files().len(), 2);
    }

    #[test]
    fn test_delete_empty_mutates_nothing() {
        let mut sim = Simulator::default();
        assert!(matches!(sim.delete_last(), Err(TierSimError::NoFiles("delete"))));
        assert!(sim.files().is_empty());
        assert_eq!(sim.current_day(), 0);

        // ids keep counting after a failed delete
        assert_eq!(sim.upload("a", 1).unwrap().id, 1);
    }

    #[test]
    fn test_reset_keeps_policy() {
        let mut sim = sim_with_files(&[1, 2]);
        let mut policy = LifecyclePolicy::default();
        policy.enable_glacier = false;
        sim.update_policy(policy.clone());
        sim.advance(60).unwrap();

        sim.reset();

        assert!(sim.files().is_empty());
        assert_eq!(sim.current_day(), 0);
        assert_eq!(sim.policy(), &policy);
        assert_eq!(sim.upload("fresh", 1).unwrap().id, 1);
    }

    #[test]
    fn test_tier_counts_and_snapshot() {
        let mut sim = sim_with_files(&[1, 2]);
        sim.advance(30).unwrap();
        sim.upload("new", 3).unwrap();

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.current_day, 30);
        assert_eq!(snapshot.counts.get(StorageTier::InfrequentAccess), 2);
        assert_eq!(snapshot.counts.get(StorageTier::Standard), 1);
        assert_eq!(snapshot.files.len(), 3);
        assert_eq!(
            snapshot.active,
            vec![StorageTier::Standard, StorageTier::InfrequentAccess]
        );
    }

    #[test]
    fn test_timeline_statuses() {
        let mut sim = sim_with_files(&[1]);
        let timeline = sim.timeline();
        let days: Vec<_> = timeline.iter().map(|m| m.day).collect();
        assert_eq!(days, vec![0, 30, 90, 365]);
        assert_eq!(timeline[0].status, MarkerStatus::Completed);
        assert_eq!(timeline[1].status, MarkerStatus::Active);
        assert_eq!(timeline[2].status, MarkerStatus::Pending);

        sim.advance(60).unwrap();
        let timeline = sim.timeline();
        assert_eq!(timeline[1].status, MarkerStatus::Completed);
        assert_eq!(timeline[2].status, MarkerStatus::Active);
        assert_eq!(timeline[3].status, MarkerStatus::Pending);
    }

    #[test]
    fn test_timeline_skips_disabled_rules() {
        let mut sim = Simulator::default();
        let mut policy = LifecyclePolicy::default();
        policy.enable_ia = false;
        sim.update_policy(policy);

        let labels: Vec<_> = sim.timeline().into_iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["Upload", "Glacier", "Deep Archive"]);
    }
}
