//! Presenters for terminal text and JSON lines

use std::io::Write;

use chrono::Local;
use serde_json::json;

use tiersim_core::{
    CostEstimate, LifecyclePolicy, MarkerStatus, PolicyRule, Presenter, PriceTable, Snapshot,
    StorageTier,
};

/// Human-readable output, one timestamped line per notice
pub struct TerminalPresenter<W: Write> {
    out: W,
    timestamps: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            timestamps: true,
        }
    }

    /// Drop the `[HH:MM:SS]` prefix (stable output for tests and diffs)
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // a closed stdout is not worth aborting a session over
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn notice(&mut self, message: &str) {
        if self.timestamps {
            let stamp = Local::now().format("%H:%M:%S");
            self.line(&format!("[{stamp}] {message}"));
        } else {
            self.line(message);
        }
    }

    fn alert(&mut self, message: &str) {
        self.line(&format!("⚠️  {message}"));
    }

    fn snapshot(&mut self, snapshot: &Snapshot) {
        self.line(&format!("Day {}", snapshot.current_day));
        self.line(&format!(
            "  {:<14} {:>5}",
            "Storage class", "Files"
        ));
        for tier in StorageTier::ALL {
            let marker = if snapshot.active.contains(&tier) { "●" } else { " " };
            self.line(&format!(
                "{marker} {:<14} {:>5}",
                tier.display_name(),
                snapshot.counts.get(tier)
            ));
        }

        if snapshot.files.is_empty() {
            self.line("No files uploaded yet. Upload a file to get started!");
        } else {
            self.line(&format!(
                "  {:>4}  {:<24} {:>8} {:>6}  {:<13} {:<12} {:>10}",
                "ID", "Name", "Size", "Age", "Class", "Retrieval", "Cost"
            ));
            for file in &snapshot.files {
                self.line(&format!(
                    "  {:>4}  {:<24} {:>5} MB {:>4} d  {:<13} {:<12} ${:>9.4}",
                    file.id,
                    file.name,
                    file.size_mb,
                    file.age_days,
                    file.tier.display_name(),
                    file.latency.label(),
                    file.accrued_cost,
                ));
            }
        }

        let timeline: Vec<String> = snapshot
            .timeline
            .iter()
            .map(|marker| {
                let dot = match marker.status {
                    MarkerStatus::Completed => "✓",
                    MarkerStatus::Active => "→",
                    MarkerStatus::Pending => "·",
                };
                format!("{dot} day {} {}", marker.day, marker.label)
            })
            .collect();
        self.line(&format!("Timeline: {}", timeline.join("  ")));
    }

    fn estimate(&mut self, estimate: &CostEstimate) {
        self.line(&format!(
            "Cost of storing {} GB for {} months:",
            estimate.size_gb, estimate.months
        ));
        for cost in &estimate.tiers {
            let cheapest = if cost.tier == estimate.cheapest {
                "  💰 Cheapest"
            } else {
                ""
            };
            self.line(&format!(
                "  {:<14} ${:>10.2}  (${:.3}/month){cheapest}",
                cost.tier.display_name(),
                cost.total_cost,
                cost.monthly_cost,
            ));
        }
    }

    fn prices(&mut self, prices: &PriceTable) {
        self.line(&format!(
            "  {:<14} {:>12} {:>14}  {}",
            "Storage class", "Storage/GB", "Retrieval/GB", "Retrieval time"
        ));
        for tier in StorageTier::ALL {
            self.line(&format!(
                "  {:<14} ${:>11} ${:>13}  {}",
                tier.display_name(),
                prices.storage_price(tier),
                prices.retrieval_price(tier),
                tier.latency().label(),
            ));
        }
    }

    fn policy(&mut self, policy: &LifecyclePolicy) {
        self.line("Lifecycle policy:");
        for rule in PolicyRule::ALL {
            let state = if policy.is_enabled(rule) { "on " } else { "off" };
            let action = match rule.target() {
                Some(tier) => format!("move to {}", tier.display_name()),
                None => "delete (not enforced)".to_string(),
            };
            self.line(&format!(
                "  {:<13} {state} after {:>5} days: {action}",
                rule.key(),
                policy.days(rule)
            ));
        }
    }
}

/// Machine-readable output, one JSON object per line
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &str, body: serde_json::Value) {
        let value = json!({ "event": event, "data": body });
        let _ = writeln!(self.out, "{value}");
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn notice(&mut self, message: &str) {
        self.emit("notice", json!(message));
    }

    fn alert(&mut self, message: &str) {
        self.emit("alert", json!(message));
    }

    fn snapshot(&mut self, snapshot: &Snapshot) {
        self.emit("snapshot", json!(snapshot));
    }

    fn estimate(&mut self, estimate: &CostEstimate) {
        self.emit("estimate", json!(estimate));
    }

    fn prices(&mut self, prices: &PriceTable) {
        self.emit("prices", json!(prices));
    }

    fn policy(&mut self, policy: &LifecyclePolicy) {
        self.emit("policy", json!(policy));
    }
}
