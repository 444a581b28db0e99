//! Interactive / scripted simulation session
//!
//! Drives a [`Simulator`] from text commands, reports through a
//! [`Presenter`] and delivers delayed restore notices as they fire. All state
//! mutation happens on the session task; restore timers only send on a
//! channel.

use rand::rngs::StdRng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use tiersim_core::{Presenter, Result, Retrieval, Transition};

use crate::command::{self, Command, PolicyAction, UploadArgs};
use crate::restore::{RestoreNotice, RestoreNotifier};
use crate::simulator::Simulator;

/// Whether the session should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A simulator bound to a presenter and a restore notifier
pub struct Session<P: Presenter> {
    sim: Simulator,
    presenter: P,
    notifier: RestoreNotifier,
    rng: StdRng,
}

impl<P: Presenter> Session<P> {
    pub fn new(sim: Simulator, presenter: P, rng: StdRng) -> Self {
        Self {
            sim,
            presenter,
            notifier: RestoreNotifier::new(),
            rng,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn pending_restores(&self) -> usize {
        self.notifier.pending()
    }

    /// Read commands until end of input or `quit`, delivering restore notices
    /// in between. Restores still pending at the end are abandoned.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                Some(notice) = self.notifier.next(), if self.notifier.pending() > 0 => {
                    self.deliver(notice);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
            }
        }

        let abandoned = self.notifier.cancel_all();
        if abandoned > 0 {
            self.presenter
                .notice(&format!("Abandoned {abandoned} pending retrieval(s)"));
        }
        Ok(())
    }

    /// Parse and execute one line. Errors are reported, never returned.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        self.flush_ready();

        match Command::parse_line(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Flow::Continue,
            Err(err) => {
                self.presenter.alert(&err.to_string());
                Flow::Continue
            }
        }
    }

    /// Execute a command, reporting validation errors to the presenter
    pub async fn execute(&mut self, command: Command) -> Flow {
        debug!(?command, "Executing command");

        let outcome = match command {
            Command::Upload(args) => self.upload(&args),
            Command::Advance { days } => self.advance(days),
            Command::Retrieve { id } => self.retrieve(id),
            Command::Delete => self.delete(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::Estimate { size_gb, months } => self.estimate(size_gb, months),
            Command::Policy { action: None } => {
                self.presenter.policy(self.sim.policy());
                Ok(())
            }
            Command::Policy {
                action: Some(PolicyAction::Set { settings }),
            } => self.set_policy(&settings),
            Command::Status => {
                self.presenter.snapshot(&self.sim.snapshot());
                Ok(())
            }
            Command::Tiers => {
                self.presenter.prices(self.sim.prices());
                Ok(())
            }
            Command::Wait => {
                self.wait_for_restores().await;
                Ok(())
            }
            Command::Help { command: topic } => command::help(topic.as_deref())
                .map(|text| self.presenter.notice(&text)),
            Command::Quit => return Flow::Quit,
        };

        if let Err(err) = outcome {
            self.presenter.alert(&err.to_string());
        }
        Flow::Continue
    }

    /// Block until every pending restore has been delivered
    pub async fn wait_for_restores(&mut self) {
        let pending = self.notifier.pending();
        if pending == 0 {
            self.presenter.notice("No retrievals in progress");
            return;
        }

        info!(pending, "Waiting for pending restores");
        while let Some(notice) = self.notifier.next().await {
            self.deliver(notice);
        }
    }

    fn upload(&mut self, args: &UploadArgs) -> Result<()> {
        let (name, size_mb) = args.name_and_size()?;
        let file = self.sim.upload(&name, size_mb)?;
        let message = format!("Uploaded {} ({} MB) to S3 Standard", file.name, file.size_mb);
        self.presenter.notice(&message);
        self.presenter.snapshot(&self.sim.snapshot());
        Ok(())
    }

    fn advance(&mut self, days: Option<u32>) -> Result<()> {
        let days = days.unwrap_or(self.sim.step_days());
        if self.sim.files().is_empty() {
            // same error the simulator would give, before announcing anything
            return self.sim.advance(days).map(|_| ());
        }

        self.presenter
            .notice(&format!("Simulating {days}-day lifecycle progression..."));
        let transitions = self.sim.advance(days)?;
        self.report_transitions(&transitions);
        self.presenter
            .notice(&format!("Advanced to day {}", self.sim.current_day()));
        self.presenter.snapshot(&self.sim.snapshot());
        Ok(())
    }

    fn retrieve(&mut self, id: Option<u64>) -> Result<()> {
        let retrieval = match id {
            Some(id) => self.sim.retrieve(id)?,
            None => self.sim.retrieve_random(&mut self.rng)?,
        };
        self.report_retrieval(&retrieval);
        Ok(())
    }

    fn report_retrieval(&mut self, retrieval: &Retrieval) {
        self.presenter.notice(&format!(
            "Retrieving {} from {}",
            retrieval.name,
            retrieval.tier.key().to_uppercase()
        ));
        self.presenter
            .notice(&format!("Retrieval time: {}", retrieval.latency));
        self.presenter
            .notice(&format!("Retrieval cost: ${:.4}", retrieval.cost));

        if self.notifier.schedule(retrieval).is_some() {
            self.presenter.notice(&format!(
                "Initiating retrieval process for {}...",
                retrieval.name
            ));
        } else {
            self.presenter
                .notice(&format!("{} retrieved instantly", retrieval.name));
        }
    }

    fn delete(&mut self) -> Result<()> {
        let file = self.sim.delete_last()?;
        self.presenter.notice(&format!(
            "Deleted {} from {}",
            file.name,
            file.tier.key().to_uppercase()
        ));
        self.presenter.snapshot(&self.sim.snapshot());
        Ok(())
    }

    fn reset(&mut self) {
        let cancelled = self.notifier.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "Reset cancelled pending restores");
        }
        self.sim.reset();
        self.presenter.snapshot(&self.sim.snapshot());
        self.presenter.notice("Simulation reset");
    }

    fn estimate(&mut self, size_gb: f64, months: f64) -> Result<()> {
        let estimate = self.sim.prices().estimate(size_gb, months)?;
        self.presenter.estimate(&estimate);
        Ok(())
    }

    fn set_policy(&mut self, settings: &[(String, String)]) -> Result<()> {
        let mut policy = self.sim.policy().clone();
        for (key, value) in settings {
            policy.apply_setting(key, value)?;
        }

        let transitions = self.sim.update_policy(policy);
        self.presenter.notice("Lifecycle policy updated");
        self.report_transitions(&transitions);
        self.presenter.policy(self.sim.policy());
        self.presenter.snapshot(&self.sim.snapshot());
        Ok(())
    }

    fn report_transitions(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            self.presenter.notice(&format!(
                "{} transitioned to {}",
                transition.name, transition.to
            ));
        }
    }

    fn deliver(&mut self, notice: RestoreNotice) {
        self.presenter.notice(&notice.message());
    }

    fn flush_ready(&mut self) {
        while let Some(notice) = self.notifier.try_next() {
            self.deliver(notice);
        }
    }
}
