//! Session command language
//!
//! One command per line, declared with clap derive and parsed without a
//! binary name. Blank lines and lines starting with `#` are skipped. The verb
//! is case-insensitive; `help` and `<command> --help` print the generated
//! usage.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use tiersim_core::{FileId, Result, TierSimError};

use crate::simulator::parse_size_mb;

#[derive(Parser, Debug)]
#[command(
    name = "session",
    no_binary_name = true,
    disable_help_subcommand = true,
    help_template = "Commands:\n{subcommands}"
)]
struct SessionLine {
    #[command(subcommand)]
    command: Command,
}

/// A parsed session command
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Upload a file to Standard
    Upload(UploadArgs),

    /// Advance time (default: one step)
    Advance {
        /// Days to advance
        days: Option<u32>,
    },

    /// Retrieve a file (random if no id)
    Retrieve {
        /// File id
        id: Option<FileId>,
    },

    /// Delete the most recently uploaded file
    Delete,

    /// Clear all files (policy is kept)
    Reset,

    /// Compare storage cost across tiers
    Estimate {
        /// Data size in GB
        #[arg(allow_negative_numbers = true)]
        size_gb: f64,

        /// Storage duration in months
        #[arg(allow_negative_numbers = true)]
        months: f64,
    },

    /// Show or change the lifecycle policy
    Policy {
        #[command(subcommand)]
        action: Option<PolicyAction>,
    },

    /// Show files, tier counts and timeline
    #[command(visible_alias = "ls")]
    Status,

    /// Show price tables
    Tiers,

    /// Wait for pending restores to complete
    Wait,

    /// Show this help, or the usage of one command
    #[command(alias = "?")]
    Help {
        /// Command to describe
        command: Option<String>,
    },

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// `upload <name...> <size-mb>`: the last word is the size, the rest the name
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct UploadArgs {
    /// File name (may contain spaces) followed by its size in MB
    #[arg(value_name = "NAME SIZE_MB", num_args = 0..)]
    words: Vec<String>,
}

impl UploadArgs {
    /// Split into a file name and a size in MB
    pub fn name_and_size(&self) -> Result<(String, u64)> {
        match self.words.split_last() {
            None => Err(TierSimError::EmptyName),
            Some((_, [])) => Err(TierSimError::MissingSize),
            Some((size, name)) => Ok((name.join(" "), parse_size_mb(size)?)),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PolicyAction {
    /// Change rules: ia, glacier, deep-archive, deletion = on/off; <rule>-days = days
    Set {
        /// Settings as key=value
        #[arg(required = true, value_name = "KEY=VALUE", value_parser = parse_setting)]
        settings: Vec<(String, String)>,
    },
}

fn parse_setting(text: &str) -> Result<(String, String)> {
    text.split_once('=')
        .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
        .ok_or_else(|| TierSimError::policy(format!("expected <key>=<value>, got '{text}'")))
}

impl Command {
    /// Parse one input line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse_line(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        words[0] = words[0].to_ascii_lowercase();

        match SessionLine::try_parse_from(&words) {
            Ok(parsed) => Ok(Some(parsed.command)),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => Ok(Some(Command::Help {
                command: Some(words[0].clone()).filter(|verb| !verb.starts_with('-')),
            })),
            Err(err) => Err(clap_error(&err)),
        }
    }
}

/// Usage of every command, or of one command when `topic` is given
pub fn help(topic: Option<&str>) -> Result<String> {
    let mut cmd = SessionLine::command();
    let text = match topic {
        None => cmd.render_help(),
        Some(name) => cmd
            .find_subcommand_mut(name)
            .ok_or_else(|| TierSimError::command(format!("no help for unknown command '{name}'")))?
            .render_help(),
    };
    Ok(text.to_string().trim_end().to_string())
}

// clap renders a multi-line report; the session shows only its first line
fn clap_error(err: &clap::Error) -> TierSimError {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    TierSimError::command(first.trim_start_matches("error: "))
}
