//! tiersim Engine
//!
//! Object-storage lifecycle simulator: files age in simulated days, move to
//! colder storage classes as policy thresholds are crossed, and accrue
//! storage cost at their current class's rate.
//!
//! - [`simulator`]: the owned simulator state and its operations
//! - [`restore`]: cancellable delayed notices for cold-tier retrievals
//! - [`session`]: command-driven session over a [`tiersim_core::Presenter`]
//! - [`command`], [`config`], [`render`]: input, settings and output

pub mod command;
pub mod config;
pub mod render;
pub mod restore;
pub mod session;
pub mod simulator;

pub use command::{Command, PolicyAction, UploadArgs};
pub use config::SimConfig;
pub use render::{JsonPresenter, TerminalPresenter};
pub use restore::{JobId, RestoreNotice, RestoreNotifier};
pub use session::{Flow, Session};
pub use simulator::{DEFAULT_STEP_DAYS, Simulator, parse_size_mb, recompute_cost};
