//! Run reporting for DAG job runs.
//!
//! The scheduler hands a [`Reporter`] the run's notification policy and a
//! status snapshot at two points: when a step completes and when the run
//! ends. The reporter logs progress and a summary, and sends mail and push
//! messages through the configured channels.

pub use dagreport_channels as channels;
pub use dagreport_reporter as reporter;

pub use dagreport_channels::ChannelSet;
pub use dagreport_core::{ReportError, ReporterConfig, Result, RunConfig, RunStatus, StepPolicy};
pub use dagreport_reporter::{Reporter, RunError};

/// Build a reporter whose channels and base URL come from `config`.
pub fn reporter_from_config(config: &ReporterConfig) -> Reporter {
    let channels = ChannelSet::from_config(config);
    Reporter::new(channels.mailer, channels.push, config.resolve_server_url())
}
