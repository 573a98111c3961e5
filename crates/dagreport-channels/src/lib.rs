pub mod log_channel;
pub mod ntfy;
pub mod spool;

use std::sync::Arc;

use tracing::info;

use dagreport_core::config::ReporterConfig;
use dagreport_core::traits::{MailSender, PushSender};

pub use log_channel::LogChannel;
pub use ntfy::NtfyAdapter;
pub use spool::SpoolMailer;

/// The pair of channels a reporter sends through.
#[derive(Clone)]
pub struct ChannelSet {
    pub mailer: Arc<dyn MailSender>,
    pub push: Arc<dyn PushSender>,
}

impl ChannelSet {
    /// Build channels from configuration. Unconfigured channels only log.
    pub fn from_config(config: &ReporterConfig) -> Self {
        let mailer: Arc<dyn MailSender> = match config.spool_dir() {
            Some(dir) => Arc::new(SpoolMailer::new(dir)),
            None => Arc::new(LogChannel),
        };
        let push: Arc<dyn PushSender> = match &config.ntfy {
            Some(ntfy) => Arc::new(NtfyAdapter::new(ntfy.clone())),
            None => Arc::new(LogChannel),
        };
        info!(mail = mailer.name(), push = push.name(), "Notification channels configured");
        Self { mailer, push }
    }
}
