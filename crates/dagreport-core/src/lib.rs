pub mod config;
pub mod error;
pub mod policy;
pub mod traits;
pub mod types;

pub use config::ReporterConfig;
pub use error::{ReportError, Result};
pub use policy::{MailConfig, NotifyOn, RunConfig, StepPolicy, TopicConfig};
pub use traits::{MailSender, PushSender};
pub use types::*;
