use serde::{Deserialize, Serialize};

/// Success/failure gate for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyOn {
    pub success: bool,
    pub failure: bool,
}

/// Sender identity for one kind of mail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub from: String,
    pub to: String,
    /// Prepended to the subject line.
    pub prefix: String,
}

impl MailConfig {
    /// A definition names a single `to` address; senders take a list.
    pub fn recipients(&self) -> Vec<String> {
        vec![self.to.clone()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub topic: String,
}

/// Notification policy of one DAG definition.
///
/// Gates and destinations are independent: an enabled gate with an empty
/// destination loads fine and fails when the channel is asked to send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub name: String,
    /// Path of the definition file, used to derive the history link.
    pub location: String,
    pub mail_on: NotifyOn,
    pub notification_on: NotifyOn,
    pub error_mail: MailConfig,
    pub info_mail: MailConfig,
    pub error_topic: TopicConfig,
    pub info_topic: TopicConfig,
}

impl RunConfig {
    pub fn mail_on_success(&self) -> bool {
        self.mail_on.success
    }

    pub fn mail_on_failure(&self) -> bool {
        self.mail_on.failure
    }

    pub fn notify_on_success(&self) -> bool {
        self.notification_on.success
    }

    pub fn notify_on_failure(&self) -> bool {
        self.notification_on.failure
    }

    /// Parse the notification section of a definition written as TOML.
    pub fn from_toml(input: &str) -> crate::error::Result<Self> {
        toml::from_str(input).map_err(|e| crate::error::ReportError::Config(e.to_string()))
    }
}

/// Per-step override. Independent of the run-level mail gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepPolicy {
    pub mail_on_error: bool,
}
