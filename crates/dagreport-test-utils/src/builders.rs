use dagreport_core::policy::{MailConfig, RunConfig, TopicConfig};
use dagreport_core::types::{NodeState, NodeStatus, RunState, RunStatus};

/// Builder for [`RunConfig`] with every gate off by default.
pub struct ConfigBuilder {
    config: RunConfig,
}

impl ConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            config: RunConfig {
                name: name.to_string(),
                location: format!("/etc/dagu/jobs/{name}.yaml"),
                ..Default::default()
            },
        }
    }

    pub fn location(mut self, location: &str) -> Self {
        self.config.location = location.to_string();
        self
    }

    pub fn mail_on_success(mut self) -> Self {
        self.config.mail_on.success = true;
        self
    }

    pub fn mail_on_failure(mut self) -> Self {
        self.config.mail_on.failure = true;
        self
    }

    pub fn notify_on_success(mut self) -> Self {
        self.config.notification_on.success = true;
        self
    }

    pub fn notify_on_failure(mut self) -> Self {
        self.config.notification_on.failure = true;
        self
    }

    pub fn error_mail(mut self, from: &str, to: &str, prefix: &str) -> Self {
        self.config.error_mail = mail(from, to, prefix);
        self
    }

    pub fn info_mail(mut self, from: &str, to: &str, prefix: &str) -> Self {
        self.config.info_mail = mail(from, to, prefix);
        self
    }

    pub fn topics(mut self, error_topic: &str, info_topic: &str) -> Self {
        self.config.error_topic = TopicConfig { topic: error_topic.to_string() };
        self.config.info_topic = TopicConfig { topic: info_topic.to_string() };
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

fn mail(from: &str, to: &str, prefix: &str) -> MailConfig {
    MailConfig {
        from: from.to_string(),
        to: to.to_string(),
        prefix: prefix.to_string(),
    }
}

/// Builder for [`RunStatus`] snapshots.
///
/// Without an explicit [`state`](Self::state) the run is `Error` if any step
/// failed and `Success` otherwise.
pub struct StatusBuilder {
    status: RunStatus,
    state: Option<RunState>,
}

impl StatusBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            status: RunStatus {
                request_id: "req-0001".to_string(),
                name: name.to_string(),
                started_at: "2026-10-17 02:00:00".to_string(),
                finished_at: "2026-10-17 02:05:00".to_string(),
                ..Default::default()
            },
            state: None,
        }
    }

    pub fn state(mut self, state: RunState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn node(mut self, node: NodeStatus) -> Self {
        self.status.nodes.push(node);
        self
    }

    pub fn succeeded(self, name: &str) -> Self {
        let mut node = NodeStatus::new(name, NodeState::Success);
        node.command = "true".to_string();
        self.node(node)
    }

    pub fn failed(self, name: &str, error: &str) -> Self {
        let mut node = NodeStatus::new(name, NodeState::Error);
        node.command = "false".to_string();
        node.error = error.to_string();
        self.node(node)
    }

    pub fn build(mut self) -> RunStatus {
        self.status.status = self.state.unwrap_or_else(|| {
            if self.status.nodes.iter().any(|n| n.status == NodeState::Error) {
                RunState::Error
            } else {
                RunState::Success
            }
        });
        self.status
    }
}
