use std::error::Error;
use std::sync::Arc;

use tracing::{debug, info, warn};

use dagreport_core::error::Result;
use dagreport_core::policy::{MailConfig, RunConfig, StepPolicy};
use dagreport_core::traits::{MailSender, PushSender};
use dagreport_core::types::{NodeState, NodeStatus, RunState, RunStatus};

use crate::link::history_url;
use crate::render::{render_failure_digest, render_html, render_step_table, render_summary};

/// Error that ended a run, as handed over by the scheduler.
pub type RunError<'a> = Option<&'a (dyn Error + Send + Sync)>;

/// Turns step and run completions into log output, mail and push messages.
///
/// Holds only its two channels and the base URL, so one instance can be
/// shared by every step of a run. Errors returned from here describe the
/// notification attempt and never the run itself.
pub struct Reporter {
    mailer: Arc<dyn MailSender>,
    push: Arc<dyn PushSender>,
    server_url: String,
}

impl Reporter {
    pub fn new(
        mailer: Arc<dyn MailSender>,
        push: Arc<dyn PushSender>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            push,
            server_url: server_url.into(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Called by the scheduler whenever a step finishes.
    ///
    /// Logs progress, and mails the full step table when the step failed and
    /// its policy asks for it.
    pub async fn on_step_complete(
        &self,
        config: &RunConfig,
        step: &StepPolicy,
        status: &RunStatus,
        node: &NodeStatus,
    ) -> Result<()> {
        if node.status != NodeState::None {
            info!(dag = %config.name, "{} {}", node.name, node.status_text);
        }
        if node.status == NodeState::Error && step.mail_on_error {
            debug!(dag = %config.name, step = %node.name, "Sending step failure mail");
            return self.mail(&config.error_mail, config, status).await;
        }
        Ok(())
    }

    /// Called by the scheduler once the run has ended.
    ///
    /// The summary is always logged first. Both channels are attempted; the
    /// first error is returned and a later one is only logged.
    pub async fn on_run_complete(
        &self,
        config: &RunConfig,
        status: &RunStatus,
        run_error: RunError<'_>,
    ) -> Result<()> {
        self.report_summary(status, run_error);

        let mail = self.send_mail(config, status, run_error).await;
        let push = self.send_notification(config, status, run_error).await;

        match (mail, push) {
            (Err(mail_err), Err(push_err)) => {
                warn!(dag = %config.name, error = %push_err, "Run notification failed");
                Err(mail_err)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Log the run summary and step table.
    pub fn report_summary(&self, status: &RunStatus, run_error: RunError<'_>) {
        let summary = render_summary(status, run_error.map(|e| e as &dyn Error));
        let details = render_step_table(&status.nodes);
        info!("\nSummary ->\n{}\nDetails ->\n{}", summary, details);
    }

    /// Run-level mail, gated by `mail_on`.
    ///
    /// Failure mail errors are returned. Success mail is best-effort: its
    /// error is logged and dropped so a successful run never reports failure.
    pub async fn send_mail(
        &self,
        config: &RunConfig,
        status: &RunStatus,
        run_error: RunError<'_>,
    ) -> Result<()> {
        if is_failure(status, run_error) {
            if config.mail_on_failure() {
                return self.mail(&config.error_mail, config, status).await;
            }
        } else if status.status == RunState::Success && config.mail_on_success() {
            if let Err(e) = self.mail(&config.info_mail, config, status).await {
                warn!(dag = %config.name, error = %e, "Success mail not delivered");
            }
        }
        Ok(())
    }

    /// Run-level push message, gated by `notification_on`. Errors are returned.
    pub async fn send_notification(
        &self,
        config: &RunConfig,
        status: &RunStatus,
        run_error: RunError<'_>,
    ) -> Result<()> {
        let url = history_url(&self.server_url, &config.location);
        let subject = format!("{} ({})", config.name, status.status);

        if is_failure(status, run_error) {
            if config.notify_on_failure() {
                let body = render_failure_digest(&status.nodes);
                debug!(dag = %config.name, channel = self.push.name(), "Sending failure notification");
                return self
                    .push
                    .send_notification(&config.error_topic.topic, &subject, &body, &url)
                    .await;
            }
        } else if status.status == RunState::Success && config.notify_on_success() {
            debug!(dag = %config.name, channel = self.push.name(), "Sending success notification");
            return self
                .push
                .send_notification(&config.info_topic.topic, &subject, "", &url)
                .await;
        }
        Ok(())
    }

    async fn mail(&self, identity: &MailConfig, config: &RunConfig, status: &RunStatus) -> Result<()> {
        let subject = format!("{} {} ({})", identity.prefix, config.name, status.status);
        let body = render_html(&status.nodes);
        let to = identity.recipients();
        debug!(dag = %config.name, channel = self.mailer.name(), subject = %subject, "Sending mail");
        self.mailer
            .send_mail(&identity.from, &to, &subject, &body)
            .await
    }
}

/// A run error overrides whatever state the run ended in.
fn is_failure(status: &RunStatus, run_error: RunError<'_>) -> bool {
    run_error.is_some() || status.status == RunState::Error
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagreport_core::error::ReportError;
    use dagreport_test_utils::{
        failing_channels, recording_channels, ConfigBuilder, LogCapture, StatusBuilder,
    };

    fn reporter_with(
        mailer: Arc<dyn MailSender>,
        push: Arc<dyn PushSender>,
    ) -> Reporter {
        Reporter::new(mailer, push, "http://localhost:8080")
    }

    #[tokio::test]
    async fn step_success_sends_nothing() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push.clone());
        let config = ConfigBuilder::new("etl").mail_on_failure().build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();

        reporter
            .on_step_complete(&config, &StepPolicy { mail_on_error: true }, &status, &status.nodes[0])
            .await
            .unwrap();
        assert!(mailer.sent().is_empty());
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn step_error_without_step_policy_sends_nothing() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl").mail_on_failure().build();
        let status = StatusBuilder::new("etl").failed("load", "exit code 1").build();

        reporter
            .on_step_complete(&config, &StepPolicy::default(), &status, &status.nodes[0])
            .await
            .unwrap();
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn step_error_mail_uses_error_identity_and_full_table() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl")
            .error_mail("dagu@example.com", "oncall@example.com", "[ERR]")
            .build();
        let status = StatusBuilder::new("etl")
            .state(RunState::Running)
            .succeeded("extract")
            .failed("load", "exit code 1")
            .build();

        reporter
            .on_step_complete(&config, &StepPolicy { mail_on_error: true }, &status, &status.nodes[1])
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "dagu@example.com");
        assert_eq!(sent[0].to, vec!["oncall@example.com"]);
        assert_eq!(sent[0].subject, "[ERR] etl (Running)");
        assert!(sent[0].body.contains("extract"));
        assert!(sent[0].body.contains("exit code 1"));
    }

    #[tokio::test]
    async fn step_mail_error_is_returned_unchanged() {
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer, push);
        let config = ConfigBuilder::new("etl").build();
        let status = StatusBuilder::new("etl").failed("load", "boom").build();

        let err = reporter
            .on_step_complete(&config, &StepPolicy { mail_on_error: true }, &status, &status.nodes[0])
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Delivery { .. }));
    }

    #[tokio::test]
    async fn failure_mail_gate_off_never_mails() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl").build();
        let status = StatusBuilder::new("etl").failed("load", "boom").build();

        reporter.on_run_complete(&config, &status, None).await.unwrap();
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn run_error_forces_failure_branch() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl")
            .mail_on_failure()
            .mail_on_success()
            .error_mail("err@example.com", "oncall@example.com", "[ERR]")
            .info_mail("info@example.com", "team@example.com", "[OK]")
            .build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();
        let run_err = ReportError::Config("lost contact with executor".into());

        reporter
            .send_mail(&config, &status, Some(&run_err))
            .await
            .unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "err@example.com");
        assert_eq!(sent[0].subject, "[ERR] etl (Success)");
    }

    // Success mail is best-effort while failure mail propagates. Keep it that way.
    #[tokio::test]
    async fn success_mail_error_is_swallowed() {
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl").mail_on_success().build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();

        reporter.on_run_complete(&config, &status, None).await.unwrap();
        assert_eq!(mailer.attempts(), 1);
    }

    #[tokio::test]
    async fn failure_mail_error_is_returned() {
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl").mail_on_failure().build();
        let status = StatusBuilder::new("etl").failed("load", "boom").build();

        let err = reporter.on_run_complete(&config, &status, None).await.unwrap_err();
        assert!(matches!(err, ReportError::Delivery { .. }));
        assert_eq!(mailer.attempts(), 1);
    }

    #[tokio::test]
    async fn success_mail_uses_info_identity() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer.clone(), push);
        let config = ConfigBuilder::new("etl")
            .mail_on_success()
            .info_mail("info@example.com", "team@example.com", "[OK]")
            .build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();

        reporter.on_run_complete(&config, &status, None).await.unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "info@example.com");
        assert_eq!(sent[0].subject, "[OK] etl (Success)");
        assert!(sent[0].body.starts_with("<table"));
    }

    #[tokio::test]
    async fn failure_push_carries_digest_and_history_link() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer, push.clone());
        let config = ConfigBuilder::new("nightly-etl")
            .location("/etc/dagu/jobs/nightly-etl.yaml")
            .notify_on_failure()
            .topics("etl-alerts", "etl-info")
            .build();
        let status = StatusBuilder::new("nightly-etl")
            .succeeded("extract")
            .failed("load", "exit code 1")
            .build();

        reporter.on_run_complete(&config, &status, None).await.unwrap();
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "etl-alerts");
        assert_eq!(sent[0].subject, "nightly-etl (Error)");
        assert!(sent[0].body.contains("**load**"));
        assert!(sent[0].body.contains("exit code 1"));
        assert!(!sent[0].body.contains("extract"));
        assert_eq!(sent[0].link_url, "http://localhost:8080/dags/nightly-etl/history");
    }

    #[tokio::test]
    async fn success_push_has_empty_body() {
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer, push.clone());
        let config = ConfigBuilder::new("etl")
            .notify_on_success()
            .topics("etl-alerts", "etl-info")
            .build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();

        reporter.on_run_complete(&config, &status, None).await.unwrap();
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "etl-info");
        assert_eq!(sent[0].subject, "etl (Success)");
        assert_eq!(sent[0].body, "");
    }

    #[tokio::test]
    async fn success_push_error_is_returned() {
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer, push.clone());
        let config = ConfigBuilder::new("etl").notify_on_success().build();
        let status = StatusBuilder::new("etl").succeeded("extract").build();

        assert!(reporter.on_run_complete(&config, &status, None).await.is_err());
        assert_eq!(push.attempts(), 1);
    }

    #[tokio::test]
    async fn non_terminal_notifiable_states_send_nothing() {
        for state in [RunState::Cancelled, RunState::PartialSuccess, RunState::Running] {
            let (mailer, push) = recording_channels();
            let reporter = reporter_with(mailer.clone(), push.clone());
            let config = ConfigBuilder::new("etl")
                .mail_on_failure()
                .mail_on_success()
                .notify_on_failure()
                .notify_on_success()
                .build();
            let status = StatusBuilder::new("etl").state(state).build();

            reporter.on_run_complete(&config, &status, None).await.unwrap();
            assert!(mailer.sent().is_empty(), "mail sent for {state}");
            assert!(push.sent().is_empty(), "push sent for {state}");
        }
    }

    #[tokio::test]
    async fn both_channels_attempted_when_mail_fails() {
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer.clone(), push.clone());
        let config = ConfigBuilder::new("etl")
            .mail_on_failure()
            .notify_on_failure()
            .build();
        let status = StatusBuilder::new("etl").failed("load", "boom").build();

        let err = reporter.on_run_complete(&config, &status, None).await.unwrap_err();
        assert!(err.to_string().contains("mail"));
        assert_eq!(mailer.attempts(), 1);
        assert_eq!(push.attempts(), 1);
    }

    #[tokio::test]
    async fn summary_logged_once_when_every_send_fails() {
        let logs = LogCapture::new();
        let _guard = logs.install();
        let (mailer, push) = failing_channels();
        let reporter = reporter_with(mailer.clone(), push.clone());
        let config = ConfigBuilder::new("etl")
            .mail_on_failure()
            .notify_on_failure()
            .build();
        let status = StatusBuilder::new("etl").failed("load", "boom").build();

        assert!(reporter.on_run_complete(&config, &status, None).await.is_err());
        assert_eq!(mailer.attempts(), 1);
        assert_eq!(push.attempts(), 1);
        assert_eq!(logs.count("Summary ->"), 1);
        assert_eq!(logs.count("Details ->"), 1);
        assert_eq!(logs.count("Run notification failed"), 1);
    }

    #[tokio::test]
    async fn step_progress_line_skips_not_started_nodes() {
        let logs = LogCapture::new();
        let _guard = logs.install();
        let (mailer, push) = recording_channels();
        let reporter = reporter_with(mailer, push);
        let config = ConfigBuilder::new("etl").build();
        let status = StatusBuilder::new("etl").failed("load", "exit code 1").build();
        let pending = NodeStatus::new("pending", NodeState::None);

        reporter
            .on_step_complete(&config, &StepPolicy::default(), &status, &pending)
            .await
            .unwrap();
        assert!(!logs.contents().contains("pending"));

        reporter
            .on_step_complete(&config, &StepPolicy::default(), &status, &status.nodes[0])
            .await
            .unwrap();
        assert_eq!(logs.count("load failed"), 1);
        assert!(!logs.contents().contains("pending"));
    }
}
