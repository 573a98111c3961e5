use futures::future::BoxFuture;
use serde::Serialize;
use tracing::debug;

use dagreport_core::config::NtfyConfig;
use dagreport_core::error::{ReportError, Result};
use dagreport_core::traits::PushSender;

const CHANNEL: &str = "ntfy";

/// Push adapter for ntfy-compatible servers (JSON publish).
pub struct NtfyAdapter {
    config: NtfyConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct Publish<'a> {
    topic: &'a str,
    title: &'a str,
    message: &'a str,
    actions: [Action<'a>; 1],
}

#[derive(Serialize)]
struct Action<'a> {
    action: &'static str,
    label: &'static str,
    url: &'a str,
    clear: bool,
}

impl NtfyAdapter {
    pub fn new(config: NtfyConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn publish(&self, payload: &Publish<'_>) -> Result<()> {
        let body = serde_json::to_vec(payload)?;

        let mut req = self
            .http
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "text/markdown")
            .body(body);
        if let Some(ref username) = self.config.username {
            req = req.basic_auth(username, self.config.password.as_deref());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ReportError::delivery(CHANNEL, format!("publish failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            debug!(topic = %payload.topic, status = %status, "ntfy publish accepted");
            Ok(())
        } else {
            Err(ReportError::delivery(CHANNEL, status.to_string()))
        }
    }
}

impl PushSender for NtfyAdapter {
    fn name(&self) -> &str {
        CHANNEL
    }

    fn send_notification<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
        link_url: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if topic.trim().is_empty() {
                return Err(ReportError::configuration(CHANNEL, "no topic configured"));
            }
            let payload = Publish {
                topic,
                title: subject,
                message: body,
                actions: [Action {
                    action: "view",
                    label: "Logs",
                    url: link_url,
                    clear: false,
                }],
            };
            self.publish(&payload).await
        })
    }
}
