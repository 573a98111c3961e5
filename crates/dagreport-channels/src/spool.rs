use std::path::PathBuf;

use chrono::Utc;
use futures::future::BoxFuture;
use tracing::info;

use dagreport_core::error::{ReportError, Result};
use dagreport_core::traits::MailSender;

const CHANNEL: &str = "spool";

/// Mail adapter that hands messages to the host's transport by writing one
/// `.eml` file per mail into a spool directory.
pub struct SpoolMailer {
    dir: PathBuf,
}

impl SpoolMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn render_message(from: &str, to: &[String], subject: &str, body: &str) -> String {
    let to = to.iter().map(|t| header_value(t)).collect::<Vec<_>>().join(", ");
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}\r\n",
        header_value(from),
        to,
        header_value(subject),
        Utc::now().to_rfc2822(),
        body,
    )
}

impl MailSender for SpoolMailer {
    fn name(&self) -> &str {
        CHANNEL
    }

    fn send_mail<'a>(
        &'a self,
        from: &'a str,
        to: &'a [String],
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if from.trim().is_empty() {
                return Err(ReportError::configuration(CHANNEL, "no sender address configured"));
            }
            if to.is_empty() || to.iter().any(|t| t.trim().is_empty()) {
                return Err(ReportError::configuration(CHANNEL, "no recipient configured"));
            }

            tokio::fs::create_dir_all(&self.dir).await?;

            let file_name = format!(
                "{}-{}.eml",
                Utc::now().format("%Y%m%dT%H%M%S"),
                uuid::Uuid::new_v4()
            );
            let path = self.dir.join(file_name);
            tokio::fs::write(&path, render_message(from, to, subject, body))
                .await
                .map_err(|e| ReportError::delivery(CHANNEL, format!("{}: {e}", path.display())))?;

            info!(path = %path.display(), subject = %subject, "Mail spooled");
            Ok(())
        })
    }
}
