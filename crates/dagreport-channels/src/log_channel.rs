use futures::future::BoxFuture;
use tracing::info;

use dagreport_core::error::Result;
use dagreport_core::traits::{MailSender, PushSender};

/// Channel that only writes what it would have sent to the log.
pub struct LogChannel;

impl MailSender for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn send_mail<'a>(
        &'a self,
        from: &'a str,
        to: &'a [String],
        subject: &'a str,
        _body: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(from = %from, to = ?to, "Mail (no transport configured): {}", subject);
            Ok(())
        })
    }
}

impl PushSender for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn send_notification<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        _body: &'a str,
        link_url: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(topic = %topic, url = %link_url, "Notification (no push server configured): {}", subject);
            Ok(())
        })
    }
}
