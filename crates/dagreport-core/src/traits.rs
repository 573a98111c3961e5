use futures::future::BoxFuture;

use crate::error::Result;

/// Mail capability — delivers an HTML body to a set of recipients.
pub trait MailSender: Send + Sync + 'static {
    /// Channel name used in logs and errors (e.g., "spool", "smtp").
    fn name(&self) -> &str;

    /// Attempt a single delivery. No retries.
    fn send_mail<'a>(
        &'a self,
        from: &'a str,
        to: &'a [String],
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Push capability — posts a short message to a topic with an action link.
pub trait PushSender: Send + Sync + 'static {
    /// Channel name used in logs and errors (e.g., "ntfy").
    fn name(&self) -> &str;

    /// Attempt a single delivery. A non-2xx response is a `Delivery` error.
    fn send_notification<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
        link_url: &'a str,
    ) -> BoxFuture<'a, Result<()>>;
}
