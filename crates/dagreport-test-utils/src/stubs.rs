use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use dagreport_core::error::{ReportError, Result};
use dagreport_core::traits::{MailSender, PushSender};

/// A mail captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// A push message captured by [`RecordingPusher`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentPush {
    pub topic: String,
    pub subject: String,
    pub body: String,
    pub link_url: String,
}

/// Mail channel that records every send and always succeeds.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailSender for RecordingMailer {
    fn name(&self) -> &str {
        "recording-mail"
    }

    fn send_mail<'a>(
        &'a self,
        from: &'a str,
        to: &'a [String],
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        self.sent.lock().unwrap().push(SentMail {
            from: from.to_string(),
            to: to.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Box::pin(async { Ok(()) })
    }
}

/// Push channel that records every send and always succeeds.
#[derive(Default)]
pub struct RecordingPusher {
    sent: Mutex<Vec<SentPush>>,
}

impl RecordingPusher {
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }
}

impl PushSender for RecordingPusher {
    fn name(&self) -> &str {
        "recording-push"
    }

    fn send_notification<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
        link_url: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        self.sent.lock().unwrap().push(SentPush {
            topic: topic.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            link_url: link_url.to_string(),
        });
        Box::pin(async { Ok(()) })
    }
}

/// Mail channel whose every send fails with a delivery error.
#[derive(Default)]
pub struct FailingMailer {
    attempts: Mutex<usize>,
}

impl FailingMailer {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl MailSender for FailingMailer {
    fn name(&self) -> &str {
        "failing-mail"
    }

    fn send_mail<'a>(
        &'a self,
        _from: &'a str,
        _to: &'a [String],
        _subject: &'a str,
        _body: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        *self.attempts.lock().unwrap() += 1;
        Box::pin(async { Err(ReportError::delivery("failing-mail", "connection refused")) })
    }
}

/// Push channel whose every send fails with a delivery error.
#[derive(Default)]
pub struct FailingPusher {
    attempts: Mutex<usize>,
}

impl FailingPusher {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl PushSender for FailingPusher {
    fn name(&self) -> &str {
        "failing-push"
    }

    fn send_notification<'a>(
        &'a self,
        _topic: &'a str,
        _subject: &'a str,
        _body: &'a str,
        _link_url: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        *self.attempts.lock().unwrap() += 1;
        Box::pin(async { Err(ReportError::delivery("failing-push", "502 Bad Gateway")) })
    }
}

pub fn recording_channels() -> (Arc<RecordingMailer>, Arc<RecordingPusher>) {
    (Arc::default(), Arc::default())
}

pub fn failing_channels() -> (Arc<FailingMailer>, Arc<FailingPusher>) {
    (Arc::default(), Arc::default())
}
