//! Notify collaborator: where alerts about new discoveries go.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Error, Result};

/// One alert message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Delivers alerts. A failed send is reported, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Writes each alert to stdout as a mail-style message
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let mut out = std::io::stdout().lock();
        write!(
            out,
            "To: {}\nSubject: {}\n{}\n\n",
            notification.recipient, notification.subject, notification.body
        )
        .and_then(|_| out.flush())
        .map_err(|e| Error::notify(format!("failed to write alert: {}", e)))?;

        tracing::info!(recipient = %notification.recipient, "alert sent");
        Ok(())
    }
}

/// Sends each alert as mail through an authenticated relay.
///
/// The relay is reached over implicit TLS on port 465 and the login user is
/// also the sender address.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(server: &str, username: &str, password: &str, timeout: Duration) -> Result<Self> {
        let from = parse_mailbox(username)
            .map_err(|e| Error::config(format!("SMTP username is not a mail address: {}", e)))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(server)
            .map_err(|e| Error::config(format!("invalid SMTP server {}: {}", server, e)))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, from })
    }

    /// Use a prebuilt transport, e.g. a plaintext one for a local relay
    pub fn with_transport(transport: AsyncSmtpTransport<Tokio1Executor>, from: Mailbox) -> Self {
        Self { transport, from }
    }
}

fn parse_mailbox(address: &str) -> std::result::Result<Mailbox, lettre::address::AddressError> {
    address.trim().parse()
}

/// Mail message for `notification`, sent as `from`
pub fn build_message(from: &Mailbox, notification: &Notification) -> Result<Message> {
    let to = parse_mailbox(&notification.recipient).map_err(|e| {
        Error::notify(format!("bad recipient {}: {}", notification.recipient, e))
    })?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(notification.subject.as_str())
        .body(notification.body.clone())
        .map_err(|e| Error::notify(format!("failed to build message: {}", e)))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = build_message(&self.from, notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| Error::notify(format!("SMTP send failed: {}", e)))?;

        tracing::info!(recipient = %notification.recipient, "alert mailed");
        Ok(())
    }
}

/// Keeps alerts in memory; clones share the same outbox
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| Error::notify("outbox lock poisoned"))?
            .push(notification.clone());
        Ok(())
    }
}
