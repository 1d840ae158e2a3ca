//! Outbound mail transports

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    #[error("Mail relay rejected message: HTTP {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to an HTTP mail relay
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: &str, from: &str, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let message = RelayMessage {
            from: &self.from,
            to,
            subject,
            html,
        };
        let response = self
            .client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Logs messages instead of sending them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), MailError> {
        info!(to, subject, "Mail relay not configured, notification logged only");
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                html: html.to_string(),
            });
        Ok(())
    }
}

/// Pick the transport from configuration
pub fn mailer_from_config(config: &MailConfig) -> Result<Box<dyn Mailer>, MailError> {
    match config.relay_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => Ok(Box::new(HttpMailer::new(
            url,
            &config.from,
            Duration::from_millis(config.timeout_ms),
        )?)),
        None => Ok(Box::new(LogMailer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_mailer() {
        let mailer = RecordingMailer::default();
        mailer.send("a@campus.edu", "Hi", "<p>x</p>").await.unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@campus.edu");
    }

    #[test]
    fn test_relay_message_shape() {
        let json = serde_json::to_value(RelayMessage {
            from: "noreply@x",
            to: "a@x",
            subject: "s",
            html: "<p/>",
        })
        .unwrap();
        assert_eq!(json["to"], "a@x");
        assert_eq!(json["html"], "<p/>");
    }

    #[test]
    fn test_log_mailer_without_relay() {
        assert!(mailer_from_config(&MailConfig::default()).is_ok());
    }
}
