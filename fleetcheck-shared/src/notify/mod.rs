/// Notification dispatch for FleetCheck
///
/// Outbound email and SMS go through HTTP provider APIs. Both channels are
/// optional: when a provider is not configured the send becomes a debug log
/// and nothing leaves the process.
///
/// All dispatch from request handlers is fire-and-forget: sends are spawned
/// after the owning state change has committed, and failures are logged
/// only. A lost notification never fails the request that triggered it.
///
/// # Modules
///
/// - [`email`]: email sender (Resend-style JSON API)
/// - [`sms`]: SMS sender (Twilio-style messages API)
/// - [`templates`]: message bodies for the standard notification kinds

pub mod email;
pub mod sms;
pub mod templates;

use email::{EmailConfig, EmailSender};
use sms::{SmsConfig, SmsSender};
use templates::EmailMessage;
use tracing::{debug, warn};

/// Error type for notification dispatch
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Provider rejected the message: status {status}")]
    Provider { status: u16 },
}

/// Combined notification dispatcher
///
/// Holds one `reqwest::Client` shared across channels. Cheap to clone via
/// `Arc` in application state.
pub struct Notifier {
    email: Option<EmailSender>,
    sms: Option<SmsSender>,
}

impl Notifier {
    /// Creates a dispatcher from optional channel configurations
    pub fn new(email_config: Option<EmailConfig>, sms_config: Option<SmsConfig>) -> Self {
        let client = reqwest::Client::new();

        Self {
            email: email_config.map(|c| EmailSender::new(client.clone(), c)),
            sms: sms_config.map(|c| SmsSender::new(client, c)),
        }
    }

    /// Whether the email channel is configured
    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    /// Whether the SMS channel is configured
    pub fn sms_enabled(&self) -> bool {
        self.sms.is_some()
    }

    /// Sends an email, awaiting the provider response
    pub async fn send_email(&self, to: &str, message: &EmailMessage) -> Result<(), NotifyError> {
        match &self.email {
            Some(sender) => sender.send(to, message).await,
            None => {
                debug!(to = %to, subject = %message.subject, "Email channel not configured, skipping send");
                Ok(())
            }
        }
    }

    /// Sends an SMS, awaiting the provider response
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        match &self.sms {
            Some(sender) => sender.send(to, body).await,
            None => {
                debug!(to = %to, "SMS channel not configured, skipping send");
                Ok(())
            }
        }
    }
}

/// Spawns an email send in the background
///
/// Failures are logged and swallowed.
pub fn send_email_detached(notifier: std::sync::Arc<Notifier>, to: String, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_email(&to, &message).await {
            warn!(error = %e, to = %to, "Failed to send email");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_channels() {
        let notifier = Notifier::new(None, None);
        assert!(!notifier.email_enabled());
        assert!(!notifier.sms_enabled());
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_noop() {
        let notifier = Notifier::new(None, None);

        let message = EmailMessage {
            subject: "Test".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
        };

        assert!(notifier.send_email("user@example.com", &message).await.is_ok());
        assert!(notifier.send_sms("+15555550100", "hi").await.is_ok());
    }
}
