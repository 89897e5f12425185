/// Email sender
///
/// Posts messages to a Resend-style JSON API:
///
/// ```text
/// POST {api_url}
/// Authorization: Bearer {api_key}
///
/// { "from": "Name <addr>", "to": ["recipient"], "subject": "...",
///   "html": "...", "text": "..." }
/// ```

use super::templates::EmailMessage;
use super::NotifyError;
use serde::Serialize;
use tracing::debug;

/// Email channel configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Provider API key
    pub api_key: String,

    /// Provider endpoint (e.g. "https://api.resend.com/emails")
    pub api_url: String,

    /// Sender address
    pub from: String,

    /// Sender display name
    pub from_name: String,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sender for the email channel
pub struct EmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailSender {
    /// Creates a sender with a shared HTTP client
    pub fn new(client: reqwest::Client, config: EmailConfig) -> Self {
        Self { client, config }
    }

    /// Sends one email
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Http` for transport failures and
    /// `NotifyError::Provider` when the API responds with a non-success
    /// status.
    pub async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), NotifyError> {
        let payload = EmailPayload {
            from: format!("{} <{}>", self.config.from_name, self.config.from),
            to: [to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
            });
        }

        debug!(to = %to, subject = %message.subject, "Email accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = EmailPayload {
            from: "FleetCheck <no-reply@fleetcheck.example>".to_string(),
            to: ["user@example.com"],
            subject: "Welcome",
            html: "<p>Welcome</p>",
            text: "Welcome",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["to"][0], "user@example.com");
        assert_eq!(json["from"], "FleetCheck <no-reply@fleetcheck.example>");
        assert_eq!(json["subject"], "Welcome");
    }
}
