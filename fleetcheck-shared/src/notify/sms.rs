/// SMS sender
///
/// Posts messages to a Twilio-style messages API:
///
/// ```text
/// POST {api_url}/Accounts/{account_sid}/Messages.json
/// Authorization: Basic {account_sid}:{auth_token}
///
/// To=...&From=...&Body=...
/// ```

use super::NotifyError;
use tracing::debug;

/// SMS channel configuration
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Provider account SID
    pub account_sid: String,

    /// Provider auth token
    pub auth_token: String,

    /// Sending phone number (E.164)
    pub from_number: String,

    /// Provider base URL (e.g. "https://api.twilio.com/2010-04-01")
    pub api_url: String,
}

/// Sender for the SMS channel
pub struct SmsSender {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsSender {
    /// Creates a sender with a shared HTTP client
    pub fn new(client: reqwest::Client, config: SmsConfig) -> Self {
        Self { client, config }
    }

    /// Sends one SMS
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Http` for transport failures and
    /// `NotifyError::Provider` when the API responds with a non-success
    /// status.
    pub async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_url, self.config.account_sid
        );

        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
            });
        }

        debug!(to = %to, "SMS accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let config = SmsConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15555550100".to_string(),
            api_url: "https://api.twilio.com/2010-04-01".to_string(),
        };

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            config.api_url, config.account_sid
        );
        assert_eq!(
            url,
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
