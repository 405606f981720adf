use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{error, info};

use crate::traits::{Receipt, SmsClient};

#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// 发送方号码
    pub sender: String,
    /// 接收通知的管理员号码
    pub recipient: String,
}

pub struct TwilioClient {
    client: reqwest::Client,
    config: TwilioConfig,
}

#[derive(Deserialize)]
struct MessageResponse {
    sid: String,
    status: String,
}

impl TwilioClient {
    pub fn new(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        )
    }

    fn form_body<'a>(&'a self, body: &'a str) -> HashMap<&'static str, &'a str> {
        let mut form = HashMap::new();
        form.insert("To", self.config.recipient.as_str());
        form.insert("From", self.config.sender.as_str());
        form.insert("Body", body);
        form
    }
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send_message(&self, body: &str) -> Result<Receipt> {
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&self.form_body(body))
            .send()
            .await
            .context("Request to Twilio failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp.text().await.unwrap_or_default();
            error!("Twilio error ({}): {}", status, error_body);
            anyhow::bail!("Twilio returned {}", status);
        }

        let data: MessageResponse = resp
            .json()
            .await
            .context("Failed to parse Twilio response")?;
        info!("Twilio accepted message {} ({})", data.sid, data.status);

        Ok(Receipt {
            sid: data.sid,
            status: data.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_targets_configured_numbers() {
        let client = TwilioClient::new(
            reqwest::Client::new(),
            TwilioConfig {
                account_sid: "AC123".into(),
                auth_token: "token".into(),
                sender: "+15550001111".into(),
                recipient: "+15552223333".into(),
            },
        );

        let form = client.form_body("hello");
        assert_eq!(form["To"], "+15552223333");
        assert_eq!(form["From"], "+15550001111");
        assert_eq!(form["Body"], "hello");
        assert!(client.messages_url().contains("/Accounts/AC123/Messages.json"));
    }
}
