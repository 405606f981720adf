use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

use crate::traits::{EmailClient, EmailMessage};

#[derive(Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    /// `https://api.mailgun.net` 或欧洲区 `https://api.eu.mailgun.net`
    pub base_url: String,
}

pub struct MailgunClient {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunClient {
    pub fn new(client: reqwest::Client, config: MailgunConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.domain
        )
    }
}

fn form_fields(message: &EmailMessage) -> Vec<(&'static str, String)> {
    vec![
        ("from", message.from.clone()),
        ("to", message.to.clone()),
        ("subject", message.subject.clone()),
        ("template", message.template.clone()),
        ("h:X-Mailgun-Variables", message.variables.to_string()),
        (
            "o:tracking",
            if message.tracking { "yes" } else { "no" }.to_string(),
        ),
    ]
}

#[async_trait]
impl EmailClient for MailgunClient {
    async fn send_email(&self, message: &EmailMessage) -> Result<()> {
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form_fields(message))
            .send()
            .await
            .context("Request to Mailgun failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Mailgun error ({}): {}", status, body);
            anyhow::bail!("Mailgun returned {}", status);
        }

        info!("Mailgun queued `{}` for {}", message.template, message.to);
        Ok(())
    }
}
