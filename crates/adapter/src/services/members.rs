use domain::records::{Member, SubscriptionWelcomeEmail};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::traits::{EmailClient, EmailMessage};

#[derive(Debug, Clone)]
pub struct WelcomeTemplate {
    pub from_email: String,
    pub subject: String,
    pub template: String,
}

pub struct NewsletterService {
    email: Arc<dyn EmailClient>,
    welcome: WelcomeTemplate,
}

impl NewsletterService {
    pub fn new(email: Arc<dyn EmailClient>, welcome: WelcomeTemplate) -> Self {
        Self { email, welcome }
    }

    /// 发送失败只记日志，返回 `None`
    pub async fn welcome_new_member(&self, member: &Member) -> Option<SubscriptionWelcomeEmail> {
        let message = EmailMessage {
            from: self.welcome.from_email.clone(),
            to: member.email.clone(),
            subject: self.welcome.subject.clone(),
            template: self.welcome.template.clone(),
            variables: json!({ "name": member.name }),
            tracking: true,
        };

        match self.email.send_email(&message).await {
            Ok(()) => {
                info!("Welcome email sent to new member {}", member.email);
                Some(SubscriptionWelcomeEmail {
                    from_email: message.from,
                    to_email: message.to,
                    subject: message.subject,
                    template: message.template,
                })
            }
            Err(e) => {
                error!("Failed to send welcome email to {}: {:?}", member.email, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingEmail;

    fn template() -> WelcomeTemplate {
        WelcomeTemplate {
            from_email: "todd@hackersandslackers.com".into(),
            subject: "Welcome aboard".into(),
            template: "welcome".into(),
        }
    }

    fn member() -> Member {
        Member {
            email: "reader@example.com".into(),
            name: Some("Reader".into()),
        }
    }

    #[tokio::test]
    async fn welcome_email_uses_template_and_member_name() {
        let email = Arc::new(RecordingEmail::default());
        let service = NewsletterService::new(email.clone(), template());

        let sent = service.welcome_new_member(&member()).await.unwrap();
        assert_eq!(sent.to_email, "reader@example.com");
        assert_eq!(sent.template, "welcome");

        let messages = email.sent.lock().unwrap();
        assert_eq!(messages[0].variables, json!({ "name": "Reader" }));
        assert!(messages[0].tracking);
    }

    #[tokio::test]
    async fn delivery_failure_yields_none() {
        let email = Arc::new(RecordingEmail {
            fail: true,
            ..Default::default()
        });
        let service = NewsletterService::new(email, template());
        assert!(service.welcome_new_member(&member()).await.is_none());
    }
}
