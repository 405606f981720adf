use domain::notify::{self, Decision, NotificationKind};
use domain::{PipelineError, PostEvent};
use std::sync::Arc;
use tracing::{error, info};

use crate::traits::SmsClient;

/// 非站长作者的改动通过短信通知站长
pub struct AuthorNotifier {
    sms: Arc<dyn SmsClient>,
    owner_ids: Vec<String>,
}

impl AuthorNotifier {
    pub fn new(sms: Arc<dyn SmsClient>, owner_ids: Vec<String>) -> Self {
        Self { sms, owner_ids }
    }

    pub async fn notify(
        &self,
        event: &PostEvent,
        kind: NotificationKind,
    ) -> Result<Decision, PipelineError> {
        let decision = notify::decide_notification(&event.current, kind, &self.owner_ids)?;
        match &decision {
            Decision::Notify(message) => {
                self.sms.send_message(message).await.map_err(|e| {
                    error!("Failed to send SMS notification: {:?}", e);
                    PipelineError::vendor("twilio", e)
                })?;
                info!("Sent SMS notification: {}", message);
            }
            Decision::Acknowledge(text) => info!("{}", text),
        }
        Ok(decision)
    }
}
