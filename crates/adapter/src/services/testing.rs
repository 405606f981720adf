//! In-memory vendor doubles shared by the service tests.

use anyhow::Result;
use async_trait::async_trait;
use domain::MetadataPatch;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::traits::{
    CmsClient, CmsResponse, EmailClient, EmailMessage, ImageStore, PageFetcher, Receipt, SmsClient,
};

#[derive(Default)]
pub struct RecordingCms {
    pub updates: Mutex<Vec<(String, MetadataPatch)>>,
    pub fail: bool,
}

impl RecordingCms {
    pub fn calls(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl CmsClient for RecordingCms {
    async fn update_post(&self, post_id: &str, patch: &MetadataPatch) -> Result<CmsResponse> {
        if self.fail {
            anyhow::bail!("Ghost returned 500");
        }
        self.updates
            .lock()
            .unwrap()
            .push((post_id.to_string(), patch.clone()));
        Ok(CmsResponse {
            status: 200,
            body: patch.to_update_body(),
        })
    }

    async fn export_backup(&self) -> Result<Value> {
        Ok(json!({ "db": [] }))
    }
}

/// `None` 模拟存储桶不可用
pub struct StaticImages {
    pub url: Option<String>,
    pub calls: Mutex<usize>,
}

impl StaticImages {
    pub fn new(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ImageStore for StaticImages {
    async fn fetch_random_image(&self) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("bucket unavailable"))
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl SmsClient for RecordingSms {
    async fn send_message(&self, body: &str) -> Result<Receipt> {
        if self.fail {
            anyhow::bail!("Twilio returned 401");
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok(Receipt {
            sid: "SM123".into(),
            status: "queued".into(),
        })
    }
}

#[derive(Default)]
pub struct RecordingEmail {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

#[async_trait]
impl EmailClient for RecordingEmail {
    async fn send_email(&self, message: &EmailMessage) -> Result<()> {
        if self.fail {
            anyhow::bail!("Mailgun returned 400");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// 按 URL 返回预设页面，未登记的 URL 一律失败
#[derive(Default)]
pub struct MapFetcher {
    pub pages: HashMap<String, String>,
    pub requested: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn with_page(mut self, url: &str, title: &str) -> Self {
        let html = format!(
            r#"<html><head><meta property="og:title" content="{}"><meta name="description" content="About {}"></head></html>"#,
            title, title
        );
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HTTP 503 for {}", url))
    }
}

/// 每个 URL 按预设时长延迟后返回页面，记录完成顺序
#[derive(Default)]
pub struct SlowFetcher {
    pub delays: HashMap<String, Duration>,
    pub requested: Mutex<Vec<String>>,
    pub finished: Mutex<Vec<String>>,
}

impl SlowFetcher {
    pub fn with_delay(mut self, url: &str, millis: u64) -> Self {
        self.delays.insert(url.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for SlowFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.finished.lock().unwrap().push(url.to_string());
        Ok(format!(
            r#"<html><head><meta property="og:title" content="Page {}"></head></html>"#,
            url
        ))
    }
}
