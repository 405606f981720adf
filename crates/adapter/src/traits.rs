//! Capability traits for every outbound vendor.
//!
//! Handlers and services only see these; the concrete HTTP bindings live in
//! `drivers`.

use anyhow::Result;
use async_trait::async_trait;
use domain::MetadataPatch;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct CmsResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn update_post(&self, post_id: &str, patch: &MetadataPatch) -> Result<CmsResponse>;

    /// 整站 JSON 导出
    async fn export_backup(&self) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub sid: String,
    pub status: String,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    async fn send_message(&self, body: &str) -> Result<Receipt>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub template: String,
    pub variables: Value,
    pub tracking: bool,
}

#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<()>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Public URL of a random fallback image.
    async fn fetch_random_image(&self) -> Result<String>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw HTML of `url`; non-2xx responses are errors.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
