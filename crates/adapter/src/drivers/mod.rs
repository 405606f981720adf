pub mod gcs;
pub mod ghost;
pub mod mailgun;
pub mod pages;
pub mod twilio;

use anyhow::Context;
use std::time::Duration;

/// 所有厂商调用共用的 HTTP 客户端，必须带超时
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ghostwire/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}
