use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::traits::ImageStore;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Clone)]
pub struct GcsConfig {
    pub bucket: String,
    /// 候选图片所在的目录前缀，例如 `roundup/`
    pub prefix: String,
    /// 对外访问地址，默认 `https://storage.googleapis.com/{bucket}`
    pub public_base_url: Option<String>,
    /// OAuth2 access token；为空时只能列出公开存储桶
    pub access_token: Option<String>,
}

pub struct GcsImageStore {
    client: reqwest::Client,
    config: GcsConfig,
}

#[derive(Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
}

#[derive(Deserialize)]
struct ObjectItem {
    name: String,
}

impl GcsImageStore {
    pub fn new(client: reqwest::Client, config: GcsConfig) -> Self {
        Self { client, config }
    }

    fn public_url(&self, object_name: &str) -> String {
        let base = self
            .config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("https://storage.googleapis.com/{}", self.config.bucket));
        format!("{}/{}", base.trim_end_matches('/'), object_name)
    }

    fn list_request(&self) -> reqwest::RequestBuilder {
        let url = format!(
            "https://storage.googleapis.com/storage/v1/b/{}/o",
            self.config.bucket
        );
        let request = self
            .client
            .get(url)
            .query(&[("prefix", self.config.prefix.as_str()), ("fields", "items(name)")]);
        match self.config.access_token.as_deref() {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn list_objects(&self) -> Result<Vec<String>> {
        let resp = self
            .list_request()
            .send()
            .await
            .context("GCS list request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GCS returned {} listing bucket {}", status, self.config.bucket);
        }
        let list: ObjectList = resp.json().await.context("Failed to parse GCS listing")?;
        Ok(list.items.into_iter().map(|i| i.name).collect())
    }
}

fn is_image(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 只在图片文件里随机选一个，排除目录占位对象和缩略图
fn pick_image<'a, R: rand::Rng + ?Sized>(names: &'a [String], rng: &mut R) -> Option<&'a String> {
    let candidates: Vec<&String> = names
        .iter()
        .filter(|n| is_image(n) && !n.contains("@2x") && !n.contains("_thumb"))
        .collect();
    candidates.choose(rng).copied()
}

#[async_trait]
impl ImageStore for GcsImageStore {
    async fn fetch_random_image(&self) -> Result<String> {
        let names = self.list_objects().await?;
        let name = pick_image(&names, &mut rand::thread_rng())
            .with_context(|| format!("No images under gs://{}/{}", self.config.bucket, self.config.prefix))?;
        let url = self.public_url(name);
        debug!("Picked fallback image {}", url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_real_images_are_candidates() {
        let names = vec![
            "roundup/".to_string(),
            "roundup/readme.txt".to_string(),
            "roundup/cover_thumb.jpg".to_string(),
            "roundup/cover.JPG".to_string(),
        ];
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            assert_eq!(pick_image(&names, &mut rng).unwrap(), "roundup/cover.JPG");
        }
        assert!(pick_image(&names[..3], &mut rng).is_none());
    }

    fn store(access_token: Option<&str>) -> GcsImageStore {
        GcsImageStore::new(
            reqwest::Client::new(),
            GcsConfig {
                bucket: "lynx-images".into(),
                prefix: "roundup/".into(),
                public_base_url: None,
                access_token: access_token.map(str::to_string),
            },
        )
    }

    #[test]
    fn listing_sends_bearer_token_when_configured() {
        let request = store(Some("ya29.token")).list_request().build().unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer ya29.token");
        assert!(request.url().query().unwrap().contains("prefix=roundup%2F"));

        let anonymous = store(None).list_request().build().unwrap();
        assert!(anonymous.headers().get("authorization").is_none());
    }

    #[test]
    fn public_url_defaults_to_bucket_host() {
        let store = store(None);
        assert_eq!(
            store.public_url("roundup/a.png"),
            "https://storage.googleapis.com/lynx-images/roundup/a.png"
        );
    }
}
