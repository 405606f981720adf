use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::MetadataPatch;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::traits::{CmsClient, CmsResponse};

/// Admin token 有效期，Ghost 允许的上限是 5 分钟
const TOKEN_TTL_SECS: i64 = 300;

#[derive(Clone)]
pub struct GhostConfig {
    /// 站点根地址，例如 `https://blog.example.com`
    pub api_url: String,
    /// Admin API key, `{id}:{hex secret}`
    pub admin_key: String,
}

pub struct GhostClient {
    client: reqwest::Client,
    config: GhostConfig,
}

impl GhostClient {
    pub fn new(client: reqwest::Client, config: GhostConfig) -> Self {
        Self { client, config }
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/ghost/api/admin/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn auth_header(&self) -> Result<String> {
        let token = sign_admin_token(&self.config.admin_key, chrono::Utc::now().timestamp())?;
        Ok(format!("Ghost {}", token))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminClaims {
    iat: i64,
    exp: i64,
    aud: String,
}

/// HS256 JWT for the Ghost Admin API.
pub fn sign_admin_token(admin_key: &str, issued_at: i64) -> Result<String> {
    let (key_id, secret_hex) = admin_key
        .split_once(':')
        .context("Ghost admin key must look like `id:secret`")?;
    let secret = hex::decode(secret_hex).context("Ghost admin secret is not valid hex")?;

    let header = Header {
        kid: Some(key_id.to_string()),
        ..Header::new(Algorithm::HS256)
    };
    let claims = AdminClaims {
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
        aud: "/admin/".to_string(),
    };
    encode(&header, &claims, &EncodingKey::from_secret(&secret))
        .context("Failed to sign Ghost admin token")
}

fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl CmsClient for GhostClient {
    async fn update_post(&self, post_id: &str, patch: &MetadataPatch) -> Result<CmsResponse> {
        anyhow::ensure!(!patch.is_empty(), "Refusing to send an empty patch for post {}", post_id);
        let url = self.admin_url(&format!("posts/{}/", post_id));
        debug!("PUT {} with {} fields", url, patch.len());

        let resp = self
            .client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header()?)
            .json(&patch.to_update_body())
            .send()
            .await
            .context("Ghost update request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read Ghost response")?;
        if !status.is_success() {
            anyhow::bail!("Ghost returned {} for post {}: {}", status, post_id, text);
        }

        info!("Ghost accepted update for post {}", post_id);
        Ok(CmsResponse {
            status: status.as_u16(),
            body: parse_body(&text),
        })
    }

    async fn export_backup(&self) -> Result<Value> {
        let resp = self
            .client
            .get(self.admin_url("db/"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header()?)
            .send()
            .await
            .context("Ghost backup request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Ghost returned {} for backup: {}", status, text);
        }
        resp.json::<Value>()
            .await
            .context("Failed to parse Ghost backup")
    }
}
