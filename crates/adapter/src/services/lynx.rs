use domain::lynx::{self, Anchor, Eligibility, PreviewCard};
use domain::posts::timestamp;
use domain::{MetadataPatch, PipelineError, PostEvent};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use storage::Db;
use tracing::{debug, error, info, warn};

use crate::traits::{CmsClient, PageFetcher};

pub const DEFAULT_CONCURRENCY: usize = 5;

pub enum LynxOutcome {
    Generated { embeds: usize, document: Value },
    AlreadyHasPreviews,
    NotRoundup,
}

#[derive(Debug, Serialize)]
pub struct LynxSummary {
    pub slug: String,
    pub embeds: usize,
    pub links: usize,
}

pub struct LynxGenerator {
    fetcher: Arc<dyn PageFetcher>,
    cms: Arc<dyn CmsClient>,
    concurrency: usize,
    timeout: Duration,
    max_retries: u32,
}

impl LynxGenerator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cms: Arc<dyn CmsClient>) -> Self {
        Self {
            fetcher,
            cms,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }

    pub fn with_limits(mut self, concurrency: usize, timeout: Duration, max_retries: u32) -> Self {
        self.concurrency = concurrency.max(1);
        self.timeout = timeout;
        self.max_retries = max_retries;
        self
    }

    async fn fetch_with_retry(&self, url: &str) -> anyhow::Result<String> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.fetcher.fetch_page(url)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("timed out after {:?}", self.timeout)),
            };
            match result {
                Ok(html) => return Ok(html),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    debug!("Retrying {} ({}/{}): {}", url, attempt, self.max_retries, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn preview(&self, anchor: Anchor) -> PreviewCard {
        match self.fetch_with_retry(&anchor.href).await {
            Ok(html) => PreviewCard::Bookmark(lynx::parse_page_metadata(&anchor.href, &html)),
            Err(e) => {
                warn!("Falling back to plain link for {}: {}", anchor.href, e);
                PreviewCard::PlainLink(anchor)
            }
        }
    }

    /// 按链接顺序生成预览卡片，单个失败不影响其它链接
    pub async fn generate_previews(&self, anchors: Vec<Anchor>) -> Vec<PreviewCard> {
        stream::iter(anchors)
            .map(|anchor| self.preview(anchor))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    pub async fn generate_from_html(&self, html: &str) -> Vec<PreviewCard> {
        self.generate_previews(lynx::extract_anchors(html)).await
    }

    /// 回写 Ghost，updated_at 必须是文章当前的值
    async fn push_document(
        &self,
        post_id: &str,
        document: &str,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<()> {
        let mut patch = MetadataPatch::new();
        patch
            .set("mobiledoc", document)
            .set("updated_at", timestamp(updated_at));
        self.cms.update_post(post_id, &patch).await?;
        Ok(())
    }

    /// Generates the preview document for a single webhook event, pushes it
    /// to Ghost and keeps a local copy.
    pub async fn preview_for_event(
        &self,
        db: &Db,
        event: &PostEvent,
    ) -> Result<LynxOutcome, PipelineError> {
        let post = &event.current;
        match lynx::eligibility(event) {
            Eligibility::NotRoundup => {
                debug!("Post `{}` is not a roundup, skipping Lynx", post.slug);
                return Ok(LynxOutcome::NotRoundup);
            }
            Eligibility::AlreadyHasPreviews => {
                info!("Post `{}` already has link previews", post.slug);
                return Ok(LynxOutcome::AlreadyHasPreviews);
            }
            Eligibility::Eligible => {}
        }

        let html = post.html.as_deref().unwrap_or_default();
        let cards = self.generate_from_html(html).await;
        let embeds = cards.iter().filter(|c| c.is_bookmark()).count();
        let document = lynx::build_preview_document(&cards);
        let raw = document.to_string();

        self.push_document(&post.id, &raw, post.updated_at)
            .await
            .map_err(|e| {
                error!("Ghost rejected Lynx mobiledoc for `{}`: {:?}", post.slug, e);
                PipelineError::vendor("ghost", e)
            })?;
        // Ghost 已更新，本地副本失败只记日志
        if let Err(e) = db.update_mobiledoc(&post.id, &raw).await {
            error!("Failed to store Lynx mobiledoc for `{}`: {:?}", post.slug, e);
        }

        info!("Generated {} link previews for `{}`", embeds, post.slug);
        Ok(LynxOutcome::Generated { embeds, document })
    }

    pub async fn batch_lynx_embeds(&self, db: &Db) -> Result<Vec<LynxSummary>, PipelineError> {
        let posts = db.fetch_raw_lynx_posts().await.map_err(|e| {
            error!("Failed to fetch roundup posts: {:?}", e);
            PipelineError::Persistence(e.to_string())
        })?;

        let mut summaries = Vec::with_capacity(posts.len());
        for post in posts {
            let html = post.html.as_deref().unwrap_or_default();
            let cards = self.generate_from_html(html).await;
            let embeds = cards.iter().filter(|c| c.is_bookmark()).count();
            if embeds == 0 {
                if !cards.is_empty() {
                    warn!("No link in `{}` could be previewed, leaving it untouched", post.slug);
                }
                continue;
            }

            let raw = lynx::build_preview_document(&cards).to_string();
            if let Err(e) = self.push_document(&post.id, &raw, post.updated_at).await {
                error!("Ghost rejected Lynx mobiledoc for `{}`: {:?}", post.slug, e);
                continue;
            }
            if let Err(e) = db.update_mobiledoc(&post.id, &raw).await {
                error!("Failed to store Lynx mobiledoc for `{}`: {:?}", post.slug, e);
                continue;
            }
            summaries.push(LynxSummary {
                slug: post.slug,
                embeds,
                links: cards.len(),
            });
        }

        info!("Generated link previews for {} roundup posts.", summaries.len());
        Ok(summaries)
    }
}
