//! Post metadata enrichment and the batch maintenance jobs around it.

use domain::posts::{self as steps, PostMeta};
use domain::{mobiledoc, Clock, MetadataPatch, PipelineError, PostEvent, PostSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use storage::{queries, Db, PostRow, QueryOutcome};
use tracing::{debug, error, info, warn};

use crate::traits::{CmsClient, CmsResponse, ImageStore};

pub enum Enrichment {
    /// 防抖命中，没有发出任何厂商调用
    Suppressed,
    Updated {
        patch: MetadataPatch,
        response: CmsResponse,
    },
}

pub struct PostEnricher {
    cms: Arc<dyn CmsClient>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
    debounce: chrono::Duration,
    settle_delay: Duration,
}

impl PostEnricher {
    pub fn new(cms: Arc<dyn CmsClient>, images: Arc<dyn ImageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cms,
            images,
            clock,
            debounce: steps::debounce_window(),
            settle_delay: Duration::from_secs(1),
        }
    }

    pub fn with_debounce_secs(mut self, secs: i64) -> Self {
        self.debounce = chrono::Duration::seconds(secs);
        self
    }

    /// Ghost 自己也会写 updated_at，稍等再重新打时间戳
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Builds the patch for `event`, or `None` when the event is an echo of our own update.
    pub async fn build_patch(&self, event: &PostEvent) -> Option<MetadataPatch> {
        let now = self.clock.now();
        if steps::is_recent_echo(event, now, self.debounce) {
            warn!(
                "Post update ignored as post `{}` was just updated.",
                event.current.slug
            );
            return None;
        }

        let post = &event.current;
        let mut patch = steps::seed_patch(post, now);

        if steps::needs_fallback_image(post) {
            match self.images.fetch_random_image().await {
                Ok(url) => steps::apply_feature_image(&mut patch, &url),
                Err(e) => error!("Failed to fetch fallback image for `{}`: {:?}", post.slug, e),
            }
        }

        if let Some(html) = post.html.as_deref().filter(|h| steps::has_insecure_links(h)) {
            patch.set("html", steps::secure_links(html));
        }

        if let Some(image) = post.feature_image.as_deref() {
            steps::apply_social_images(&mut patch, image);
        }

        if let Some(raw) = post.mobiledoc.as_deref() {
            match mobiledoc::parse(raw) {
                Ok(mut doc) => {
                    let changed = mobiledoc::assign_img_alt(&mut doc, &post.title);
                    if changed > 0 {
                        debug!("Assigned alt text to {} images in `{}`", changed, post.slug);
                        patch.set("mobiledoc", doc.to_string());
                    }
                }
                Err(e) => warn!("Skipping malformed mobiledoc for `{}`: {}", post.slug, e),
            }
        }

        Some(patch)
    }

    pub async fn enrich(&self, event: &PostEvent) -> Result<Enrichment, PipelineError> {
        let Some(mut patch) = self.build_patch(event).await else {
            return Ok(Enrichment::Suppressed);
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        patch.set("updated_at", steps::timestamp(self.clock.now()));

        let post = &event.current;
        let response = self
            .cms
            .update_post(&post.id, &patch)
            .await
            .map_err(|e| {
                error!("Ghost update failed for `{}`: {:?}", post.slug, e);
                PipelineError::vendor("ghost", e)
            })?;

        info!("Successfully updated post `{}` ({} fields)", post.slug, patch.len());
        Ok(Enrichment::Updated { patch, response })
    }

    pub async fn backup(&self) -> Result<serde_json::Value, PipelineError> {
        self.cms.export_backup().await.map_err(|e| {
            error!("Ghost backup failed: {:?}", e);
            PipelineError::vendor("ghost", e)
        })
    }
}

#[derive(Debug, Serialize)]
pub struct InsertedMetadata {
    pub count: usize,
    pub posts: Vec<PostMeta>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedMetadata {
    pub count: u64,
    pub queries: Vec<QueryOutcome>,
}

#[derive(Debug, Serialize)]
pub struct BatchMetadataReport {
    pub inserted: InsertedMetadata,
    pub updated: UpdatedMetadata,
}

fn persistence(e: anyhow::Error) -> PipelineError {
    error!("Database error: {:?}", e);
    PipelineError::Persistence(e.to_string())
}

/// 先跑维护语句补齐已有 meta，再给完全没有 meta 的文章插入新行
pub async fn batch_update_metadata(db: &Db) -> Result<BatchMetadataReport, PipelineError> {
    let update_queries = queries::collect_sql_queries("posts/updates")
        .ok_or_else(|| PipelineError::Persistence("missing posts/updates queries".into()))?;
    let (outcomes, num_updated) = db.execute_queries(update_queries).await.map_err(persistence)?;

    let missing = db.posts_missing_metadata().await.map_err(persistence)?;
    let metas: Vec<PostMeta> = missing
        .iter()
        .map(|p| {
            PostMeta::derive(
                &p.id,
                &p.title,
                p.custom_excerpt.as_deref(),
                p.feature_image.as_deref(),
            )
        })
        .collect();
    db.insert_post_meta(&metas).await.map_err(persistence)?;

    info!(
        "Inserted metadata for {} posts, updated {}.",
        metas.len(),
        num_updated
    );
    Ok(BatchMetadataReport {
        inserted: InsertedMetadata {
            count: metas.len(),
            posts: metas,
        },
        updated: UpdatedMetadata {
            count: num_updated,
            queries: outcomes,
        },
    })
}

/// 把 webhook 快照写入本地 posts 表，失败只记日志
pub async fn mirror_post(db: &Db, post: &PostSnapshot) -> bool {
    match db.upsert_post(&PostRow::from(post)).await {
        Ok(()) => {
            debug!("Mirrored post `{}`", post.slug);
            true
        }
        Err(e) => {
            error!("Failed to mirror post `{}`: {:?}", post.slug, e);
            false
        }
    }
}

impl PostEnricher {
    /// Pushes missing image alt text to Ghost, then stores it locally.
    ///
    /// Returns the slugs that were updated. A post whose push or save fails
    /// is logged and skipped.
    pub async fn batch_assign_img_alt(&self, db: &Db) -> Result<Vec<String>, PipelineError> {
        let posts = db.posts_with_mobiledoc().await.map_err(persistence)?;
        let mut updated = Vec::new();

        for post in posts {
            let Some(raw) = post.mobiledoc.as_deref() else {
                continue;
            };
            let mut doc = match mobiledoc::parse(raw) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping malformed mobiledoc for `{}`: {}", post.slug, e);
                    continue;
                }
            };
            if !mobiledoc::has_image_cards(&doc)
                || mobiledoc::assign_img_alt(&mut doc, &post.title) == 0
            {
                continue;
            }

            let document = doc.to_string();
            let mut patch = MetadataPatch::new();
            patch
                .set("mobiledoc", document.as_str())
                .set("updated_at", steps::timestamp(post.updated_at));
            if let Err(e) = self.cms.update_post(&post.id, &patch).await {
                error!("Ghost rejected alt text for `{}`: {:?}", post.slug, e);
                continue;
            }
            if let Err(e) = db.update_mobiledoc(&post.id, &document).await {
                error!("Failed to store alt text for `{}`: {:?}", post.slug, e);
                continue;
            }
            updated.push(post.slug);
        }

        info!("Assigned missing alt text for {} posts.", updated.len());
        Ok(updated)
    }
}
