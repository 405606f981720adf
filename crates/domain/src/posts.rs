//! Pure steps of the post metadata enrichment pipeline.
//!
//! Vendor calls (fallback image lookup, the CMS update itself) live in the
//! adapter crate; everything here only reads a snapshot and writes a patch.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{MetadataPatch, PostEvent, PostSnapshot};

/// 防抖窗口：Ghost 会因为我们自己的更新再次触发 webhook
pub const DEBOUNCE_SECS: i64 = 5;

pub fn debounce_window() -> Duration {
    Duration::seconds(DEBOUNCE_SECS)
}

/// Ghost 接受的时间戳格式，例如 `2021-03-04T05:06:07.000Z`
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// True when the previous revision was saved less than `window` ago.
pub fn is_recent_echo(event: &PostEvent, now: DateTime<Utc>, window: Duration) -> bool {
    match event.previous_updated_at() {
        Some(previous) => now.signed_duration_since(previous) < window,
        None => false,
    }
}

pub fn seed_patch(post: &PostSnapshot, now: DateTime<Utc>) -> MetadataPatch {
    let mut patch = MetadataPatch::new();
    for field in ["meta_title", "og_title", "twitter_title"] {
        patch.set(field, post.title.as_str());
    }
    for field in ["meta_description", "og_description", "twitter_description"] {
        patch.set(field, post.custom_excerpt.clone());
    }
    patch.set("updated_at", timestamp(now));
    patch
}

pub fn needs_fallback_image(post: &PostSnapshot) -> bool {
    post.is_roundup() && post.feature_image.is_none()
}

pub fn apply_feature_image(patch: &mut MetadataPatch, image_url: &str) {
    patch.set("feature_image", image_url);
    apply_social_images(patch, image_url);
}

pub fn apply_social_images(patch: &mut MetadataPatch, image_url: &str) {
    patch.set("og_image", image_url);
    patch.set("twitter_image", image_url);
}

pub fn has_insecure_links(html: &str) -> bool {
    html.contains("http://")
}

/// 把所有 `http://` 替换为 `https://`，重复执行结果不变
pub fn secure_links(html: &str) -> String {
    html.replace("http://", "https://")
}

/// Metadata row derived for posts that have none at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    pub post_id: String,
    pub meta_title: String,
    pub meta_description: Option<String>,
    pub og_title: String,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_title: String,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
}

impl PostMeta {
    pub fn derive(
        post_id: &str,
        title: &str,
        custom_excerpt: Option<&str>,
        feature_image: Option<&str>,
    ) -> Self {
        let description = custom_excerpt.map(str::to_string);
        let image = feature_image.map(str::to_string);
        Self {
            post_id: post_id.to_string(),
            meta_title: title.to_string(),
            meta_description: description.clone(),
            og_title: title.to_string(),
            og_description: description.clone(),
            og_image: image.clone(),
            twitter_title: title.to_string(),
            twitter_description: description,
            twitter_image: image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PartialSnapshot, Tag};
    use chrono::TimeZone;

    fn snapshot() -> PostSnapshot {
        PostSnapshot {
            id: "p1".into(),
            slug: "hello".into(),
            title: "Hello".into(),
            html: None,
            mobiledoc: None,
            feature_image: None,
            custom_excerpt: Some("An excerpt".into()),
            status: None,
            primary_tag: Some(Tag {
                id: None,
                name: None,
                slug: "roundup".into(),
            }),
            primary_author: None,
            authors: vec![],
            updated_at: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn echo_inside_window_is_detected() {
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 10).unwrap();
        let mut event = PostEvent {
            current: snapshot(),
            previous: Some(PartialSnapshot {
                updated_at: Some(now - Duration::seconds(4)),
                ..Default::default()
            }),
        };
        assert!(is_recent_echo(&event, now, debounce_window()));

        event.previous.as_mut().unwrap().updated_at = Some(now - Duration::seconds(5));
        assert!(!is_recent_echo(&event, now, debounce_window()));

        event.previous = None;
        assert!(!is_recent_echo(&event, now, debounce_window()));
    }

    #[test]
    fn seed_copies_title_and_excerpt() {
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let patch = seed_patch(&snapshot(), now);

        assert_eq!(patch.get_str("og_title"), Some("Hello"));
        assert_eq!(patch.get_str("twitter_description"), Some("An excerpt"));
        assert_eq!(patch.get_str("updated_at"), Some("2021-01-01T00:00:00.000Z"));
    }

    #[test]
    fn missing_excerpt_is_sent_as_null() {
        let mut post = snapshot();
        post.custom_excerpt = None;
        let patch = seed_patch(&post, Utc::now());
        assert!(patch.get("meta_description").unwrap().is_null());
    }

    #[test]
    fn secure_links_is_idempotent() {
        let html = r#"<a href="http://a.com">a</a> <img src="http://b.com/x.png">"#;
        let once = secure_links(html);
        assert!(!has_insecure_links(&once));
        assert_eq!(secure_links(&once), once);
    }

    #[test]
    fn feature_image_sets_all_three_fields() {
        let mut patch = MetadataPatch::new();
        apply_feature_image(&mut patch, "https://cdn/x.jpg");
        assert_eq!(patch.get("feature_image"), patch.get("og_image"));
        assert_eq!(patch.get("og_image"), patch.get("twitter_image"));
    }
}
