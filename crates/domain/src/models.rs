use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::Member;
use crate::ROUNDUP_TAG;

/// Ghost webhook 外层信封: `{"post": {"current": ..., "previous": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWebhook {
    pub post: PostEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEvent {
    pub current: PostSnapshot,
    #[serde(default)]
    pub previous: Option<PartialSnapshot>,
}

impl PostEvent {
    /// `post.added` 时 Ghost 发送的 previous 是空对象，视为首次创建
    pub fn is_first_revision(&self) -> bool {
        self.previous
            .as_ref()
            .and_then(|p| p.slug.as_deref())
            .is_none()
    }

    pub fn previous_updated_at(&self) -> Option<DateTime<Utc>> {
        self.previous.as_ref().and_then(|p| p.updated_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub mobiledoc: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    #[serde(default)]
    pub custom_excerpt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub primary_tag: Option<Tag>,
    #[serde(default)]
    pub primary_author: Option<Author>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub updated_at: DateTime<Utc>,
}

impl PostSnapshot {
    pub fn is_roundup(&self) -> bool {
        self.primary_tag
            .as_ref()
            .map(|t| t.slug == ROUNDUP_TAG)
            .unwrap_or(false)
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("draft"))
    }
}

/// previous 只携带发生变化的字段，全部可选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSnapshot {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// `member.added` webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWebhook {
    pub member: MemberEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEvent {
    pub current: Member,
}
