use chrono::{DateTime, NaiveDateTime, Utc};
use domain::records::{Account, Comment, Donation};
use domain::PostSnapshot;
use serde::Serialize;
use sqlx::FromRow;

/// 本地 posts 表的一行
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub html: Option<String>,
    pub mobiledoc: Option<String>,
    pub feature_image: Option<String>,
    pub custom_excerpt: Option<String>,
    pub primary_tag: Option<String>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// webhook 快照镜像到本地表，缺失的状态按草稿处理
impl From<&PostSnapshot> for PostRow {
    fn from(post: &PostSnapshot) -> Self {
        PostRow {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            html: post.html.clone(),
            mobiledoc: post.mobiledoc.clone(),
            feature_image: post.feature_image.clone(),
            custom_excerpt: post.custom_excerpt.clone(),
            primary_tag: post.primary_tag.as_ref().map(|t| t.slug.clone()),
            status: post.status.clone().unwrap_or_else(|| "draft".to_string()),
            updated_at: post.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlDonation {
    pub id: i64,
    pub coffee_id: i64,
    pub email: String,
    pub name: String,
    pub count: i64,
    pub message: Option<String>,
    pub link: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<SqlDonation> for Donation {
    fn from(sql: SqlDonation) -> Self {
        Donation {
            id: sql.id,
            coffee_id: sql.coffee_id,
            email: sql.email,
            name: sql.name,
            count: sql.count,
            message: sql.message,
            link: sql.link,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub user_email: String,
    pub user_role: Option<String>,
    pub body: String,
    pub post_id: String,
    pub post_slug: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            user_id: sql.user_id,
            user_name: sql.user_name,
            user_avatar: sql.user_avatar,
            user_email: sql.user_email,
            user_role: sql.user_role,
            body: sql.body,
            post_id: sql.post_id,
            post_slug: sql.post_slug,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlAccount {
    pub id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub email: String,
    pub role: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SqlAccount> for Account {
    fn from(sql: SqlAccount) -> Self {
        Account {
            id: sql.id,
            full_name: sql.full_name,
            avatar_url: sql.avatar_url,
            email: sql.email,
            role: sql.role,
            provider: sql.provider,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}
