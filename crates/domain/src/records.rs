//! Row schemas for the CRUD side of the service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// BuyMeACoffee webhook 载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    pub email: String,
    pub name: String,
    pub count: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub coffee_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub coffee_id: i64,
    pub email: String,
    pub name: String,
    pub count: i64,
    pub message: Option<String>,
    pub link: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub user_email: String,
    #[serde(default)]
    pub user_role: Option<String>,
    pub body: String,
    pub post_id: String,
    pub post_slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUpvote {
    pub user_id: String,
    pub comment_id: i64,
}

/// Netlify Identity 用户
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlifyAccount {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    pub user_metadata: NetlifyUserMetadata,
    pub app_metadata: NetlifyAppMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlifyUserMetadata {
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlifyAppMetadata {
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub email: String,
    pub role: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Newsletter subscriber from `member.added`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWelcomeEmail {
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub template: String,
}
