use crate::{models::SqlComment, Db};
use chrono::Utc;
use domain::records::{Comment, CommentUpvote, NewComment};

impl Db {
    pub async fn create_comment(&self, c: &NewComment) -> anyhow::Result<Comment> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (
                user_id, user_name, user_avatar, user_email, user_role,
                body, post_id, post_slug, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.user_id)
        .bind(&c.user_name)
        .bind(&c.user_avatar)
        .bind(&c.user_email)
        .bind(&c.user_role)
        .bind(&c.body)
        .bind(&c.post_id)
        .bind(&c.post_slug)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            user_id: c.user_id.clone(),
            user_name: c.user_name.clone(),
            user_avatar: c.user_avatar.clone(),
            user_email: c.user_email.clone(),
            user_role: c.user_role.clone(),
            body: c.body.clone(),
            post_id: c.post_id.clone(),
            post_slug: c.post_slug.clone(),
            created_at: now,
        })
    }

    pub async fn get_comment(&self, comment_id: i64) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, user_id, user_name, user_avatar, user_email, user_role,
                   body, post_id, post_slug, created_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_comments(&self, post_slug: &str) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, user_id, user_name, user_avatar, user_email, user_role,
                   body, post_id, post_slug, created_at
            FROM comments
            WHERE post_slug = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn submit_comment_upvote(&self, upvote: &CommentUpvote) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO comment_upvotes (comment_id, user_id) VALUES (?, ?)")
            .bind(upvote.comment_id)
            .bind(&upvote.user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 返回是否真的删除了记录
    pub async fn remove_comment_upvote(&self, upvote: &CommentUpvote) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM comment_upvotes WHERE comment_id = ? AND user_id = ?")
            .bind(upvote.comment_id)
            .bind(&upvote.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_comment_upvote(
        &self,
        user_id: &str,
        comment_id: i64,
    ) -> anyhow::Result<Option<CommentUpvote>> {
        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT comment_id, user_id FROM comment_upvotes WHERE user_id = ? AND comment_id = ?",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(comment_id, user_id)| CommentUpvote { user_id, comment_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::records::{NetlifyAccount, NetlifyAppMetadata, NetlifyUserMetadata};

    fn new_comment(slug: &str) -> NewComment {
        NewComment {
            user_id: "u1".into(),
            user_name: "Ada".into(),
            user_avatar: None,
            user_email: "ada@example.com".into(),
            user_role: None,
            body: "Nice post".into(),
            post_id: "p1".into(),
            post_slug: slug.into(),
        }
    }

    async fn seed_account(db: &Db) {
        db.create_account(&NetlifyAccount {
            id: "u1".into(),
            email: "ada@example.com".into(),
            role: None,
            user_metadata: NetlifyUserMetadata {
                full_name: "Ada".into(),
                avatar_url: None,
            },
            app_metadata: NetlifyAppMetadata {
                provider: "github".into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn comment_roundtrip_and_listing() {
        let db = Db::in_memory().await.unwrap();
        let first = db.create_comment(&new_comment("hello")).await.unwrap();
        db.create_comment(&new_comment("hello")).await.unwrap();
        db.create_comment(&new_comment("other")).await.unwrap();

        let fetched = db.get_comment(first.id).await.unwrap().unwrap();
        assert_eq!(fetched.body, "Nice post");
        assert_eq!(db.list_comments("hello").await.unwrap().len(), 2);
        assert!(db.get_comment(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upvote_is_unique_per_user_and_comment() {
        let db = Db::in_memory().await.unwrap();
        seed_account(&db).await;
        let comment = db.create_comment(&new_comment("hello")).await.unwrap();
        let upvote = CommentUpvote {
            user_id: "u1".into(),
            comment_id: comment.id,
        };

        db.submit_comment_upvote(&upvote).await.unwrap();
        assert!(db.submit_comment_upvote(&upvote).await.is_err());
        assert_eq!(
            db.get_comment_upvote("u1", comment.id).await.unwrap(),
            Some(upvote.clone())
        );

        assert!(db.remove_comment_upvote(&upvote).await.unwrap());
        assert!(!db.remove_comment_upvote(&upvote).await.unwrap());
        assert!(db.get_comment_upvote("u1", comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upvote_for_unknown_comment_violates_foreign_key() {
        let db = Db::in_memory().await.unwrap();
        seed_account(&db).await;
        let upvote = CommentUpvote {
            user_id: "u1".into(),
            comment_id: 42,
        };
        assert!(db.submit_comment_upvote(&upvote).await.is_err());
    }
}
