use crate::{models::PostRow, queries, Db};
use domain::posts::PostMeta;

const POST_COLUMNS: &str = "id, slug, title, html, mobiledoc, feature_image, custom_excerpt, primary_tag, status, updated_at";

impl Db {
    pub async fn upsert_post(&self, post: &PostRow) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, slug, title, html, mobiledoc, feature_image,
                custom_excerpt, primary_tag, status, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                slug = excluded.slug,
                title = excluded.title,
                html = excluded.html,
                mobiledoc = excluded.mobiledoc,
                feature_image = excluded.feature_image,
                custom_excerpt = excluded.custom_excerpt,
                primary_tag = excluded.primary_tag,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.html)
        .bind(&post.mobiledoc)
        .bind(&post.feature_image)
        .bind(&post.custom_excerpt)
        .bind(&post.primary_tag)
        .bind(&post.status)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_post(&self, id: &str) -> anyhow::Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = ?",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// 写入 Lynx 生成或补齐 alt 之后的 mobiledoc
    pub async fn update_mobiledoc(&self, id: &str, mobiledoc: &str) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE posts SET mobiledoc = ? WHERE id = ?")
            .bind(mobiledoc)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Roundup posts that still have no bookmark cards.
    pub async fn fetch_raw_lynx_posts(&self) -> anyhow::Result<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(queries::LYNX_BOOKMARKS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn posts_with_mobiledoc(&self) -> anyhow::Result<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE mobiledoc IS NOT NULL ORDER BY updated_at ASC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn posts_missing_metadata(&self) -> anyhow::Result<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(queries::MISSING_ALL_METADATA)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// 批量插入，任何一行失败则整体回滚
    pub async fn insert_post_meta(&self, metas: &[PostMeta]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for m in metas {
            sqlx::query(
                r#"
                INSERT INTO posts_meta (
                    post_id, meta_title, meta_description,
                    og_title, og_description, og_image,
                    twitter_title, twitter_description, twitter_image
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&m.post_id)
            .bind(&m.meta_title)
            .bind(&m.meta_description)
            .bind(&m.og_title)
            .bind(&m.og_description)
            .bind(&m.og_image)
            .bind(&m.twitter_title)
            .bind(&m.twitter_description)
            .bind(&m.twitter_image)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: &str, tag: Option<&str>, html: &str, mobiledoc: Option<&str>) -> PostRow {
        PostRow {
            id: id.into(),
            slug: format!("slug-{}", id),
            title: format!("Title {}", id),
            html: Some(html.into()),
            mobiledoc: mobiledoc.map(str::to_string),
            feature_image: None,
            custom_excerpt: None,
            primary_tag: tag.map(str::to_string),
            status: "published".into(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn lynx_candidates_exclude_posts_with_bookmarks() {
        let db = Db::in_memory().await.unwrap();
        db.upsert_post(&row("a", Some("roundup"), "<a href='https://x.io'>x</a>", None))
            .await
            .unwrap();
        db.upsert_post(&row(
            "b",
            Some("roundup"),
            "<p></p>",
            Some(r#"{"cards":[["bookmark",{}]]}"#),
        ))
        .await
        .unwrap();
        db.upsert_post(&row("c", Some("news"), "<p></p>", None))
            .await
            .unwrap();

        let posts = db.fetch_raw_lynx_posts().await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        assert_eq!(db.update_mobiledoc("a", "{}").await.unwrap(), 1);
        assert_eq!(db.update_mobiledoc("missing", "{}").await.unwrap(), 0);
        assert_eq!(db.posts_with_mobiledoc().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn metadata_insert_removes_post_from_missing_list() {
        let db = Db::in_memory().await.unwrap();
        db.upsert_post(&row("a", None, "<p></p>", None)).await.unwrap();

        let missing = db.posts_missing_metadata().await.unwrap();
        assert_eq!(missing.len(), 1);

        let meta = PostMeta::derive("a", "Title a", None, None);
        db.insert_post_meta(&[meta.clone()]).await.unwrap();
        assert!(db.posts_missing_metadata().await.unwrap().is_empty());

        // post_id 唯一，重复插入整批回滚
        assert!(db.insert_post_meta(&[meta]).await.is_err());
    }

    #[tokio::test]
    async fn webhook_snapshot_is_mirrored_and_refreshed() {
        let db = Db::in_memory().await.unwrap();
        let mut snapshot = domain::PostSnapshot {
            id: "g1".into(),
            slug: "weekly".into(),
            title: "Weekly".into(),
            html: Some("<p>hi</p>".into()),
            mobiledoc: None,
            feature_image: None,
            custom_excerpt: None,
            status: None,
            primary_tag: Some(domain::Tag {
                id: None,
                name: None,
                slug: "roundup".into(),
            }),
            primary_author: None,
            authors: vec![],
            updated_at: Utc::now(),
        };
        db.upsert_post(&PostRow::from(&snapshot)).await.unwrap();

        let stored = db.get_post("g1").await.unwrap().unwrap();
        assert_eq!(stored.primary_tag.as_deref(), Some("roundup"));
        assert_eq!(stored.status, "draft");

        snapshot.title = "Weekly #2".into();
        snapshot.status = Some("published".into());
        db.upsert_post(&PostRow::from(&snapshot)).await.unwrap();
        let stored = db.get_post("g1").await.unwrap().unwrap();
        assert_eq!(stored.title, "Weekly #2");
        assert_eq!(stored.status, "published");
    }
}
