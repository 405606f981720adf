//! Maintenance statements shipped with the binary, grouped by collection.

use serde::Serialize;

use crate::Db;

#[derive(Debug, Clone, Copy)]
pub struct NamedQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub name: &'static str,
    pub rows_affected: u64,
}

macro_rules! named_query {
    ($dir:literal, $name:literal) => {
        NamedQuery {
            name: $name,
            sql: include_str!(concat!("../queries/", $dir, "/", $name, ".sql")),
        }
    };
}

// 顺序有意义：description 依赖前面补齐的 meta_description
const POST_UPDATES: &[NamedQuery] = &[
    named_query!("posts/updates", "meta_title"),
    named_query!("posts/updates", "og_title"),
    named_query!("posts/updates", "twitter_title"),
    named_query!("posts/updates", "meta_description"),
    named_query!("posts/updates", "og_description"),
    named_query!("posts/updates", "twitter_description"),
    named_query!("posts/updates", "og_image"),
    named_query!("posts/updates", "twitter_image"),
    named_query!("posts/updates", "ssl_links"),
];

pub(crate) const MISSING_ALL_METADATA: &str =
    include_str!("../queries/posts/selects/missing_all_metadata.sql");
pub(crate) const LYNX_BOOKMARKS: &str = include_str!("../queries/posts/selects/lynx_bookmarks.sql");

/// Looks up a collection such as `posts/updates`.
pub fn collect_sql_queries(collection: &str) -> Option<&'static [NamedQuery]> {
    match collection {
        "posts/updates" => Some(POST_UPDATES),
        _ => None,
    }
}

impl Db {
    /// Runs every statement in one transaction; returns per-query results and the total.
    pub async fn execute_queries(
        &self,
        queries: &[NamedQuery],
    ) -> anyhow::Result<(Vec<QueryOutcome>, u64)> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(queries.len());
        let mut total = 0;

        for q in queries {
            let result = sqlx::query(q.sql).execute(&mut *tx).await?;
            let rows_affected = result.rows_affected();
            tracing::debug!("Query `{}` affected {} rows", q.name, rows_affected);
            total += rows_affected;
            outcomes.push(QueryOutcome {
                name: q.name,
                rows_affected,
            });
        }

        tx.commit().await?;
        Ok((outcomes, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PostRow;
    use chrono::Utc;

    #[test]
    fn unknown_collection_is_none() {
        assert!(collect_sql_queries("posts/deletes").is_none());
        assert_eq!(collect_sql_queries("posts/updates").unwrap().len(), 9);
    }

    #[tokio::test]
    async fn maintenance_fills_gaps_and_secures_links() {
        let db = Db::in_memory().await.unwrap();
        db.upsert_post(&PostRow {
            id: "p1".into(),
            slug: "p1".into(),
            title: "Title".into(),
            html: Some(r#"<a href="http://x.io">x</a>"#.into()),
            mobiledoc: None,
            feature_image: Some("https://cdn/x.png".into()),
            custom_excerpt: Some("Excerpt".into()),
            primary_tag: None,
            status: "published".into(),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
        sqlx::query("INSERT INTO posts_meta (post_id) VALUES ('p1')")
            .execute(&db.pool)
            .await
            .unwrap();

        let queries = collect_sql_queries("posts/updates").unwrap();
        let (outcomes, total) = db.execute_queries(queries).await.unwrap();

        // 8 个 meta 字段 + 1 篇文章的链接
        assert_eq!(total, 9);
        assert!(outcomes.iter().all(|o| o.rows_affected == 1));

        let post = db.get_post("p1").await.unwrap().unwrap();
        assert_eq!(post.html.as_deref(), Some(r#"<a href="https://x.io">x</a>"#));

        let (_, second_total) = db.execute_queries(queries).await.unwrap();
        assert_eq!(second_total, 0);
    }
}
