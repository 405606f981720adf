use crate::{models::SqlAccount, Db};
use domain::records::{Account, NetlifyAccount};

impl Db {
    pub async fn create_account(&self, account: &NetlifyAccount) -> anyhow::Result<Account> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, full_name, avatar_url, email, role, provider, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.user_metadata.full_name)
        .bind(&account.user_metadata.avatar_url)
        .bind(&account.email)
        .bind(&account.role)
        .bind(&account.app_metadata.provider)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Account {
            id: account.id.clone(),
            full_name: account.user_metadata.full_name.clone(),
            avatar_url: account.user_metadata.avatar_url.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            provider: account.app_metadata.provider.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        })
    }

    pub async fn get_account(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, SqlAccount>(
            r#"
            SELECT id, full_name, avatar_url, email, role, provider, created_at, updated_at
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::records::{NetlifyAppMetadata, NetlifyUserMetadata};

    #[tokio::test]
    async fn account_is_found_by_email() {
        let db = Db::in_memory().await.unwrap();
        let netlify = NetlifyAccount {
            id: "abc".into(),
            email: "dev@example.com".into(),
            role: Some("member".into()),
            user_metadata: NetlifyUserMetadata {
                full_name: "Dev".into(),
                avatar_url: Some("https://avatars/dev.png".into()),
            },
            app_metadata: NetlifyAppMetadata {
                provider: "google".into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        db.create_account(&netlify).await.unwrap();
        let account = db.get_account("dev@example.com").await.unwrap().unwrap();
        assert_eq!(account.full_name, "Dev");
        assert_eq!(account.provider, "google");
        assert!(db.get_account("nobody@example.com").await.unwrap().is_none());

        // email 唯一
        assert!(db.create_account(&netlify).await.is_err());
    }
}
