use crate::{models::SqlDonation, Db};
use chrono::Utc;
use domain::records::{Donation, NewDonation};

impl Db {
    pub async fn create_donation(&self, d: &NewDonation) -> anyhow::Result<Donation> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO donations (coffee_id, email, name, count, message, link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(d.coffee_id)
        .bind(&d.email)
        .bind(&d.name)
        .bind(d.count)
        .bind(&d.message)
        .bind(&d.link)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Donation {
            id: result.last_insert_rowid(),
            coffee_id: d.coffee_id,
            email: d.email.clone(),
            name: d.name.clone(),
            count: d.count,
            message: d.message.clone(),
            link: d.link.clone(),
            created_at: now,
        })
    }

    /// 按 BuyMeACoffee 的 coffee_id 查询
    pub async fn get_donation(&self, coffee_id: i64) -> anyhow::Result<Option<Donation>> {
        let row = sqlx::query_as::<_, SqlDonation>(
            r#"
            SELECT id, coffee_id, email, name, count, message, link, created_at
            FROM donations
            WHERE coffee_id = ?
            "#,
        )
        .bind(coffee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
