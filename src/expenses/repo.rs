use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Expense record in the database. Serialized camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount: f64,
    pub comments: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One GROUP BY row of the stats query.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: i64,
}

impl Expense {
    /// All expenses of one user, newest first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, category, amount, comments, created_at, updated_at
            FROM expenses
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        category: &str,
        amount: f64,
        comments: Option<&str>,
    ) -> Result<Expense, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, category, amount, comments)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, category, amount, comments, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(amount)
        .bind(comments)
        .fetch_one(db)
        .await
    }

    /// Overwrite category, amount and comments. Scoped by owner: an id that
    /// exists under another user comes back as `None`, same as a missing id.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
        category: &str,
        amount: f64,
        comments: Option<&str>,
    ) -> Result<Option<Expense>, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET category = $1, amount = $2, comments = $3, updated_at = now()
            WHERE id = $4 AND user_id = $5
            RETURNING id, user_id, category, amount, comments, created_at, updated_at
            "#,
        )
        .bind(category)
        .bind(amount)
        .bind(comments)
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Returns false when nothing was deleted (missing or foreign id).
    pub async fn delete(
        db: &PgPool,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM expenses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-category sums and counts, largest total first.
    pub async fn stats_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, SUM(amount) AS total, COUNT(id) AS count
            FROM expenses
            WHERE user_id = $1
            GROUP BY category
            ORDER BY SUM(amount) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_serializes_camel_case() {
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: "Food".into(),
            amount: 12.5,
            comments: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&expense).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("user_id"));
    }
}
