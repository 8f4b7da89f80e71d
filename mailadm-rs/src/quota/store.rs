//! Persistent quota limits, keyed by username or domain.
//!
//! Two tables, `user_quotas` and `domain_quotas`, created idempotently
//! at construction. A stored value of 0 means "no limit at this level";
//! the precedence between levels lives in [`super::resolver`].

use sqlx::SqlitePool;

use crate::error::{AdminError, Result};

pub struct QuotaStore {
    db: SqlitePool,
}

impl QuotaStore {
    pub async fn new(db: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_quotas (
                username TEXT PRIMARY KEY,
                quota_bytes INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS domain_quotas (
                domain TEXT PRIMARY KEY,
                quota_bytes INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }

    pub async fn get_user_quota(&self, username: &str) -> Result<Option<i64>> {
        let quota = sqlx::query_scalar::<_, i64>(
            "SELECT quota_bytes FROM user_quotas WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(quota)
    }

    pub async fn get_domain_quota(&self, domain: &str) -> Result<Option<i64>> {
        let quota =
            sqlx::query_scalar::<_, i64>("SELECT quota_bytes FROM domain_quotas WHERE domain = ?")
                .bind(domain)
                .fetch_optional(&self.db)
                .await?;
        Ok(quota)
    }

    /// Idempotent upsert of a per-user override. Racing writers resolve
    /// last-writer-wins; `updated_at` is bumped on every call, value
    /// changed or not.
    pub async fn set_user_quota(&self, username: &str, quota_bytes: i64) -> Result<()> {
        validate_quota(quota_bytes)?;

        sqlx::query(
            r#"
            INSERT INTO user_quotas (username, quota_bytes, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT (username) DO UPDATE SET
                quota_bytes = excluded.quota_bytes,
                updated_at = datetime('now')
            "#,
        )
        .bind(username)
        .bind(quota_bytes)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Idempotent upsert of a domain default.
    pub async fn set_domain_quota(&self, domain: &str, quota_bytes: i64) -> Result<()> {
        validate_quota(quota_bytes)?;

        sqlx::query(
            r#"
            INSERT INTO domain_quotas (domain, quota_bytes, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT (domain) DO UPDATE SET
                quota_bytes = excluded.quota_bytes,
                updated_at = datetime('now')
            "#,
        )
        .bind(domain)
        .bind(quota_bytes)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

fn validate_quota(quota_bytes: i64) -> Result<()> {
    if quota_bytes < 0 {
        return Err(AdminError::InvalidArgument(format!(
            "quota_bytes must be >= 0, got {}",
            quota_bytes
        )));
    }
    Ok(())
}
