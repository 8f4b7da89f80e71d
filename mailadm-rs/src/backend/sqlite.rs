//! SQLite-backed collaborator implementations.
//!
//! Schema: `accounts` / `mailboxes` / `messages` for mail storage and
//! a `credentials` table for the user database. Tables are created
//! idempotently at construction.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::{CredentialStore, MailStorage, SpecialUseStorage};
use crate::error::{AdminError, Result};
use crate::quota::types::MailboxUsage;

pub struct SqliteMailStorage {
    db: SqlitePool,
}

impl SqliteMailStorage {
    pub async fn new(db: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mailboxes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                special_use TEXT,
                UNIQUE(account_id, name)
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mailbox_id INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }

    async fn account_id(&self, username: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(id)
    }

    async fn insert_mailbox(
        &self,
        username: &str,
        name: &str,
        special_use: Option<&str>,
    ) -> Result<()> {
        let account_id = self
            .account_id(username)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("account {}", username)))?;

        sqlx::query("INSERT INTO mailboxes (account_id, name, special_use) VALUES (?, ?, ?)")
            .bind(account_id)
            .bind(name)
            .bind(special_use)
            .execute(&self.db)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => AdminError::InvalidArgument(
                    format!("mailbox {} already exists for {}", name, username),
                ),
                _ => AdminError::Database(e),
            })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MailStorage for SqliteMailStorage {
    async fn create_account(&self, username: &str) -> Result<()> {
        sqlx::query("INSERT INTO accounts (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.db)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    AdminError::InvalidArgument(format!("account {} already exists", username))
                }
                _ => AdminError::Database(e),
            })?;

        info!("created mail storage account {}", username);
        Ok(())
    }

    async fn delete_account(&self, username: &str) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let account_id =
            sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AdminError::NotFound(format!("account {}", username)))?;

        sqlx::query(
            "DELETE FROM messages WHERE mailbox_id IN (SELECT id FROM mailboxes WHERE account_id = ?)",
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM mailboxes WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("deleted mail storage account {}", username);
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<String>> {
        let usernames =
            sqlx::query_scalar::<_, String>("SELECT username FROM accounts ORDER BY username")
                .fetch_all(&self.db)
                .await?;
        Ok(usernames)
    }

    async fn create_mailbox(&self, username: &str, name: &str) -> Result<()> {
        self.insert_mailbox(username, name, None).await
    }

    async fn account_usage(&self, username: &str) -> Result<Option<Vec<MailboxUsage>>> {
        let Some(account_id) = self.account_id(username).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT mb.name, COUNT(m.id), COALESCE(SUM(m.size_bytes), 0)
            FROM mailboxes mb
            LEFT JOIN messages m ON m.mailbox_id = mb.id
            WHERE mb.account_id = ?
            GROUP BY mb.id, mb.name
            ORDER BY mb.name
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(
            rows.into_iter()
                .map(|(name, message_count, used_bytes)| MailboxUsage {
                    name,
                    message_count,
                    used_bytes,
                })
                .collect(),
        ))
    }

    async fn append_message(&self, username: &str, mailbox: &str, size_bytes: i64) -> Result<()> {
        let mailbox_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT mb.id FROM mailboxes mb
            JOIN accounts a ON a.id = mb.account_id
            WHERE a.username = ? AND mb.name = ?
            "#,
        )
        .bind(username)
        .bind(mailbox)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("mailbox {} for {}", mailbox, username)))?;

        sqlx::query("INSERT INTO messages (mailbox_id, size_bytes) VALUES (?, ?)")
            .bind(mailbox_id)
            .bind(size_bytes)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    fn special_use(&self) -> Option<&dyn SpecialUseStorage> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl SpecialUseStorage for SqliteMailStorage {
    async fn create_mailbox_special(&self, username: &str, name: &str, attr: &str) -> Result<()> {
        self.insert_mailbox(username, name, Some(attr)).await
    }
}

pub struct SqliteCredentialStore {
    db: SqlitePool,
}

impl SqliteCredentialStore {
    pub async fn new(db: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AdminError::BackendUnavailable(format!("password hash failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn list_users(&self) -> Result<Vec<String>> {
        let usernames =
            sqlx::query_scalar::<_, String>("SELECT username FROM credentials ORDER BY username")
                .fetch_all(&self.db)
                .await?;
        Ok(usernames)
    }

    async fn create_user(&self, username: &str, secret: &str) -> Result<()> {
        let password_hash = self.hash_password(secret)?;

        sqlx::query(
            "INSERT INTO credentials (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                AdminError::InvalidArgument(format!("user {} already exists", username))
            }
            _ => AdminError::Database(e),
        })?;

        info!("created credentials for {}", username);
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE username = ?")
            .bind(username)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound(format!("user {}", username)));
        }

        info!("deleted credentials for {}", username);
        Ok(())
    }

    async fn set_password(&self, username: &str, secret: &str) -> Result<()> {
        let password_hash = self.hash_password(secret)?;

        let result = sqlx::query("UPDATE credentials SET password_hash = ? WHERE username = ?")
            .bind(&password_hash)
            .bind(username)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound(format!("user {}", username)));
        }

        Ok(())
    }

    async fn verify_password(&self, username: &str, secret: &str) -> Result<bool> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM credentials WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        let Some(hash) = hash else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AdminError::BackendUnavailable(format!("stored hash invalid: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_usage_aggregation_per_mailbox() {
        let storage = SqliteMailStorage::new(memory_pool().await).await.unwrap();
        storage.create_account("a@example.com").await.unwrap();
        storage.create_mailbox("a@example.com", "INBOX").await.unwrap();
        storage.create_mailbox("a@example.com", "Sent").await.unwrap();
        storage.append_message("a@example.com", "INBOX", 100).await.unwrap();
        storage.append_message("a@example.com", "INBOX", 200).await.unwrap();
        storage.append_message("a@example.com", "Sent", 50).await.unwrap();

        let usage = storage.account_usage("a@example.com").await.unwrap().unwrap();
        assert_eq!(usage.len(), 2);
        // ORDER BY name: INBOX before Sent
        assert_eq!(usage[0].name, "INBOX");
        assert_eq!(usage[0].message_count, 2);
        assert_eq!(usage[0].used_bytes, 300);
        assert_eq!(usage[1].used_bytes, 50);
    }

    #[tokio::test]
    async fn test_missing_account_is_none_empty_account_is_some() {
        let storage = SqliteMailStorage::new(memory_pool().await).await.unwrap();
        assert!(storage.account_usage("a@example.com").await.unwrap().is_none());

        storage.create_account("a@example.com").await.unwrap();
        let usage = storage.account_usage("a@example.com").await.unwrap().unwrap();
        assert!(usage.is_empty());
    }

    #[tokio::test]
    async fn test_delete_account_removes_everything() {
        let storage = SqliteMailStorage::new(memory_pool().await).await.unwrap();
        storage.create_account("a@example.com").await.unwrap();
        storage.create_mailbox("a@example.com", "INBOX").await.unwrap();
        storage.append_message("a@example.com", "INBOX", 10).await.unwrap();

        storage.delete_account("a@example.com").await.unwrap();
        assert!(storage.account_usage("a@example.com").await.unwrap().is_none());
        assert!(matches!(
            storage.delete_account("a@example.com").await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let storage = SqliteMailStorage::new(memory_pool().await).await.unwrap();
        storage.create_account("a@example.com").await.unwrap();
        assert!(matches!(
            storage.create_account("a@example.com").await,
            Err(AdminError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_special_use_attribute_stored() {
        let storage = SqliteMailStorage::new(memory_pool().await).await.unwrap();
        storage.create_account("a@example.com").await.unwrap();
        storage
            .special_use()
            .unwrap()
            .create_mailbox_special("a@example.com", "Sent", "\\Sent")
            .await
            .unwrap();

        let attr = sqlx::query_scalar::<_, Option<String>>(
            "SELECT special_use FROM mailboxes WHERE name = 'Sent'",
        )
        .fetch_one(&storage.db)
        .await
        .unwrap();
        assert_eq!(attr.as_deref(), Some("\\Sent"));
    }

    #[tokio::test]
    async fn test_credentials_roundtrip() {
        let store = SqliteCredentialStore::new(memory_pool().await).await.unwrap();
        store.create_user("a@example.com", "secret").await.unwrap();

        assert!(store.verify_password("a@example.com", "secret").await.unwrap());
        assert!(!store.verify_password("a@example.com", "wrong").await.unwrap());
        assert!(!store.verify_password("nobody@example.com", "secret").await.unwrap());

        store.set_password("a@example.com", "other").await.unwrap();
        assert!(store.verify_password("a@example.com", "other").await.unwrap());

        assert!(matches!(
            store.set_password("nobody@example.com", "x").await,
            Err(AdminError::NotFound(_))
        ));
    }
}
