//! In-memory collaborator implementations.
//!
//! Used by the test suites and the dev wiring. `MemoryMailStorage`
//! optionally drops the SPECIAL-USE capability so the provisioning
//! fallback branch can be exercised, and individual mailbox creations
//! can be made to fail.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio::sync::RwLock;

use super::{CredentialStore, DkimManager, MailStorage, SpecialUseStorage};
use crate::error::{AdminError, Result};
use crate::quota::types::MailboxUsage;

#[derive(Debug, Default)]
struct MemoryMailbox {
    special_use: Option<String>,
    messages: Vec<i64>,
}

pub struct MemoryMailStorage {
    accounts: RwLock<BTreeMap<String, BTreeMap<String, MemoryMailbox>>>,
    special_use_enabled: bool,
    failing_mailboxes: RwLock<HashSet<String>>,
}

impl MemoryMailStorage {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            special_use_enabled: true,
            failing_mailboxes: RwLock::new(HashSet::new()),
        }
    }

    /// A backend that cannot tag mailboxes with SPECIAL-USE attributes.
    pub fn without_special_use() -> Self {
        Self {
            special_use_enabled: false,
            ..Self::new()
        }
    }

    /// Make every creation of a mailbox with this name fail.
    pub async fn fail_mailbox_creation(&self, name: &str) {
        self.failing_mailboxes.write().await.insert(name.to_string());
    }

    /// SPECIAL-USE attribute of a stored mailbox, if any.
    pub async fn mailbox_special_use(&self, username: &str, name: &str) -> Option<String> {
        let accounts = self.accounts.read().await;
        accounts.get(username)?.get(name)?.special_use.clone()
    }

    async fn insert_mailbox(
        &self,
        username: &str,
        name: &str,
        special_use: Option<String>,
    ) -> Result<()> {
        if self.failing_mailboxes.read().await.contains(name) {
            return Err(AdminError::BackendUnavailable(format!(
                "mailbox {} cannot be created",
                name
            )));
        }

        let mut accounts = self.accounts.write().await;
        let mailboxes = accounts
            .get_mut(username)
            .ok_or_else(|| AdminError::NotFound(format!("account {}", username)))?;

        if mailboxes.contains_key(name) {
            return Err(AdminError::InvalidArgument(format!(
                "mailbox {} already exists",
                name
            )));
        }

        mailboxes.insert(
            name.to_string(),
            MemoryMailbox {
                special_use,
                messages: Vec::new(),
            },
        );
        Ok(())
    }
}

impl Default for MemoryMailStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MailStorage for MemoryMailStorage {
    async fn create_account(&self, username: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(username) {
            return Err(AdminError::InvalidArgument(format!(
                "account {} already exists",
                username
            )));
        }
        accounts.insert(username.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_account(&self, username: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| AdminError::NotFound(format!("account {}", username)))
    }

    async fn list_accounts(&self) -> Result<Vec<String>> {
        Ok(self.accounts.read().await.keys().cloned().collect())
    }

    async fn create_mailbox(&self, username: &str, name: &str) -> Result<()> {
        self.insert_mailbox(username, name, None).await
    }

    async fn account_usage(&self, username: &str) -> Result<Option<Vec<MailboxUsage>>> {
        let accounts = self.accounts.read().await;
        let Some(mailboxes) = accounts.get(username) else {
            return Ok(None);
        };

        Ok(Some(
            mailboxes
                .iter()
                .map(|(name, mbox)| MailboxUsage {
                    name: name.clone(),
                    message_count: mbox.messages.len() as i64,
                    used_bytes: mbox.messages.iter().sum(),
                })
                .collect(),
        ))
    }

    async fn append_message(&self, username: &str, mailbox: &str, size_bytes: i64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let mailboxes = accounts
            .get_mut(username)
            .ok_or_else(|| AdminError::NotFound(format!("account {}", username)))?;
        let mbox = mailboxes
            .get_mut(mailbox)
            .ok_or_else(|| AdminError::NotFound(format!("mailbox {}", mailbox)))?;
        mbox.messages.push(size_bytes);
        Ok(())
    }

    fn special_use(&self) -> Option<&dyn SpecialUseStorage> {
        if self.special_use_enabled {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
impl SpecialUseStorage for MemoryMailStorage {
    async fn create_mailbox_special(&self, username: &str, name: &str, attr: &str) -> Result<()> {
        self.insert_mailbox(username, name, Some(attr.to_string())).await
    }
}

pub struct MemoryCredentialStore {
    users: RwLock<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn list_users(&self) -> Result<Vec<String>> {
        Ok(self.users.read().await.keys().cloned().collect())
    }

    async fn create_user(&self, username: &str, secret: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AdminError::InvalidArgument(format!(
                "user {} already exists",
                username
            )));
        }
        users.insert(username.to_string(), secret.to_string());
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| AdminError::NotFound(format!("user {}", username)))
    }

    async fn set_password(&self, username: &str, secret: &str) -> Result<()> {
        let mut users = self.users.write().await;
        match users.get_mut(username) {
            Some(stored) => {
                *stored = secret.to_string();
                Ok(())
            }
            None => Err(AdminError::NotFound(format!("user {}", username))),
        }
    }

    async fn verify_password(&self, username: &str, secret: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .await
            .get(username)
            .map(|stored| stored == secret)
            .unwrap_or(false))
    }
}

pub struct MemoryDkimManager {
    domains: RwLock<BTreeSet<String>>,
}

impl MemoryDkimManager {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(BTreeSet::new()),
        }
    }

    pub async fn domains(&self) -> Vec<String> {
        self.domains.read().await.iter().cloned().collect()
    }
}

impl Default for MemoryDkimManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DkimManager for MemoryDkimManager {
    async fn add_key(&self, domain: &str) -> Result<()> {
        self.domains.write().await.insert(domain.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MailStorage;

    #[tokio::test]
    async fn test_account_usage_distinguishes_missing_from_empty() {
        let storage = MemoryMailStorage::new();
        assert!(storage.account_usage("a@example.com").await.unwrap().is_none());

        storage.create_account("a@example.com").await.unwrap();
        let usage = storage.account_usage("a@example.com").await.unwrap().unwrap();
        assert!(usage.is_empty());
    }

    #[tokio::test]
    async fn test_append_accumulates_usage() {
        let storage = MemoryMailStorage::new();
        storage.create_account("a@example.com").await.unwrap();
        storage.create_mailbox("a@example.com", "INBOX").await.unwrap();
        storage.append_message("a@example.com", "INBOX", 100).await.unwrap();
        storage.append_message("a@example.com", "INBOX", 50).await.unwrap();

        let usage = storage.account_usage("a@example.com").await.unwrap().unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].message_count, 2);
        assert_eq!(usage[0].used_bytes, 150);
    }

    #[tokio::test]
    async fn test_special_use_capability_gate() {
        let tagged = MemoryMailStorage::new();
        assert!(tagged.special_use().is_some());

        let plain = MemoryMailStorage::without_special_use();
        assert!(plain.special_use().is_none());
    }

    #[tokio::test]
    async fn test_delete_account_removes_mailboxes() {
        let storage = MemoryMailStorage::new();
        storage.create_account("a@example.com").await.unwrap();
        storage.create_mailbox("a@example.com", "INBOX").await.unwrap();
        storage.delete_account("a@example.com").await.unwrap();

        assert!(storage.account_usage("a@example.com").await.unwrap().is_none());
        assert!(matches!(
            storage.delete_account("a@example.com").await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_credential_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        store.create_user("a@example.com", "secret").await.unwrap();
        assert!(store.verify_password("a@example.com", "secret").await.unwrap());
        assert!(!store.verify_password("a@example.com", "wrong").await.unwrap());

        store.set_password("a@example.com", "other").await.unwrap();
        assert!(store.verify_password("a@example.com", "other").await.unwrap());

        store.delete_user("a@example.com").await.unwrap();
        assert!(!store.verify_password("a@example.com", "other").await.unwrap());
    }
}
