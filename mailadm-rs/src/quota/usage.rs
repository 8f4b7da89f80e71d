//! Live usage aggregation over the mail storage backend.

use std::sync::Arc;

use super::types::{UsageSnapshot, UserUsage};
use crate::backend::MailStorage;
use crate::error::Result;

/// Computes current bytes-used from mailbox contents. Every call is a
/// fresh read against storage; nothing is cached, so the enforcement
/// path always sees recent state.
#[derive(Clone)]
pub struct UsageAggregator {
    storage: Arc<dyn MailStorage>,
}

impl UsageAggregator {
    pub fn new(storage: Arc<dyn MailStorage>) -> Self {
        Self { storage }
    }

    /// Usage of one account. `None` means the storage backend has no
    /// account record; an existing account with no mail yields
    /// `Some` with zero totals.
    pub async fn usage(&self, username: &str) -> Result<Option<UsageSnapshot>> {
        let Some(mailboxes) = self.storage.account_usage(username).await? else {
            return Ok(None);
        };

        let total_bytes = mailboxes.iter().map(|m| m.used_bytes).sum();
        Ok(Some(UsageSnapshot {
            total_bytes,
            mailboxes,
        }))
    }

    /// Per-user usage for every account whose domain suffix matches.
    /// Overrides are not filled in here; the admin surface joins them
    /// from the quota store.
    pub async fn domain_usage(&self, domain: &str) -> Result<Vec<UserUsage>> {
        let suffix = format!("@{}", domain);
        let mut users = Vec::new();

        for username in self.storage.list_accounts().await? {
            if !username.ends_with(&suffix) {
                continue;
            }

            let used_bytes = match self.storage.account_usage(&username).await? {
                Some(mailboxes) => mailboxes.iter().map(|m| m.used_bytes).sum(),
                None => 0,
            };

            users.push(UserUsage {
                username,
                used_bytes,
                quota_override: None,
            });
        }

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryMailStorage;

    async fn storage_with_account(username: &str) -> Arc<MemoryMailStorage> {
        let storage = Arc::new(MemoryMailStorage::new());
        storage.create_account(username).await.unwrap();
        storage.create_mailbox(username, "INBOX").await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_usage_totals_across_mailboxes() {
        let storage = storage_with_account("a@example.com").await;
        storage.create_mailbox("a@example.com", "Sent").await.unwrap();
        storage.append_message("a@example.com", "INBOX", 300).await.unwrap();
        storage.append_message("a@example.com", "Sent", 200).await.unwrap();

        let aggregator = UsageAggregator::new(storage);
        let snapshot = aggregator.usage("a@example.com").await.unwrap().unwrap();
        assert_eq!(snapshot.total_bytes, 500);
        assert_eq!(snapshot.mailboxes.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let aggregator = UsageAggregator::new(Arc::new(MemoryMailStorage::new()));
        assert!(aggregator.usage("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_usage_reflects_new_deliveries() {
        let storage = storage_with_account("a@example.com").await;
        let aggregator = UsageAggregator::new(storage.clone());

        let before = aggregator.usage("a@example.com").await.unwrap().unwrap();
        assert_eq!(before.total_bytes, 0);

        storage.append_message("a@example.com", "INBOX", 64).await.unwrap();
        let after = aggregator.usage("a@example.com").await.unwrap().unwrap();
        assert_eq!(after.total_bytes, 64);
    }

    #[tokio::test]
    async fn test_domain_usage_filters_by_suffix() {
        let storage = storage_with_account("a@example.com").await;
        storage.create_account("b@example.com").await.unwrap();
        storage.create_account("c@other.org").await.unwrap();
        storage.append_message("a@example.com", "INBOX", 10).await.unwrap();

        let aggregator = UsageAggregator::new(storage);
        let users = aggregator.domain_usage("example.com").await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "a@example.com");
        assert_eq!(users[0].used_bytes, 10);
        assert_eq!(users[1].username, "b@example.com");
        assert_eq!(users[1].used_bytes, 0);
    }
}
