//! Collaborator interfaces consumed by the admin core.
//!
//! The credential store, the mail storage backend and the DKIM key
//! manager are external systems; the admin core only talks to them
//! through these traits and receives them by constructor injection.
//! Concrete implementations live in [`sqlite`] and [`memory`].

pub mod dkim;
pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::quota::types::MailboxUsage;

/// User credential database.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<String>>;

    async fn create_user(&self, username: &str, secret: &str) -> Result<()>;

    async fn delete_user(&self, username: &str) -> Result<()>;

    async fn set_password(&self, username: &str, secret: &str) -> Result<()>;

    async fn verify_password(&self, username: &str, secret: &str) -> Result<bool>;
}

/// Mailbox storage backend.
#[async_trait::async_trait]
pub trait MailStorage: Send + Sync {
    async fn create_account(&self, username: &str) -> Result<()>;

    /// Remove the account and all its mailboxes. Atomic from the
    /// caller's perspective: either everything is gone or the call
    /// fails and nothing is.
    async fn delete_account(&self, username: &str) -> Result<()>;

    async fn list_accounts(&self) -> Result<Vec<String>>;

    async fn create_mailbox(&self, username: &str, name: &str) -> Result<()>;

    /// Per-mailbox usage for one account, reflecting all messages
    /// visible at call time. `None` means no account record exists,
    /// which callers must distinguish from an account with no
    /// mailboxes (`Some(vec![])`).
    async fn account_usage(&self, username: &str) -> Result<Option<Vec<MailboxUsage>>>;

    /// Delivery-side mutation: store a message of the given size into
    /// an existing mailbox.
    async fn append_message(&self, username: &str, mailbox: &str, size_bytes: i64) -> Result<()>;

    /// Capability accessor: backends that can tag mailboxes with
    /// SPECIAL-USE attributes return themselves here, others return
    /// `None` and callers fall back to plain mailboxes.
    fn special_use(&self) -> Option<&dyn SpecialUseStorage>;
}

/// SPECIAL-USE (RFC 6154) capability of a storage backend.
#[async_trait::async_trait]
pub trait SpecialUseStorage: Send + Sync {
    async fn create_mailbox_special(&self, username: &str, name: &str, attr: &str) -> Result<()>;
}

/// DKIM key manager. Only touched when a domain gets its first user.
#[async_trait::async_trait]
pub trait DkimManager: Send + Sync {
    /// Ensure a signing key exists for the domain. Idempotent.
    async fn add_key(&self, domain: &str) -> Result<()>;
}
