//! Provisioning scenarios against both reference storage backends.

use mailadm_rs::backend::memory::MemoryMailStorage;
use mailadm_rs::backend::sqlite::SqliteMailStorage;
use mailadm_rs::backend::MailStorage;
use mailadm_rs::error::AdminError;
use mailadm_rs::provision::Provisioner;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

const FOLDERS: [&str; 5] = ["Sent", "Trash", "Junk", "Drafts", "Archive"];

#[tokio::test]
async fn test_provision_on_special_use_backend() {
    let storage = Arc::new(SqliteMailStorage::new(memory_pool().await).await.unwrap());
    let provisioner = Provisioner::new(storage.clone());

    let report = provisioner.provision("new@example.com").await.unwrap();
    assert!(report.special_use_supported);
    assert_eq!(report.created(), 5);
    assert_eq!(report.tagged(), 5);
    assert!(!report.is_partial());

    let usage = storage.account_usage("new@example.com").await.unwrap().unwrap();
    let mut names: Vec<&str> = usage.iter().map(|m| m.name.as_str()).collect();
    names.sort_unstable();
    let mut expected = FOLDERS.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_provision_on_plain_backend_creates_untagged_folders() {
    let storage = Arc::new(MemoryMailStorage::without_special_use());
    let provisioner = Provisioner::new(storage.clone());

    let report = provisioner.provision("new@example.com").await.unwrap();
    assert!(!report.special_use_supported);
    assert_eq!(report.created(), 5);
    assert_eq!(report.tagged(), 0);

    for folder in FOLDERS {
        assert_eq!(storage.mailbox_special_use("new@example.com", folder).await, None);
    }
}

#[tokio::test]
async fn test_provision_rejects_malformed_username_before_storage() {
    let storage = Arc::new(SqliteMailStorage::new(memory_pool().await).await.unwrap());
    let provisioner = Provisioner::new(storage.clone());

    assert!(matches!(
        provisioner.provision("bad-username").await,
        Err(AdminError::InvalidArgument(_))
    ));
    assert!(storage.list_accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provision_twice_fails_on_account_step() {
    let storage = Arc::new(SqliteMailStorage::new(memory_pool().await).await.unwrap());
    let provisioner = Provisioner::new(storage);

    provisioner.provision("new@example.com").await.unwrap();
    assert!(matches!(
        provisioner.provision("new@example.com").await,
        Err(AdminError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_partial_folder_failure_reported_not_fatal() {
    let storage = Arc::new(MemoryMailStorage::new());
    storage.fail_mailbox_creation("Trash").await;
    storage.fail_mailbox_creation("Junk").await;
    let provisioner = Provisioner::new(storage.clone());

    let report = provisioner.provision("new@example.com").await.unwrap();
    assert!(report.is_partial());
    assert_eq!(report.created(), 3);
    assert_eq!(report.failed(), 2);

    // Later folders were still attempted after the failures.
    assert!(storage
        .mailbox_special_use("new@example.com", "Archive")
        .await
        .is_some());
}

#[tokio::test]
async fn test_deprovision_removes_account_and_mail() {
    let storage = Arc::new(SqliteMailStorage::new(memory_pool().await).await.unwrap());
    let provisioner = Provisioner::new(storage.clone());

    provisioner.provision("new@example.com").await.unwrap();
    storage
        .append_message("new@example.com", "Sent", 2048)
        .await
        .unwrap();

    provisioner.deprovision("new@example.com").await.unwrap();
    assert!(storage.account_usage("new@example.com").await.unwrap().is_none());
    assert!(storage.list_accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deprovision_unknown_account_is_fatal() {
    let storage = Arc::new(SqliteMailStorage::new(memory_pool().await).await.unwrap());
    let provisioner = Provisioner::new(storage);

    assert!(matches!(
        provisioner.deprovision("nobody@example.com").await,
        Err(AdminError::NotFound(_))
    ));
}
