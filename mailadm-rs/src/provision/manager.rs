//! Account provisioning against the mail storage backend.

use std::sync::Arc;

use tracing::{info, warn};

use super::types::{FolderOutcome, ProvisionReport, SpecialUse};
use crate::backend::MailStorage;
use crate::error::Result;
use crate::utils::address::split_address;

#[derive(Clone)]
pub struct Provisioner {
    storage: Arc<dyn MailStorage>,
}

impl Provisioner {
    pub fn new(storage: Arc<dyn MailStorage>) -> Self {
        Self { storage }
    }

    /// Create the account and its five standard folders.
    ///
    /// The account creation itself is all-or-nothing; the folders are
    /// best-effort and independent. A failed folder is logged and
    /// recorded in the report, the remaining ones are still attempted
    /// and nothing already created is rolled back. When the backend
    /// lacks the SPECIAL-USE capability the same folders are created
    /// untagged.
    pub async fn provision(&self, username: &str) -> Result<ProvisionReport> {
        split_address(username)?;

        self.storage.create_account(username).await?;

        let special = self.storage.special_use();
        if special.is_none() {
            warn!("storage backend does not support the SPECIAL-USE IMAP extension");
        }

        let mut folders = Vec::with_capacity(SpecialUse::ALL.len());
        for role in SpecialUse::ALL {
            let name = role.folder_name();
            let result = match special {
                Some(su) => {
                    su.create_mailbox_special(username, name, role.attribute())
                        .await
                }
                None => self.storage.create_mailbox(username, name).await,
            };

            match result {
                Ok(()) => folders.push(FolderOutcome {
                    name: name.to_string(),
                    special_use: special.is_some(),
                    error: None,
                }),
                Err(e) => {
                    warn!("failed to create {} folder for {}: {}", name, username, e);
                    folders.push(FolderOutcome {
                        name: name.to_string(),
                        special_use: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let report = ProvisionReport {
            username: username.to_string(),
            special_use_supported: special.is_some(),
            folders,
        };

        info!(
            "provisioned {}: {} folders created, {} failed",
            username,
            report.created(),
            report.failed()
        );
        Ok(report)
    }

    /// Remove the account and all its mailboxes. Unlike provisioning
    /// this is fatal on error: a partial removal would leave orphaned
    /// mail data, so any backend failure propagates.
    pub async fn deprovision(&self, username: &str) -> Result<()> {
        self.storage.delete_account(username).await?;
        info!("deprovisioned {}", username);
        Ok(())
    }
}
