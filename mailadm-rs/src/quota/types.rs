use serde::{Deserialize, Serialize};

/// Where an effective quota value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaSource {
    /// Per-user override.
    User,
    /// Domain-level default.
    Domain,
    /// Neither level set: unlimited.
    None,
}

/// Storage usage of a single mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxUsage {
    pub name: String,
    pub message_count: i64,
    pub used_bytes: i64,
}

/// Live usage of one account, computed on demand. Never cached: the
/// enforcement path must see current state.
#[derive(Debug, Clone)]
pub struct UsageSnapshot {
    pub total_bytes: i64,
    pub mailboxes: Vec<MailboxUsage>,
}

/// Resolved storage limit for a user. `bytes == 0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveQuota {
    pub bytes: i64,
    pub source: QuotaSource,
}

impl EffectiveQuota {
    pub fn is_unlimited(&self) -> bool {
        self.bytes == 0
    }
}

/// Quota report for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuotaReport {
    pub username: String,
    pub used_bytes: i64,
    /// 0 = unlimited
    pub quota_bytes: i64,
    pub quota_source: QuotaSource,
    pub mailboxes: Vec<MailboxUsage>,
}

/// Usage of one user within a domain report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUsage {
    pub username: String,
    pub used_bytes: i64,
    /// Present only when a positive per-user override exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_override: Option<i64>,
}

/// Quota report for a whole domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainQuotaReport {
    pub domain: String,
    pub used_bytes: i64,
    /// 0 = unlimited
    pub quota_bytes: i64,
    pub user_count: i64,
    pub users: Vec<UserUsage>,
}

/// Request body for the quota PUT endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuotaRequest {
    pub quota_bytes: i64,
}
