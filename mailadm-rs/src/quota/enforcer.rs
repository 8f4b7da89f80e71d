//! Quota enforcement on the message-acceptance path.
//!
//! Enforcement is soft under concurrency: each check reads a fresh
//! usage snapshot, but no lock or reservation spans the check and the
//! later message store. Two deliveries racing on the same account can
//! both pass against the same pre-delivery figure and jointly overshoot
//! the limit. Callers wanting a hard guarantee need a per-account
//! serialization point (e.g. a running-usage counter updated in the
//! same transaction as the delivery); none is provided here.

use tracing::warn;

use super::resolver::QuotaResolver;
use super::usage::UsageAggregator;
use crate::error::{AdminError, Result};

#[derive(Clone)]
pub struct QuotaEnforcer {
    usage: UsageAggregator,
    resolver: QuotaResolver,
}

impl QuotaEnforcer {
    pub fn new(usage: UsageAggregator, resolver: QuotaResolver) -> Self {
        Self { usage, resolver }
    }

    /// Decide whether a message of `incoming_bytes` may be stored for
    /// `username`. Called before the message is durably written.
    ///
    /// Accepts when the account does not exist (identity validation
    /// belongs to other layers) and when the effective limit is 0
    /// (unlimited). Otherwise accepts iff `used + incoming <= limit`.
    /// The [`AdminError::QuotaExceeded`] failure is a permanent
    /// rejection; mail-side callers reply 552 / 5.2.2, not a retry.
    pub async fn check(&self, username: &str, incoming_bytes: i64) -> Result<()> {
        let Some(snapshot) = self.usage.usage(username).await? else {
            return Ok(());
        };

        let effective = self.resolver.effective_quota(username).await?;
        if effective.is_unlimited() {
            return Ok(());
        }

        let used = snapshot.total_bytes;
        if used + incoming_bytes <= effective.bytes {
            Ok(())
        } else {
            warn!(
                "rejecting {} byte message for {}: {} of {} bytes used",
                incoming_bytes, username, used, effective.bytes
            );
            Err(AdminError::QuotaExceeded {
                current: used,
                limit: effective.bytes,
            })
        }
    }
}
