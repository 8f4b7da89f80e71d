//! Effective-quota resolution.
//!
//! The one place that knows the override precedence. Both the admin
//! read path and the enforcement path resolve through here, so the two
//! can never disagree about a user's limit.

use std::sync::Arc;

use super::store::QuotaStore;
use super::types::{EffectiveQuota, QuotaSource};
use crate::error::Result;
use crate::utils::address::domain_of;

#[derive(Clone)]
pub struct QuotaResolver {
    store: Arc<QuotaStore>,
}

impl QuotaResolver {
    pub fn new(store: Arc<QuotaStore>) -> Self {
        Self { store }
    }

    /// Resolve the limit that applies to a user:
    /// a positive user override, else a positive domain default, else
    /// unlimited. A stored 0 at either level counts as absent.
    ///
    /// The domain lookup only happens when no positive user override
    /// exists. That ordering is contractual, not an optimization: a
    /// per-user override must keep working under a domain-wide
    /// lockdown (domain default set very low).
    pub async fn effective_quota(&self, username: &str) -> Result<EffectiveQuota> {
        if let Some(bytes) = self.store.get_user_quota(username).await? {
            if bytes > 0 {
                return Ok(EffectiveQuota {
                    bytes,
                    source: QuotaSource::User,
                });
            }
        }

        let domain = domain_of(username)?;
        if let Some(bytes) = self.store.get_domain_quota(domain).await? {
            if bytes > 0 {
                return Ok(EffectiveQuota {
                    bytes,
                    source: QuotaSource::Domain,
                });
            }
        }

        Ok(EffectiveQuota {
            bytes: 0,
            source: QuotaSource::None,
        })
    }
}
