//! Quota accounting and enforcement.
//!
//! [`store::QuotaStore`] persists the two-level limits,
//! [`usage::UsageAggregator`] reads live usage from mail storage,
//! [`resolver::QuotaResolver`] applies the override precedence and
//! [`enforcer::QuotaEnforcer`] gates message acceptance.

pub mod enforcer;
pub mod resolver;
pub mod store;
pub mod types;
pub mod usage;

pub use enforcer::QuotaEnforcer;
pub use resolver::QuotaResolver;
pub use store::QuotaStore;
pub use usage::UsageAggregator;
