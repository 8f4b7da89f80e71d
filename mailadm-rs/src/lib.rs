//! mailadm-rs: administrative layer for a mail server
//!
//! Provisions mailbox accounts and tracks/enforces per-user and
//! per-domain storage quotas.
//!
//! # Features
//!
//! - **Quotas**: two-level limits (per-user override over per-domain
//!   default), live usage aggregation, acceptance-time enforcement
//! - **Provisioning**: standard special-use folder set with a plain
//!   fallback for backends without SPECIAL-USE support
//! - **Admin API**: REST surface for operators to inspect usage and
//!   set limits
//!
//! The credential store, mail storage backend and DKIM key manager are
//! external collaborators consumed through the traits in [`backend`];
//! SQLite-backed and in-memory implementations ship in-tree.
//!
//! # Example
//!
//! ```no_run
//! use mailadm_rs::backend::memory::MemoryMailStorage;
//! use mailadm_rs::provision::Provisioner;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(MemoryMailStorage::new());
//!     let provisioner = Provisioner::new(storage);
//!
//!     let report = provisioner.provision("user@example.com").await?;
//!     println!("{} folders created", report.created());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`backend`]: Collaborator interfaces and reference backends
//! - [`quota`]: Quota store, usage aggregation, resolution, enforcement
//! - [`provision`]: Account/mailbox provisioning
//! - [`api`]: REST admin surface

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod provision;
pub mod quota;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AdminError, Result};
