//! REST API for the admin surface.

pub mod handlers;
pub mod quotas;
pub mod server;
pub mod users;

pub use handlers::AppState;
pub use server::ApiServer;
