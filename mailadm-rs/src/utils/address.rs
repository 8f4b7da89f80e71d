use crate::error::{AdminError, Result};

/// Split a username of the form `local@domain` into its parts.
///
/// Usernames must contain exactly one `@` with non-empty parts on both
/// sides; anything else is rejected before any storage is touched.
pub fn split_address(username: &str) -> Result<(&str, &str)> {
    let mut parts = username.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
            Ok((local, domain))
        }
        _ => Err(AdminError::InvalidArgument(format!(
            "invalid username format: {}",
            username
        ))),
    }
}

/// Domain suffix of a username, without the local part.
pub fn domain_of(username: &str) -> Result<&str> {
    split_address(username).map(|(_, domain)| domain)
}
