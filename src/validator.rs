// src/validator.rs
use crate::error::Result;
use crate::types::ReconError;

pub const MAX_TARGET_LEN: usize = 253;
pub const MAX_USERNAME_LEN: usize = 64;

/// Accepts hostnames, IPv4 and IPv6 literals: `[A-Za-z0-9.\-:]`, at most 253 chars.
pub fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(ReconError::InvalidTarget("target is empty".to_string()));
    }
    if target.len() > MAX_TARGET_LEN {
        return Err(ReconError::InvalidTarget(format!(
            "target exceeds {} characters",
            MAX_TARGET_LEN
        )));
    }
    if !target
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ReconError::InvalidTarget(target.to_string()));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(ReconError::InvalidTarget(format!(
            "username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ReconError::InvalidTarget(username.to_string()));
    }
    Ok(())
}
