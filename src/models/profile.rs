//! Profile model.

use serde::{Deserialize, Serialize};

/// Longest username accepted on save.
pub const MAX_USERNAME_LEN: usize = 32;

/// Path segments the public catch-all route can never claim.
pub const RESERVED_USERNAMES: &[&str] = &[
    "admin",
    "login",
    "register",
    "forgot-password",
    "update-password",
    "api",
    "health",
    "avatars",
    "demo",
];

/// The public profile owned by one authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Placeholder for an identity that has never saved a profile.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: String::new(),
            role: None,
            avatar_url: None,
            theme: None,
            updated_at: None,
        }
    }

    /// Whether this profile has been persisted at least once.
    pub fn is_persisted(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Check that a username can be used as a public URL segment.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("Username may only contain letters, digits, '_', '.' and '-'".to_string());
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err(format!("Username '{}' is reserved", username));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("joao.silva-01").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("slash/name").is_err());
        assert!(validate_username("Admin").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_empty_profile_is_not_persisted() {
        let profile = Profile::empty("user-1");
        assert_eq!(profile.user_id, "user-1");
        assert!(profile.username.is_empty());
        assert!(!profile.is_persisted());
    }
}
