//! Session and sign-up models handed out by the session gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a bearer token is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Regular signed-in session
    Standard,
    /// Short-lived session opened from a password reset email; only good for
    /// setting a new password
    Recovery,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub kind: SessionKind,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of a successful sign-up: the account exists but must be confirmed
/// from the emailed link before it can sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConfirmation {
    pub user_id: String,
    pub email: String,
}

/// Emitted whenever a session starts, ends or changes meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: String },
    SignedOut { user_id: String, access_token: String },
    /// A recovery session from a reset email was presented
    PasswordRecovery { user_id: String },
    PasswordUpdated { user_id: String },
    /// A token was presented after it ran out
    Expired { user_id: String, access_token: String },
}
