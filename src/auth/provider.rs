//! Auth provider boundary and its SQLite-backed implementation.
//!
//! Passwords are stored as argon2 PHC strings. Sessions, recovery links and
//! confirmation links are opaque random tokens kept in `auth_tokens`.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::{Row, SqlitePool};

use super::mailer::{AuthMail, Mailer};
use crate::db::with_read_retry;
use crate::errors::{AppError, AuthError, MIN_PASSWORD_LEN};
use crate::models::{PendingConfirmation, Session, SessionKind};

/// Lifetime of a password recovery session.
const RECOVERY_TTL_MINUTES: i64 = 60;
/// Lifetime of a sign-up confirmation link.
const CONFIRMATION_TTL_HOURS: i64 = 24;
/// Random bytes behind every issued token.
const TOKEN_BYTES: usize = 32;
/// Random bytes in each argon2 salt.
const SALT_BYTES: usize = 16;

/// What a bearer token turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Live(Session),
    /// The token existed but had run out; it has now been removed.
    Expired(Session),
    Unknown,
}

impl SessionLookup {
    pub fn live(self) -> Option<Session> {
        match self {
            SessionLookup::Live(session) => Some(session),
            SessionLookup::Expired(_) | SessionLookup::Unknown => None,
        }
    }
}

/// Operations the hosted identity service offers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<PendingConfirmation, AppError>;

    async fn confirm_sign_up(&self, token: &str) -> Result<Session, AppError>;

    /// Revoke a token. Unknown tokens are ignored.
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    /// Mail a recovery link when the address belongs to an account; do
    /// nothing otherwise.
    async fn request_password_reset(&self, email: &str) -> Result<(), AppError>;

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<Session, AppError>;

    /// Look up a token. Expired tokens are removed and reported as such;
    /// revoked tokens are unknown.
    async fn session(&self, access_token: &str) -> Result<SessionLookup, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Session,
    Recovery,
    Confirmation,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Session => "session",
            TokenKind::Recovery => "recovery",
            TokenKind::Confirmation => "confirmation",
        }
    }

    fn session_kind(s: &str) -> Option<SessionKind> {
        match s {
            "session" => Some(SessionKind::Standard),
            "recovery" => Some(SessionKind::Recovery),
            _ => None,
        }
    }
}

/// Auth provider keeping users and tokens in the application database.
pub struct SqliteAuthProvider {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    session_ttl: Duration,
}

impl SqliteAuthProvider {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>, session_ttl: Duration) -> Self {
        Self {
            pool,
            mailer,
            session_ttl,
        }
    }

    async fn issue_token(
        &self,
        user_id: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let token = new_token();
        let now = Utc::now();
        let expires_at = now + ttl;

        sqlx::query(
            "INSERT INTO auth_tokens (token, user_id, kind, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(expires_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok((token, expires_at))
    }

    async fn open_session(&self, user_id: &str, email: &str) -> Result<Session, AppError> {
        let (access_token, expires_at) = self
            .issue_token(user_id, TokenKind::Session, self.session_ttl)
            .await?;

        Ok(Session {
            access_token,
            user_id: user_id.to_string(),
            email: email.to_string(),
            kind: SessionKind::Standard,
            expires_at,
        })
    }

    async fn fetch_session(&self, access_token: &str) -> Result<Option<(Session, bool)>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT t.user_id, t.kind, t.expires_at, u.email
               FROM auth_tokens t JOIN users u ON u.id = t.user_id
               WHERE t.token = ?"#,
        )
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.get("kind");
        let Some(kind) = TokenKind::session_kind(&kind) else {
            return Ok(None);
        };

        let expires_at: String = row.get("expires_at");
        let Some(expires_at) = parse_timestamp(&expires_at) else {
            tracing::warn!("Discarding token with unreadable expiry");
            return Ok(None);
        };

        let session = Session {
            access_token: access_token.to_string(),
            user_id: row.get("user_id"),
            email: row.get("email"),
            kind,
            expires_at,
        };
        let expired = session.is_expired(Utc::now());
        Ok(Some((session, expired)))
    }
}

#[async_trait]
impl AuthProvider for SqliteAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);

        let row = sqlx::query("SELECT id, password_hash, confirmed FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials.into());
        };

        let user_id: String = row.get("id");
        let password_hash: String = row.get("password_hash");
        let confirmed: i32 = row.get("confirmed");

        if !verify_password(password.to_string(), password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if confirmed == 0 {
            return Err(AuthError::EmailNotConfirmed.into());
        }

        self.open_session(&user_id, &email).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<PendingConfirmation, AppError> {
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword.into());
        }

        let user_id = uuid::Uuid::new_v4().to_string();
        let password_hash = hash_password(password.to_string()).await?;

        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, confirmed, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&user_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(AuthError::AlreadyRegistered.into());
            }
            Err(e) => return Err(e.into()),
        }

        let (token, _) = self
            .issue_token(
                &user_id,
                TokenKind::Confirmation,
                Duration::hours(CONFIRMATION_TTL_HOURS),
            )
            .await?;

        self.mailer
            .send(AuthMail::Confirmation {
                email: email.clone(),
                token,
            })
            .await?;

        Ok(PendingConfirmation { user_id, email })
    }

    async fn confirm_sign_up(&self, token: &str) -> Result<Session, AppError> {
        let row = sqlx::query(
            r#"SELECT t.user_id, t.expires_at, u.email
               FROM auth_tokens t JOIN users u ON u.id = t.user_id
               WHERE t.token = ? AND t.kind = ?"#,
        )
        .bind(token)
        .bind(TokenKind::Confirmation.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidToken.into());
        };

        let user_id: String = row.get("user_id");
        let email: String = row.get("email");
        let expires_at: String = row.get("expires_at");
        let live = parse_timestamp(&expires_at).is_some_and(|at| at > Utc::now());

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM auth_tokens WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        if live {
            sqlx::query("UPDATE users SET confirmed = 1 WHERE id = ?")
                .bind(&user_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        if !live {
            return Err(AuthError::InvalidToken.into());
        }

        self.open_session(&user_id, &email).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM auth_tokens WHERE token = ? AND kind IN ('session', 'recovery')")
            .bind(access_token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);

        let row = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let user_id: String = row.get("id");
        let (token, _) = self
            .issue_token(
                &user_id,
                TokenKind::Recovery,
                Duration::minutes(RECOVERY_TTL_MINUTES),
            )
            .await?;

        self.mailer
            .send(AuthMail::PasswordRecovery { email, token })
            .await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<Session, AppError> {
        let session = match self.session(access_token).await?.live() {
            Some(session) if session.kind == SessionKind::Recovery => session,
            _ => return Err(AuthError::NoActiveRecoverySession.into()),
        };

        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword.into());
        }

        let password_hash = hash_password(new_password.to_string()).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE users SET password_hash = ?, confirmed = 1 WHERE id = ?")
            .bind(&password_hash)
            .bind(&session.user_id)
            .execute(&mut *tx)
            .await?;
        // Every outstanding token dies with the old password.
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(&session.user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.open_session(&session.user_id, &session.email).await
    }

    async fn session(&self, access_token: &str) -> Result<SessionLookup, AppError> {
        let found = with_read_retry("session lookup", || self.fetch_session(access_token)).await?;

        match found {
            Some((session, false)) => Ok(SessionLookup::Live(session)),
            Some((session, true)) => {
                sqlx::query("DELETE FROM auth_tokens WHERE token = ?")
                    .bind(access_token)
                    .execute(&self.pool)
                    .await?;
                Ok(SessionLookup::Expired(session))
            }
            None => Ok(SessionLookup::Unknown),
        }
    }
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !email.contains(' '),
        None => false,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("Failed to build salt: {}", e)))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}
