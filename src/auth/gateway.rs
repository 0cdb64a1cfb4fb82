//! Session gateway: the single entry point to the auth provider.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::provider::{AuthProvider, SessionLookup};
use crate::errors::AppError;
use crate::models::{PendingConfirmation, Session, SessionEvent, SessionKind};

const EVENT_CAPACITY: usize = 64;

/// Wraps the auth provider and publishes a [`SessionEvent`] for every
/// session change. Holds no credentials of its own.
pub struct SessionGateway {
    provider: Arc<dyn AuthProvider>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionGateway {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { provider, events }
    }

    /// Receive session changes from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        self.events.send(event).ok();
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let session = self.provider.sign_in(email, password).await?;
        tracing::info!(user_id = %session.user_id, "Signed in");
        self.publish(SessionEvent::SignedIn {
            user_id: session.user_id.clone(),
        });
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<PendingConfirmation, AppError> {
        let pending = self.provider.sign_up(email, password).await?;
        tracing::info!(user_id = %pending.user_id, "Account created, awaiting confirmation");
        Ok(pending)
    }

    pub async fn confirm_sign_up(&self, token: &str) -> Result<Session, AppError> {
        let session = self.provider.confirm_sign_up(token).await?;
        tracing::info!(user_id = %session.user_id, "Account confirmed");
        self.publish(SessionEvent::SignedIn {
            user_id: session.user_id.clone(),
        });
        Ok(session)
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), AppError> {
        self.provider.sign_out(&session.access_token).await?;
        tracing::info!(user_id = %session.user_id, "Signed out");
        self.publish(SessionEvent::SignedOut {
            user_id: session.user_id.clone(),
            access_token: session.access_token.clone(),
        });
        Ok(())
    }

    /// Always succeeds so callers cannot tell registered addresses apart.
    pub async fn request_password_reset(&self, email: &str) {
        if let Err(e) = self.provider.request_password_reset(email).await {
            tracing::warn!("Password reset request failed: {}", e);
        }
    }

    pub async fn update_password(&self, session: &Session, new_password: &str) -> Result<Session, AppError> {
        if session.kind != SessionKind::Recovery {
            return Err(crate::errors::AuthError::NoActiveRecoverySession.into());
        }
        let fresh = self
            .provider
            .update_password(&session.access_token, new_password)
            .await?;
        tracing::info!(user_id = %fresh.user_id, "Password updated");
        self.publish(SessionEvent::PasswordUpdated {
            user_id: fresh.user_id.clone(),
        });
        Ok(fresh)
    }

    /// Look up the live session behind a bearer token.
    pub async fn current_session(&self, access_token: &str) -> Result<Option<Session>, AppError> {
        match self.provider.session(access_token).await? {
            SessionLookup::Live(session) => {
                if session.kind == SessionKind::Recovery {
                    self.publish(SessionEvent::PasswordRecovery {
                        user_id: session.user_id.clone(),
                    });
                }
                Ok(Some(session))
            }
            SessionLookup::Expired(session) => {
                tracing::info!(user_id = %session.user_id, "Session expired");
                self.publish(SessionEvent::Expired {
                    user_id: session.user_id,
                    access_token: session.access_token,
                });
                Ok(None)
            }
            SessionLookup::Unknown => Ok(None),
        }
    }
}
