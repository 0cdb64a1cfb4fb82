//! Open drafts, keyed by the access token that owns them.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};

use super::EditSession;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::SessionEvent;

struct OpenDraft {
    user_id: String,
    session: Arc<Mutex<EditSession>>,
}

/// Holds at most one draft per access token. Each draft sits behind its own
/// async mutex so a session's edits apply one at a time.
#[derive(Default)]
pub struct DraftRegistry {
    drafts: DashMap<String, OpenDraft>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open draft for a token, if any.
    pub fn get(&self, token: &str) -> Option<Arc<Mutex<EditSession>>> {
        self.drafts.get(token).map(|entry| entry.session.clone())
    }

    /// Start a fresh draft from the store, replacing any open one.
    pub async fn open(
        &self,
        repo: Arc<Repository>,
        token: &str,
        user_id: &str,
    ) -> Result<Arc<Mutex<EditSession>>, AppError> {
        let session = Arc::new(Mutex::new(EditSession::start(repo, user_id).await?));
        self.drafts.insert(
            token.to_string(),
            OpenDraft {
                user_id: user_id.to_string(),
                session: session.clone(),
            },
        );
        tracing::debug!(user_id, open = self.drafts.len(), "Draft opened");
        Ok(session)
    }

    /// The open draft for a token, starting one when none exists. When two
    /// callers race, the first draft stored wins and both get it.
    pub async fn get_or_open(
        &self,
        repo: Arc<Repository>,
        token: &str,
        user_id: &str,
    ) -> Result<Arc<Mutex<EditSession>>, AppError> {
        if let Some(session) = self.get(token) {
            return Ok(session);
        }

        let started = EditSession::start(repo, user_id).await?;
        let session = match self.drafts.entry(token.to_string()) {
            Entry::Occupied(existing) => existing.get().session.clone(),
            Entry::Vacant(slot) => {
                let session = Arc::new(Mutex::new(started));
                slot.insert(OpenDraft {
                    user_id: user_id.to_string(),
                    session: session.clone(),
                });
                tracing::debug!(user_id, "Draft opened");
                session
            }
        };
        Ok(session)
    }

    /// Drop the draft for a token. Returns whether one was open.
    pub fn discard(&self, token: &str) -> bool {
        self.drafts.remove(token).is_some()
    }

    /// Drop every draft a user has open. Returns how many were dropped.
    pub fn discard_user(&self, user_id: &str) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|_, entry| entry.user_id != user_id);
        before.saturating_sub(self.drafts.len())
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Discard drafts as their sessions end. Runs until the gateway is gone.
    pub fn watch(self: Arc<Self>, mut events: broadcast::Receiver<SessionEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Draft registry missed session events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn handle(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SignedOut { access_token, .. } => {
                if self.discard(access_token) {
                    tracing::debug!("Draft discarded on sign-out");
                }
            }
            SessionEvent::Expired { access_token, .. } => {
                if self.discard(access_token) {
                    tracing::debug!("Draft discarded on session expiry");
                }
            }
            SessionEvent::PasswordUpdated { user_id } => {
                let dropped = self.discard_user(user_id);
                if dropped > 0 {
                    tracing::debug!(user_id = %user_id, dropped, "Drafts discarded after password change");
                }
            }
            SessionEvent::SignedIn { .. } | SessionEvent::PasswordRecovery { .. } => {}
        }
    }
}
