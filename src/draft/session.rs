//! One user's editing session.

use std::sync::Arc;

use super::{Draft, DraftEdit};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Link, LinkId};

/// A draft bound to its owner and the store it saves to.
pub struct EditSession {
    user_id: String,
    repo: Arc<Repository>,
    draft: Draft,
}

impl EditSession {
    /// Begin editing from the owner's persisted profile and links.
    pub async fn start(repo: Arc<Repository>, user_id: &str) -> Result<Self, AppError> {
        let (profile, links) = repo.load_own_profile_and_links(user_id).await?;
        Ok(Self {
            user_id: user_id.to_string(),
            repo,
            draft: Draft::new(profile, links),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn add_link(&mut self, title: &str, url: &str) -> Option<Link> {
        self.draft.add_link(title, url).cloned()
    }

    pub fn apply(&mut self, edit: DraftEdit) -> Result<(), AppError> {
        self.draft.apply(edit)
    }

    pub fn move_link(&mut self, id: &LinkId, to_index: usize) -> Result<(), AppError> {
        self.draft.move_link(id, to_index)
    }

    /// Remove a link. Temporary links vanish locally; persisted links are
    /// deleted from the store first and only leave the draft on success.
    pub async fn remove_link(&mut self, id: &LinkId) -> Result<(), AppError> {
        if !id.is_temporary() {
            self.repo.delete_link(&self.user_id, id).await?;
        }
        self.draft.drop_link(id);
        Ok(())
    }

    /// Persist the profile and links together. On success the draft becomes
    /// the canonical state the store returned; on failure nothing is written.
    pub async fn save(&mut self) -> Result<&Draft, AppError> {
        let mut profile = self.draft.profile.clone();
        profile.user_id = self.user_id.clone();

        let (saved, links) = self.repo.save_draft(&profile, &self.draft.links).await?;

        tracing::info!(
            user_id = %self.user_id,
            links = links.len(),
            "Draft saved"
        );

        self.draft = Draft::new(saved, links);
        Ok(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::draft::ProfileField;
    use tempfile::TempDir;

    async fn repo() -> (Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("draft.sqlite"))
            .await
            .expect("Failed to init DB");
        (Arc::new(Repository::new(pool)), temp_dir)
    }

    async fn named_session(repo: &Arc<Repository>, user_id: &str, username: &str) -> EditSession {
        let mut session = EditSession::start(repo.clone(), user_id).await.unwrap();
        session
            .apply(DraftEdit::Profile(ProfileField::Username(username.into())))
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_new_user_starts_with_empty_draft() {
        let (repo, _dir) = repo().await;
        let session = EditSession::start(repo, "user-1").await.unwrap();

        assert_eq!(session.user_id(), "user-1");
        assert_eq!(session.draft().profile.username, "");
        assert!(session.draft().links.is_empty());
    }

    #[tokio::test]
    async fn test_save_round_trip_replaces_temporary_ids() {
        let (repo, _dir) = repo().await;
        let mut session = named_session(&repo, "user-1", "ana").await;
        session.add_link("GitHub", "https://github.com/ana");

        let saved = session.save().await.unwrap().clone();

        assert_eq!(saved.links.len(), 1);
        let link = &saved.links[0];
        assert!(!link.id.is_temporary());
        assert_eq!(link.title, "GitHub");
        assert_eq!(link.url, "https://github.com/ana");
        assert_eq!(link.order, 0);
        assert!(saved.profile.is_persisted());

        // A second save of the same draft creates nothing new.
        let again = session.save().await.unwrap().clone();
        assert_eq!(again.links, saved.links);
    }

    #[tokio::test]
    async fn test_save_preserves_draft_order() {
        let (repo, _dir) = repo().await;
        let mut session = named_session(&repo, "user-1", "ana").await;
        session.add_link("A", "https://a.com");
        session.add_link("B", "https://b.com");
        session.add_link("C", "https://c.com");
        let b = session.draft().links[1].id.clone();
        session.move_link(&b, 0).unwrap();

        let saved = session.save().await.unwrap();
        let titles: Vec<&str> = saved.links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);

        let (_, stored) = repo.load_own_profile_and_links("user-1").await.unwrap();
        let orders: Vec<i64> = stored.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_remove_temporary_link_is_local() {
        let (repo, _dir) = repo().await;
        let mut session = named_session(&repo, "user-1", "ana").await;
        let id = session.add_link("A", "https://a.com").unwrap().id;

        session.remove_link(&id).await.unwrap();
        assert!(session.draft().links.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_save_is_idempotent() {
        let (repo, _dir) = repo().await;
        let mut session = named_session(&repo, "user-1", "ana").await;
        session.add_link("A", "https://a.com");
        session.add_link("B", "https://b.com");
        let persisted = session.save().await.unwrap().links[0].id.clone();

        session.remove_link(&persisted).await.unwrap();
        session.remove_link(&persisted).await.unwrap();
        let saved = session.save().await.unwrap();

        assert_eq!(saved.links.len(), 1);
        assert_eq!(saved.links[0].title, "B");
        assert!(saved.links.iter().all(|l| l.id != persisted));
    }

    #[tokio::test]
    async fn test_failed_profile_save_keeps_draft() {
        let (repo, _dir) = repo().await;
        named_session(&repo, "user-1", "ana").await.save().await.unwrap();

        let mut other = named_session(&repo, "user-2", "ana").await;
        other.add_link("A", "https://a.com");
        let err = other.save().await.unwrap_err();

        assert!(matches!(err, AppError::UsernameTaken(_)));
        assert!(other.draft().links[0].id.is_temporary());
    }

    #[tokio::test]
    async fn test_failed_link_write_saves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("draft.sqlite"))
            .await
            .expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        let mut session = named_session(&repo, "user-1", "ana").await;
        session.add_link("A", "https://a.com");
        sqlx::query("DROP TABLE links").execute(&pool).await.unwrap();

        assert!(session.save().await.is_err());
        assert!(session.draft().links[0].id.is_temporary());

        let row = sqlx::query("SELECT id FROM profiles WHERE username = ?")
            .bind("ana")
            .fetch_optional(&pool)
            .await
            .unwrap();
        assert!(row.is_none());
    }
}
