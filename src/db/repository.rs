//! Database repository for profile and link operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::with_read_retry;
use crate::errors::AppError;
use crate::models::{validate_username, Link, LinkId, Profile};

/// Database repository for all profile/link data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== OWNER READS ====================

    /// Load the caller's own profile and every link, hidden ones included.
    /// A user who never saved gets an empty profile and no links.
    pub async fn load_own_profile_and_links(
        &self,
        user_id: &str,
    ) -> Result<(Profile, Vec<Link>), AppError> {
        let (profile, links) =
            with_read_retry("load own profile", || self.fetch_own(user_id)).await?;

        Ok((profile.unwrap_or_else(|| Profile::empty(user_id)), links))
    }

    async fn fetch_own(&self, user_id: &str) -> Result<(Option<Profile>, Vec<Link>), sqlx::Error> {
        let profile = sqlx::query(
            "SELECT id, username, role, avatar_url, theme, updated_at FROM profiles WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(profile_from_row);

        let links = self.fetch_links(user_id, false).await?;
        Ok((profile, links))
    }

    // ==================== PUBLIC READS ====================

    /// Load a profile by its exact username together with its visible links.
    pub async fn load_public_profile_and_links(
        &self,
        username: &str,
    ) -> Result<(Profile, Vec<Link>), AppError> {
        with_read_retry("load public profile", || self.fetch_public(username))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", username)))
    }

    async fn fetch_public(&self, username: &str) -> Result<Option<(Profile, Vec<Link>)>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, username, role, avatar_url, theme, updated_at FROM profiles WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(profile) = row.as_ref().map(profile_from_row) else {
            return Ok(None);
        };

        let links = self.fetch_links(&profile.user_id, true).await?;
        Ok(Some((profile, links)))
    }

    async fn fetch_links(&self, user_id: &str, visible_only: bool) -> Result<Vec<Link>, sqlx::Error> {
        let sql = if visible_only {
            "SELECT id, title, url, sort_order, visible FROM links WHERE user_id = ? AND visible = 1 ORDER BY sort_order, created_at, rowid"
        } else {
            "SELECT id, title, url, sort_order, visible FROM links WHERE user_id = ? ORDER BY sort_order, created_at, rowid"
        };

        let rows = sqlx::query(sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(link_from_row).collect())
    }

    // ==================== WRITES ====================

    /// Insert or update the profile keyed by its owner, stamping `updated_at`.
    pub async fn save_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        let mut conn = self.pool.acquire().await?;
        upsert_profile(&mut conn, profile).await
    }

    /// Persist a draft link sequence and return the owner's canonical links.
    ///
    /// Temporary ids are inserted under fresh server ids, persisted ids are
    /// updated in place, and every draft entry gets `order` equal to its
    /// position. Rows the owner has but the draft lacks are left alone; a
    /// persisted id that no longer exists is skipped rather than recreated.
    pub async fn reconcile_links(&self, owner_id: &str, draft: &[Link]) -> Result<Vec<Link>, AppError> {
        let mut tx = self.pool.begin().await?;
        write_links(&mut tx, owner_id, draft).await?;
        tx.commit().await?;

        Ok(self.fetch_links(owner_id, false).await?)
    }

    /// Save a whole draft in one transaction: the profile and its links land
    /// together or not at all.
    pub async fn save_draft(&self, profile: &Profile, links: &[Link]) -> Result<(Profile, Vec<Link>), AppError> {
        let mut tx = self.pool.begin().await?;
        let saved = upsert_profile(&mut tx, profile).await?;
        write_links(&mut tx, &profile.user_id, links).await?;
        tx.commit().await?;

        let links = self.fetch_links(&profile.user_id, false).await?;
        Ok((saved, links))
    }

    /// Delete one of the owner's links. Deleting a missing id is not an error.
    pub async fn delete_link(&self, owner_id: &str, link_id: &LinkId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = ? AND user_id = ?")
            .bind(link_id.as_str())
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(%link_id, "Link already absent");
        }

        Ok(())
    }
}

// ==================== WRITE HELPERS ====================

async fn upsert_profile(conn: &mut SqliteConnection, profile: &Profile) -> Result<Profile, AppError> {
    validate_username(&profile.username).map_err(AppError::Validation)?;

    let now = Utc::now().to_rfc3339();
    let role = non_blank(&profile.role);
    let avatar_url = non_blank(&profile.avatar_url);
    let theme = non_blank(&profile.theme);

    let result = sqlx::query(
        r#"INSERT INTO profiles (id, username, role, avatar_url, theme, updated_at)
           VALUES (?, ?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               username = excluded.username,
               role = excluded.role,
               avatar_url = excluded.avatar_url,
               theme = excluded.theme,
               updated_at = excluded.updated_at"#,
    )
    .bind(&profile.user_id)
    .bind(&profile.username)
    .bind(&role)
    .bind(&avatar_url)
    .bind(&theme)
    .bind(&now)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::UsernameTaken(profile.username.clone()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::debug!(user_id = %profile.user_id, username = %profile.username, "Profile saved");

    Ok(Profile {
        user_id: profile.user_id.clone(),
        username: profile.username.clone(),
        role,
        avatar_url,
        theme,
        updated_at: Some(now),
    })
}

async fn write_links(conn: &mut SqliteConnection, owner_id: &str, draft: &[Link]) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0usize;
    let mut updated = 0usize;

    for (position, link) in draft.iter().enumerate() {
        let order = position as i64;

        if link.id.is_temporary() {
            sqlx::query(
                "INSERT INTO links (id, user_id, title, url, sort_order, visible, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(LinkId::persisted().as_str())
            .bind(owner_id)
            .bind(&link.title)
            .bind(&link.url)
            .bind(order)
            .bind(link.visible as i32)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            inserted += 1;
        } else {
            let result = sqlx::query(
                "UPDATE links SET title = ?, url = ?, sort_order = ?, visible = ? WHERE id = ? AND user_id = ?",
            )
            .bind(&link.title)
            .bind(&link.url)
            .bind(order)
            .bind(link.visible as i32)
            .bind(link.id.as_str())
            .bind(owner_id)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(link_id = %link.id, "Skipping link that no longer exists");
            } else {
                updated += 1;
            }
        }
    }

    tracing::debug!(owner_id, inserted, updated, "Links reconciled");
    Ok(())
}

// Helper functions for row conversion

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
    Profile {
        user_id: row.get("id"),
        username: row.get("username"),
        role: row.get("role"),
        avatar_url: row.get("avatar_url"),
        theme: row.get("theme"),
        updated_at: row.get("updated_at"),
    }
}

fn link_from_row(row: &sqlx::sqlite::SqliteRow) -> Link {
    let id: String = row.get("id");
    let visible: i32 = row.get("visible");
    Link {
        id: LinkId::from(id),
        title: row.get("title"),
        url: row.get("url"),
        order: row.get("sort_order"),
        visible: visible != 0,
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
}
