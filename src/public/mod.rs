//! Public profile resolution.
//!
//! Turns a username into everything the public page needs: profile fields,
//! the applied theme and the visible links with their icons.

mod icons;

pub use icons::{classify_link_icon, IconKind};

use serde::Serialize;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::LinkId;
use crate::themes::{resolve_theme, ThemeConfig, ThemeKey};

/// A visible link as drawn on the public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLink {
    pub id: LinkId,
    pub title: String,
    pub url: String,
    pub icon: IconKind,
}

/// Everything needed to draw one public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// The theme actually applied, after fallback.
    pub theme_key: ThemeKey,
    pub theme: &'static ThemeConfig,
    pub links: Vec<RenderedLink>,
}

/// Resolve a username to its render model. Unknown usernames are
/// `NotFound`, never a service failure.
pub async fn resolve(repo: &Repository, username: &str) -> Result<RenderModel, AppError> {
    let (profile, links) = repo.load_public_profile_and_links(username).await?;
    let (theme_key, theme) = resolve_theme(profile.theme.as_deref());

    let links = links
        .into_iter()
        .filter(|link| link.visible)
        .map(|link| RenderedLink {
            icon: classify_link_icon(&link.url, &link.title),
            id: link.id,
            title: link.title,
            url: link.url,
        })
        .collect();

    Ok(RenderModel {
        username: profile.username,
        role: profile.role,
        avatar_url: profile.avatar_url,
        theme_key,
        theme,
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{Link, Profile};
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("public.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn draft_link(title: &str, url: &str, visible: bool) -> Link {
        Link {
            id: LinkId::temporary(),
            title: title.to_string(),
            url: url.to_string(),
            order: 0,
            visible,
        }
    }

    async fn publish(repo: &Repository, username: &str, theme: Option<&str>, links: &[Link]) {
        let mut profile = Profile::empty("user-1");
        profile.username = username.to_string();
        profile.role = Some("Engineer".to_string());
        profile.theme = theme.map(str::to_string);
        repo.save_profile(&profile).await.unwrap();
        repo.reconcile_links("user-1", links).await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_builds_render_model() {
        let (repo, _dir) = repo().await;
        publish(
            &repo,
            "ana",
            Some("galaxy"),
            &[
                draft_link("Code", "https://github.com/ana", true),
                draft_link("Secret", "https://hidden.dev", false),
                draft_link("Write me", "mailto:ana@b.com", true),
            ],
        )
        .await;

        let model = resolve(&repo, "ana").await.unwrap();

        assert_eq!(model.username, "ana");
        assert_eq!(model.role.as_deref(), Some("Engineer"));
        assert_eq!(model.theme_key, ThemeKey::Galaxy);
        let icons: Vec<IconKind> = model.links.iter().map(|l| l.icon).collect();
        assert_eq!(icons, vec![IconKind::GitHub, IconKind::Mail]);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let (repo, _dir) = repo().await;
        publish(&repo, "ana", None, &[draft_link("A", "https://a.com", true)]).await;

        let first = resolve(&repo, "ana").await.unwrap();
        let second = resolve(&repo, "ana").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_theme_uses_default() {
        let (repo, _dir) = repo().await;
        publish(&repo, "ana", Some("nonexistent_key"), &[]).await;

        let model = resolve(&repo, "ana").await.unwrap();
        assert_eq!(model.theme_key, ThemeKey::DefaultDark);
        assert_eq!(model.theme, crate::themes::theme(ThemeKey::DefaultDark));
    }

    #[tokio::test]
    async fn test_unknown_username_is_not_found() {
        let (repo, _dir) = repo().await;
        let err = resolve(&repo, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
