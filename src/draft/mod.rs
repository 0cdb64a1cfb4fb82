//! In-memory editing drafts.
//!
//! A [`Draft`] is a working copy of one user's profile and links. Edits are
//! pure and local until [`EditSession::save`] reconciles them with the store.

mod registry;
mod session;

pub use registry::DraftRegistry;
pub use session::EditSession;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Link, LinkId, Profile};

/// Working copy of a profile and its ordered links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub profile: Profile,
    pub links: Vec<Link>,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileField {
    Username(String),
    Role(String),
    AvatarUrl(String),
    Theme(String),
}

/// Editable link fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkField {
    Title(String),
    Url(String),
    Visible(bool),
}

/// One field update applied to a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Profile(ProfileField),
    Link { id: LinkId, field: LinkField },
}

impl DraftEdit {
    /// Build an edit from its loose wire form: an entity kind, an optional
    /// link id, a field name and a JSON value.
    pub fn parse(
        entity: &str,
        id: Option<LinkId>,
        field: &str,
        value: serde_json::Value,
    ) -> Result<Self, AppError> {
        match entity {
            "profile" => {
                let value = expect_string(field, value)?;
                let field = match field {
                    "username" => ProfileField::Username(value),
                    "role" => ProfileField::Role(value),
                    "avatarUrl" => ProfileField::AvatarUrl(value),
                    "theme" => ProfileField::Theme(value),
                    other => {
                        return Err(AppError::Validation(format!(
                            "Unknown profile field '{}'",
                            other
                        )))
                    }
                };
                Ok(DraftEdit::Profile(field))
            }
            "link" => {
                let id = id.ok_or_else(|| {
                    AppError::Validation("Link edits require an id".to_string())
                })?;
                let field = match field {
                    "title" => LinkField::Title(expect_string(field, value)?),
                    "url" => LinkField::Url(expect_string(field, value)?),
                    "visible" => LinkField::Visible(value.as_bool().ok_or_else(|| {
                        AppError::Validation("Field 'visible' must be a boolean".to_string())
                    })?),
                    other => {
                        return Err(AppError::Validation(format!(
                            "Unknown link field '{}'",
                            other
                        )))
                    }
                };
                Ok(DraftEdit::Link { id, field })
            }
            other => Err(AppError::Validation(format!(
                "Unknown entity kind '{}'",
                other
            ))),
        }
    }
}

fn expect_string(field: &str, value: serde_json::Value) -> Result<String, AppError> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        _ => Err(AppError::Validation(format!(
            "Field '{}' must be a string",
            field
        ))),
    }
}

impl Draft {
    pub fn new(profile: Profile, links: Vec<Link>) -> Self {
        Self { profile, links }
    }

    /// Append a link under a fresh temporary id. Blank titles or urls are
    /// ignored and yield `None`.
    pub fn add_link(&mut self, title: &str, url: &str) -> Option<&Link> {
        let (title, url) = (title.trim(), url.trim());
        if title.is_empty() || url.is_empty() {
            return None;
        }

        self.links.push(Link {
            id: LinkId::temporary(),
            title: title.to_string(),
            url: url.to_string(),
            order: self.links.len() as i64,
            visible: true,
        });
        self.links.last()
    }

    /// Apply a single field edit. Values are taken as given; urls are not
    /// validated.
    pub fn apply(&mut self, edit: DraftEdit) -> Result<(), AppError> {
        match edit {
            DraftEdit::Profile(field) => {
                let profile = &mut self.profile;
                match field {
                    ProfileField::Username(v) => profile.username = v,
                    ProfileField::Role(v) => profile.role = Some(v),
                    ProfileField::AvatarUrl(v) => profile.avatar_url = Some(v),
                    ProfileField::Theme(v) => profile.theme = Some(v),
                }
            }
            DraftEdit::Link { id, field } => {
                let link = self
                    .links
                    .iter_mut()
                    .find(|l| l.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Link '{}' is not in the draft", id)))?;
                match field {
                    LinkField::Title(v) => link.title = v,
                    LinkField::Url(v) => link.url = v,
                    LinkField::Visible(v) => link.visible = v,
                }
            }
        }
        Ok(())
    }

    /// Move a link to a new position. Indices past the end clamp to the end.
    pub fn move_link(&mut self, id: &LinkId, to_index: usize) -> Result<(), AppError> {
        let from = self
            .position(id)
            .ok_or_else(|| AppError::NotFound(format!("Link '{}' is not in the draft", id)))?;

        let link = self.links.remove(from);
        let to = to_index.min(self.links.len());
        self.links.insert(to, link);
        self.renumber();
        Ok(())
    }

    /// Drop a link from the sequence. Returns whether it was present.
    pub(crate) fn drop_link(&mut self, id: &LinkId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.links.remove(index);
                self.renumber();
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| &l.id == id)
    }

    fn renumber(&mut self) {
        for (position, link) in self.links.iter_mut().enumerate() {
            link.order = position as i64;
        }
    }
}
