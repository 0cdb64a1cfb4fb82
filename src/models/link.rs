//! Link model and identifiers.

use serde::{Deserialize, Serialize};

/// Prefix carried by every identifier minted for a not-yet-persisted link.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Identifier of a link: either a persisted UUID or a temporary draft id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Mint a temporary identifier. Persisted ids are bare UUIDs, so the
    /// prefix alone keeps the two spaces disjoint.
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Mint an identifier for a new row.
    pub fn persisted() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LinkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An outbound link on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub title: String,
    pub url: String,
    pub order: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids_are_distinguishable() {
        let temp = LinkId::temporary();
        let real = LinkId::persisted();
        assert!(temp.is_temporary());
        assert!(!real.is_temporary());
        assert_ne!(LinkId::temporary(), temp);
    }

    #[test]
    fn test_link_wire_format() {
        let link: Link = serde_json::from_str(
            r#"{"id":"abc","title":"Site","url":"https://example.com","order":2}"#,
        )
        .unwrap();
        assert_eq!(link.id.as_str(), "abc");
        assert!(link.visible);
        assert_eq!(link.order, 2);
    }
}
