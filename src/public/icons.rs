//! Link icon classification.

use serde::Serialize;

/// Icon drawn next to a public link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Instagram,
    LinkedIn,
    Twitter,
    GitHub,
    Facebook,
    YouTube,
    Mail,
    External,
}

/// Ordered rules; the first rule with a keyword in the url or the title wins.
const ICON_RULES: &[(IconKind, &[&str])] = &[
    (IconKind::Instagram, &["instagram"]),
    (IconKind::LinkedIn, &["linkedin"]),
    // A bare "x" would match almost anything.
    (IconKind::Twitter, &["twitter", "x.com"]),
    (IconKind::GitHub, &["github"]),
    (IconKind::Facebook, &["facebook"]),
    (IconKind::YouTube, &["youtube"]),
    (IconKind::Mail, &["mailto:", "mail", "email", "contato"]),
];

/// Pick the icon for a link from its url and title, case-insensitively.
pub fn classify_link_icon(url: &str, title: &str) -> IconKind {
    let url = url.to_lowercase();
    let title = title.to_lowercase();

    ICON_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| url.contains(k) || title.contains(k))
        })
        .map(|(kind, _)| *kind)
        .unwrap_or(IconKind::External)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_breaks_ties() {
        assert_eq!(
            classify_link_icon("https://github.com", "Contact me"),
            IconKind::GitHub
        );
        assert_eq!(
            classify_link_icon("mailto:a@b.com", "My GitHub"),
            IconKind::GitHub
        );
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        assert_eq!(
            classify_link_icon("https://www.YouTube.com/@ana", "Videos"),
            IconKind::YouTube
        );
        assert_eq!(classify_link_icon("https://site.dev", "LinkedIn"), IconKind::LinkedIn);
    }

    #[test]
    fn test_twitter_keywords() {
        assert_eq!(classify_link_icon("https://x.com/ana", "Posts"), IconKind::Twitter);
        assert_eq!(classify_link_icon("https://example.com", "twitter"), IconKind::Twitter);
        // Plain "x" in a url is not enough.
        assert_eq!(classify_link_icon("https://example.com/x", "Box"), IconKind::External);
    }

    #[test]
    fn test_mail_keywords() {
        assert_eq!(classify_link_icon("mailto:a@b.com", "Write"), IconKind::Mail);
        assert_eq!(classify_link_icon("https://a.com", "Contato"), IconKind::Mail);
        assert_eq!(classify_link_icon("https://a.com", "Email me"), IconKind::Mail);
    }

    #[test]
    fn test_unmatched_is_external() {
        assert_eq!(classify_link_icon("https://blog.dev", "Blog"), IconKind::External);
    }
}
