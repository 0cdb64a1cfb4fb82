//! Static theme registry.
//!
//! Maps a theme key to the presentation classes the public page is drawn with.

use serde::{Deserialize, Serialize};

/// Known theme identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKey {
    #[default]
    DefaultDark,
    CleanWhite,
    Galaxy,
    NeonGreen,
    SunsetGradient,
}

impl ThemeKey {
    pub const ALL: [ThemeKey; 5] = [
        ThemeKey::DefaultDark,
        ThemeKey::CleanWhite,
        ThemeKey::Galaxy,
        ThemeKey::NeonGreen,
        ThemeKey::SunsetGradient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKey::DefaultDark => "default_dark",
            ThemeKey::CleanWhite => "clean_white",
            ThemeKey::Galaxy => "galaxy",
            ThemeKey::NeonGreen => "neon_green",
            ThemeKey::SunsetGradient => "sunset_gradient",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

/// Presentation rules for one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub name: &'static str,
    pub page_background: &'static str,
    pub container_style: &'static str,
    pub button_style: &'static str,
    pub text_color: &'static str,
    pub description_style: &'static str,
}

static DEFAULT_DARK: ThemeConfig = ThemeConfig {
    name: "Default Dark",
    page_background: "bg-gray-900",
    container_style: "bg-transparent",
    button_style: "bg-surface hover:bg-lead-black text-white transition-all duration-300",
    text_color: "text-white",
    description_style: "text-gray-400",
};

static CLEAN_WHITE: ThemeConfig = ThemeConfig {
    name: "Clean White",
    page_background: "bg-gray-100",
    container_style: "bg-white shadow-xl rounded-2xl p-6",
    button_style: "bg-white border border-gray-200 text-gray-900 hover:bg-gray-50 transition-all duration-300 shadow-sm",
    text_color: "text-gray-900",
    description_style: "text-gray-600",
};

static GALAXY: ThemeConfig = ThemeConfig {
    name: "Dark Galaxy",
    page_background: "bg-[url(\"https://images.unsplash.com/photo-1534796636912-3b95b3ab5986?q=80&w=2072&auto=format&fit=crop\")] bg-cover bg-center bg-no-repeat bg-fixed",
    container_style: "bg-black/30 backdrop-blur-md border border-white/10 rounded-2xl p-6",
    button_style: "bg-white/10 backdrop-blur-sm border border-white/20 text-white hover:bg-white/20 transition-all duration-300",
    text_color: "text-white",
    description_style: "text-gray-300",
};

static NEON_GREEN: ThemeConfig = ThemeConfig {
    name: "Neon Green",
    page_background: "bg-black",
    container_style: "bg-transparent",
    button_style: "bg-[#a3e635] text-black font-bold rounded-full hover:scale-105 hover:shadow-[0_0_20px_rgba(163,230,53,0.5)] transition-all duration-300",
    text_color: "text-[#a3e635]",
    description_style: "text-gray-400",
};

static SUNSET_GRADIENT: ThemeConfig = ThemeConfig {
    name: "Sunset Gradient",
    page_background: "bg-gradient-to-br from-purple-600 to-blue-600",
    container_style: "bg-white/10 backdrop-blur-sm border border-white/20 rounded-2xl p-6",
    button_style: "border border-white text-white hover:bg-white hover:text-purple-600 transition-all duration-300",
    text_color: "text-white",
    description_style: "text-white/80",
};

/// Presentation bundle for a known key.
pub fn theme(key: ThemeKey) -> &'static ThemeConfig {
    match key {
        ThemeKey::DefaultDark => &DEFAULT_DARK,
        ThemeKey::CleanWhite => &CLEAN_WHITE,
        ThemeKey::Galaxy => &GALAXY,
        ThemeKey::NeonGreen => &NEON_GREEN,
        ThemeKey::SunsetGradient => &SUNSET_GRADIENT,
    }
}

/// Resolve a stored theme value. Unset and unrecognised keys fall back to
/// the default theme instead of failing.
pub fn resolve_theme(stored: Option<&str>) -> (ThemeKey, &'static ThemeConfig) {
    let key = stored.and_then(ThemeKey::parse).unwrap_or_default();
    (key, theme(key))
}
