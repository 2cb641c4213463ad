//! Display settings and their normalization.
//!
//! [`SettingsInput`] is the loose shape settings arrive in (config files, the
//! settings API, CLI flags). [`SettingsInput::normalize`] is the only place
//! they are validated: anything unusable is replaced by its default and
//! logged, never rejected. Code past that point works with [`Settings`] and
//! never re-checks a field.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    DEFAULT_CATEGORY, DEFAULT_DISPLAY_TEMPLATE, DEFAULT_WORDS_PER_MINUTE, LEGACY_PLACEHOLDER,
    MINUTES_PLACEHOLDER,
};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Where a placed estimate goes relative to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayPosition {
    #[default]
    Top,
    Bottom,
}

impl DisplayPosition {
    /// Parses `top` or `bottom`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for DisplayPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A display template holding exactly one `{minutes}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTemplate {
    text: String,
    /// Byte offset of the placeholder in `text`.
    slot: usize,
}

impl DisplayTemplate {
    /// Sanitizes `raw` and accepts it if it holds exactly one placeholder.
    ///
    /// Tags are stripped and whitespace collapsed. A template written with
    /// the legacy `%s` marker (and no `{minutes}`) is rewritten to use
    /// `{minutes}`.
    pub fn parse(raw: &str) -> Option<Self> {
        let stripped = TAG_RE.replace_all(raw, "");
        let mut text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

        if !text.contains(MINUTES_PLACEHOLDER) && text.matches(LEGACY_PLACEHOLDER).count() == 1 {
            text = text.replacen(LEGACY_PLACEHOLDER, MINUTES_PLACEHOLDER, 1);
        }

        if text.matches(MINUTES_PLACEHOLDER).count() != 1 {
            return None;
        }
        let slot = text.find(MINUTES_PLACEHOLDER)?;
        Some(Self { text, slot })
    }

    /// Substitutes `minutes` at the placeholder. Nothing else in the
    /// template is interpreted.
    pub fn fill(&self, minutes: usize) -> String {
        let (before, rest) = self.text.split_at(self.slot);
        let after = &rest[MINUTES_PLACEHOLDER.len()..];
        format!("{before}{minutes}{after}")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for DisplayTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_DISPLAY_TEMPLATE.to_string(),
            slot: DEFAULT_DISPLAY_TEMPLATE
                .find(MINUTES_PLACEHOLDER)
                .unwrap_or_default(),
        }
    }
}

impl Serialize for DisplayTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

/// Resolved, validated display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub words_per_minute: NonZeroUsize,
    pub display_enabled: bool,
    pub display_position: DisplayPosition,
    pub eligible_content_categories: BTreeSet<String>,
    pub display_template: DisplayTemplate,
}

impl Settings {
    pub fn is_eligible(&self, category: &str) -> bool {
        self.eligible_content_categories.contains(category)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            display_enabled: true,
            display_position: DisplayPosition::Top,
            eligible_content_categories: default_categories(),
            display_template: DisplayTemplate::default(),
        }
    }
}

fn default_categories() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_CATEGORY.to_string()])
}

/// Settings as supplied from outside. Every field is optional and loosely typed.
///
/// ```toml
/// [reading]
/// words_per_minute = 230
/// display_position = "bottom"
/// eligible_content_categories = ["post", "page"]
/// display_template = "{minutes} min read"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsInput {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_integer"
    )]
    pub words_per_minute: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_content_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
}

impl SettingsInput {
    /// Returns `self` with every field `other` sets taking precedence.
    pub fn overlay(self, other: SettingsInput) -> SettingsInput {
        SettingsInput {
            words_per_minute: other.words_per_minute.or(self.words_per_minute),
            display_enabled: other.display_enabled.or(self.display_enabled),
            display_position: other.display_position.or(self.display_position),
            eligible_content_categories: other
                .eligible_content_categories
                .or(self.eligible_content_categories),
            display_template: other.display_template.or(self.display_template),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SettingsInput::default()
    }

    /// Resolves into [`Settings`], substituting defaults for unusable values.
    pub fn normalize(self) -> Settings {
        let defaults = Settings::default();

        let words_per_minute = match self.words_per_minute {
            None => defaults.words_per_minute,
            Some(value) => usize::try_from(value)
                .ok()
                .and_then(NonZeroUsize::new)
                .unwrap_or_else(|| {
                    tracing::warn!(
                        "words_per_minute {value} is not positive, using {}",
                        defaults.words_per_minute
                    );
                    defaults.words_per_minute
                }),
        };

        let display_position = match self.display_position.as_deref() {
            None => defaults.display_position,
            Some(raw) => DisplayPosition::parse(raw).unwrap_or_else(|| {
                tracing::warn!("Unknown display_position {raw:?}, using top");
                defaults.display_position
            }),
        };

        let eligible_content_categories = match self.eligible_content_categories {
            None => defaults.eligible_content_categories,
            Some(categories) => categories
                .iter()
                .map(|category| category.trim())
                .filter(|category| !category.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let display_template = match self.display_template.as_deref() {
            None => defaults.display_template,
            Some(raw) => DisplayTemplate::parse(raw).unwrap_or_else(|| {
                tracing::warn!(
                    "display_template {raw:?} needs exactly one {MINUTES_PLACEHOLDER} placeholder, using default"
                );
                defaults.display_template
            }),
        };

        Settings {
            words_per_minute,
            display_enabled: self.display_enabled.unwrap_or(defaults.display_enabled),
            display_position,
            eligible_content_categories,
            display_template,
        }
    }
}

/// Accepts integers, floats (truncated) and numeric strings. Text that is not
/// a number becomes 0 so normalization replaces it; other types read as unset.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(n)) => Some(n),
        Some(Loose::Float(f)) => Some(f as i64),
        Some(Loose::Text(text)) => Some(text.trim().parse().unwrap_or(0)),
        Some(Loose::Other(_)) | None => None,
    })
}

impl From<&Settings> for SettingsInput {
    fn from(settings: &Settings) -> Self {
        SettingsInput {
            words_per_minute: i64::try_from(settings.words_per_minute.get()).ok(),
            display_enabled: Some(settings.display_enabled),
            display_position: Some(settings.display_position.as_str().to_string()),
            eligible_content_categories: Some(
                settings.eligible_content_categories.iter().cloned().collect(),
            ),
            display_template: Some(settings.display_template.as_str().to_string()),
        }
    }
}
