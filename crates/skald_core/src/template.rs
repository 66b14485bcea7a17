//! Message-shaping value types carried by a connection.
//!
//! These types are persisted verbatim and consumed by the out-of-scope
//! rendering pipeline; the provisioning service only copies and stores them.

use serde::{Deserialize, Serialize};

/// A Discord embed attached to delivered messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title.
    pub title: Option<String>,
    /// Embed body text.
    pub description: Option<String>,
    /// URL the title links to.
    pub url: Option<String>,
    /// Decimal color.
    pub color: Option<u32>,
    /// Footer text.
    pub footer_text: Option<String>,
    /// Author name.
    pub author_name: Option<String>,
    /// Thumbnail image URL.
    pub thumbnail_url: Option<String>,
    /// Large image URL.
    pub image_url: Option<String>,
    /// Name/value field pairs.
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

/// A single name/value pair inside an embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Render inline with neighboring fields.
    #[serde(default)]
    pub inline: bool,
}

/// Article filter expression, owned and validated by the external filter
/// validator. Opaque to the provisioning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression(pub serde_json::Value);

/// Rich-message payload, owned and validated by the external payload
/// validator. Only the *sanitized* value returned by the validator is ever
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichPayload(pub serde_json::Value);

/// Options controlling how long messages are split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Character(s) to split on.
    pub split_char: Option<String>,
    /// Text appended to every chunk but the last.
    pub append_char: Option<String>,
    /// Text prepended to every chunk but the first.
    pub prepend_char: Option<String>,
}

/// Mentions applied to delivered messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mentions {
    /// Users or roles to mention.
    #[serde(default)]
    pub targets: Vec<MentionTarget>,
}

/// A single user or role mention, optionally gated by filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionTarget {
    /// Discord id of the user or role.
    pub id: String,
    /// `"user"` or `"role"`.
    pub kind: String,
    /// Only mention when the article matches these filters.
    pub filters: Option<FilterExpression>,
}

/// A per-connection delivery rate limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRateLimit {
    /// Maximum articles delivered within the window.
    pub limit: u32,
    /// Window length in seconds.
    pub time_window_seconds: u32,
}

/// A named placeholder computed from article fields through a step pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPlaceholder {
    /// Placeholder id referenced from templates.
    pub id: String,
    /// Name shown in the control panel.
    pub reference_name: String,
    /// Article field the pipeline starts from.
    pub source_placeholder: String,
    /// Transformation steps applied in order.
    #[serde(default)]
    pub steps: Vec<CustomPlaceholderStep>,
}

/// One transformation step of a custom placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPlaceholderStep {
    /// Step id.
    pub id: String,
    /// Regex searched for in the current value.
    pub regex_search: Option<String>,
    /// Replacement for regex matches.
    pub replacement_string: Option<String>,
}

impl CustomPlaceholderStep {
    /// Whether the step carries nothing beyond its id.
    ///
    /// Persisting such a step would wipe the stored step on merge, so the
    /// service rejects it before writing.
    pub fn is_bare_id(&self) -> bool {
        self.regex_search.is_none() && self.replacement_string.is_none()
    }
}

/// Truncation limit for a single placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderLimit {
    /// Placeholder the limit applies to.
    pub placeholder: String,
    /// Maximum character count.
    pub characters_to_keep: u32,
    /// Text appended when truncated.
    pub append_string: Option<String>,
}

/// A row of message components (buttons).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRow {
    /// Row id.
    pub id: String,
    /// Buttons in this row.
    #[serde(default)]
    pub components: Vec<ComponentButton>,
}

/// A link button inside a component row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentButton {
    /// Button label.
    pub label: String,
    /// URL the button opens.
    pub url: String,
}

/// Text formatter toggles applied before delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatterOptions {
    /// Render HTML tables as monospace blocks.
    #[serde(default)]
    pub format_tables: bool,
    /// Drop images from article content.
    #[serde(default)]
    pub strip_images: bool,
    /// Suppress Discord link previews for image links.
    #[serde(default)]
    pub disable_image_link_previews: bool,
    /// Collapse consecutive newlines.
    #[serde(default)]
    pub ignore_new_lines: bool,
}

/// Reason a connection was disabled by the system or its owner.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisabledCode {
    /// Disabled manually by the feed owner.
    Manual,
    /// Discord rejected deliveries with a permission error.
    MissingPermissions,
    /// The bound webhook or channel no longer exists.
    MissingMedium,
    /// The rendered message was rejected as malformed.
    BadFormat,
    /// The owner exceeded their connection entitlement.
    NotPaying,
}
