//! Data models for the timeline journal.
//!
//! Entries and tags are plain value snapshots. Mutating a clone never affects
//! the store; every change goes through the store's explicit operations.
//!
//! The JSON schema (camelCase keys, RFC 3339 timestamps) is shared by the
//! persisted `entries.json` / `tags.json` files and by exports.

use chrono::{DateTime, Datelike, Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// Current time truncated to whole seconds.
///
/// All stored timestamps are accurate to the second so that a persisted
/// entry reloads equal to its in-memory snapshot.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

// =============================================================================
// TAG
// =============================================================================

/// A short named label with a display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Identity, immutable for the tag's lifetime.
    pub id: Uuid,
    /// Display name (non-empty).
    pub name: String,
    /// 6-hex-digit RGB colour, without a leading `#`.
    #[serde(default = "default_color_hex")]
    pub color_hex: String,
}

fn default_color_hex() -> String {
    defaults::TAG_COLOR.to_string()
}

impl Tag {
    /// Create a tag with a fresh id.
    pub fn new(name: impl Into<String>, color_hex: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color_hex: color_hex.into(),
        }
    }

    /// Create a tag with the default colour.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, defaults::TAG_COLOR)
    }

    /// The built-in registry written on first start.
    pub fn builtin() -> Vec<Tag> {
        defaults::BUILTIN_TAGS
            .iter()
            .map(|(name, color)| Tag::new(*name, *color))
            .collect()
    }

    /// Parse `color_hex` into RGB components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color_hex.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some((
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }
}

// =============================================================================
// ENTRY
// =============================================================================

/// A single timestamped journal note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Identity, immutable.
    pub id: Uuid,
    /// Free text.
    pub content: String,
    /// When the entry was captured.
    pub created_at: DateTime<Utc>,
    /// When the entry was last edited (never before `created_at`).
    pub updated_at: DateTime<Utc>,
    /// Embedded tag snapshots.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// True once the entry went through automatic or manual tag assignment.
    #[serde(default)]
    pub ai_processed: bool,
    /// Structured annotation, not populated by classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedData>,
}

impl Entry {
    /// Create an entry captured now.
    pub fn new(content: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self::created_at(content, tags, now_utc())
    }

    /// Create an entry with an explicit capture time.
    pub fn created_at(content: impl Into<String>, tags: Vec<Tag>, at: DateTime<Utc>) -> Self {
        let at = at.trunc_subsecs(0);
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            created_at: at,
            updated_at: at,
            tags,
            ai_processed: false,
            extracted_data: None,
        }
    }

    /// A new snapshot with replaced content and a refreshed `updated_at`.
    pub fn edited(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            updated_at: now_utc().max(self.created_at),
            ..self.clone()
        }
    }

    /// Whether the entry holds a tag with this id.
    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// First line of content, truncated to 100 characters with an ellipsis.
    pub fn summary(&self) -> String {
        let first_line = self.content.lines().next().unwrap_or("");
        if first_line.chars().count() > defaults::SUMMARY_MAX_CHARS {
            let head: String = first_line
                .chars()
                .take(defaults::SUMMARY_MAX_CHARS)
                .collect();
            format!("{}...", head)
        } else {
            first_line.to_string()
        }
    }

    /// Human-readable capture time relative to `now` (local calendar).
    pub fn formatted_date_at(&self, now: DateTime<Local>) -> String {
        let created = self.created_at.with_timezone(&Local);
        let today = now.date_naive();
        let day = created.date_naive();

        if day == today {
            format!("今天 {}", created.format("%H:%M"))
        } else if today.pred_opt() == Some(day) {
            format!("昨天 {}", created.format("%H:%M"))
        } else if created.year() == now.year() {
            created.format("%m-%d %H:%M").to_string()
        } else {
            created.format("%Y-%m-%d %H:%M").to_string()
        }
    }
}

// =============================================================================
// EXTRACTED DATA
// =============================================================================

/// Optional structured annotation attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<Metric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A named measurement mentioned in an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

// =============================================================================
// EXPORT
// =============================================================================

/// Combined document written by an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub entries: Vec<Entry>,
    pub tags: Vec<Tag>,
}
