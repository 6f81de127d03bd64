//! Centralized default constants for the timeline journal.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// TAGS
// =============================================================================

/// Colour assigned to a tag when none is given.
pub const TAG_COLOR: &str = "007AFF";

/// Palette new tags draw their colour from (uniformly at random).
pub const TAG_PALETTE: &[&str] = &[
    "007AFF", "34C759", "FF9500", "FF3B30", "AF52DE", "5AC8FA", "FFCC00", "FF2D55",
];

/// Registry seeded on first start, as `(name, colorHex)`.
pub const BUILTIN_TAGS: &[(&str, &str)] = &[
    ("开发", "007AFF"),
    ("会议", "FF9500"),
    ("文档", "34C759"),
    ("Bug修复", "FF3B30"),
    ("学习", "AF52DE"),
    ("沟通", "5AC8FA"),
];

/// Suggested tag names longer than this (in characters) are discarded.
pub const SUGGESTED_TAG_MAX_CHARS: usize = 10;

// =============================================================================
// ENTRIES
// =============================================================================

/// Maximum characters of the first content line kept in an entry summary.
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Number of entry summaries listed in a summary-format report.
pub const REPORT_SUMMARY_LIMIT: usize = 5;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// File holding the entry collection.
pub const ENTRIES_FILE: &str = "entries.json";

/// File holding the tag registry.
pub const TAGS_FILE: &str = "tags.json";

/// Directory name used under `$HOME` when no data directory is configured.
pub const DATA_DIR_NAME: &str = ".timeline";

/// Suggested file name for exports.
pub const EXPORT_FILE: &str = "mytimeline_export.json";

// =============================================================================
// INFERENCE
// =============================================================================

/// Request timeout for the chat-completion call.
pub const AI_TIMEOUT_SECS: u64 = 30;

/// Token budget for a classification response.
pub const AI_MAX_TOKENS: u32 = 100;

/// Sampling temperature for classification.
pub const AI_TEMPERATURE: f32 = 0.3;

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast buffer capacity for the event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;
