//! Terminal formatting for entries and tags.

use chrono::{DateTime, Local};
use timeline_core::{Entry, Tag};
use uuid::Uuid;

/// Characters of an id shown in listings; commands accept any unique prefix.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

fn tag_list(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t.name))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One entry as a listing block: header line, then the content indented.
pub fn entry_block(entry: &Entry, now: DateTime<Local>) -> String {
    let mut header = format!("{}  {}", short_id(entry.id), entry.formatted_date_at(now));
    if !entry.tags.is_empty() {
        header.push_str("  ");
        header.push_str(&tag_list(&entry.tags));
    }
    if entry.ai_processed {
        header.push_str("  (AI)");
    }

    let mut block = header;
    for line in entry.content.lines() {
        block.push_str("\n    ");
        block.push_str(line);
    }
    block
}

/// A registry tag with its usage count. With `color`, a truecolor swatch
/// leads the line.
pub fn tag_line(tag: &Tag, count: usize, color: bool) -> String {
    let swatch = match tag.rgb() {
        Some((r, g, b)) if color => format!("\x1b[38;2;{};{};{}m●\x1b[0m ", r, g, b),
        _ => String::new(),
    };
    format!("{}{:<16} #{}  {} 条", swatch, tag.name, tag.color_hex, count)
}

/// Find the single entry whose id starts with `prefix`.
pub fn match_entry_id(entries: &[Entry], prefix: &str) -> Result<Uuid, String> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err("entry id is empty".to_string());
    }
    let mut matches = entries
        .iter()
        .map(|e| e.id)
        .filter(|id| id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(format!("no entry matches id {}", prefix)),
        (Some(_), Some(_)) => Err(format!("id prefix {} is ambiguous", prefix)),
    }
}
