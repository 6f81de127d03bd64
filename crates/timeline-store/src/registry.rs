//! Tag registry operations.

use rand::seq::SliceRandom;
use timeline_core::defaults::{TAG_COLOR, TAG_PALETTE};
use timeline_core::{Tag, TimelineEvent};
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::Store;

/// Pick a colour for a freshly minted tag.
pub fn random_palette_color() -> String {
    TAG_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TAG_COLOR)
        .to_string()
}

impl Store {
    /// Register a tag. Rejected when the name is blank or a registry tag
    /// already has exactly this name.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if tag.name.trim().is_empty() {
            debug!(subsystem = "store", op = "add_tag", "Blank name, rejected");
            return false;
        }
        if self.tags.iter().any(|t| t.name == tag.name) {
            debug!(subsystem = "store", op = "add_tag", tag_name = %tag.name, "Duplicate name, rejected");
            return false;
        }
        let tag_id = tag.id;
        let name = tag.name.clone();
        self.tags.push(tag);
        self.persist_tags();
        info!(subsystem = "store", op = "add_tag", tag_id = %tag_id, tag_name = %name, "Tag registered");
        self.changed(TimelineEvent::TagAdded { tag_id, name });
        true
    }

    /// Registry tag with exactly this name.
    pub fn find_tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Registry tag with this id.
    pub fn find_tag(&self, tag_id: Uuid) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == tag_id)
    }

    /// Return the registry tag named `name`, registering a new one with a
    /// palette colour when none exists. `None` for a blank name.
    pub fn resolve_tag(&mut self, name: &str) -> Option<Tag> {
        if let Some(tag) = self.find_tag_by_name(name) {
            return Some(tag.clone());
        }
        let tag = Tag::new(name, random_palette_color());
        self.add_tag(tag.clone()).then_some(tag)
    }

    /// Whether the registry or any entry knows `tag_id`.
    fn knows_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id) || self.entries.iter().any(|e| e.has_tag(tag_id))
    }

    /// Rename and recolour a tag everywhere.
    ///
    /// Rewrites every embedded copy and the registry record, persists both
    /// files and returns the number of entries touched. A blank name or an
    /// unknown id changes nothing.
    pub fn update_tag(&mut self, tag_id: Uuid, new_name: &str, new_color: &str) -> usize {
        if new_name.trim().is_empty() {
            debug!(subsystem = "store", op = "update_tag", tag_id = %tag_id, "Blank name, ignored");
            return 0;
        }
        if !self.knows_tag(tag_id) {
            debug!(subsystem = "store", op = "update_tag", tag_id = %tag_id, "Unknown tag, ignored");
            return 0;
        }
        let mut touched = 0;
        for entry in &mut self.entries {
            let mut hit = false;
            for tag in entry.tags.iter_mut().filter(|t| t.id == tag_id) {
                tag.name = new_name.to_string();
                tag.color_hex = new_color.to_string();
                hit = true;
            }
            if hit {
                touched += 1;
            }
        }
        for tag in self.tags.iter_mut().filter(|t| t.id == tag_id) {
            tag.name = new_name.to_string();
            tag.color_hex = new_color.to_string();
        }
        self.persist_entries();
        self.persist_tags();

        info!(
            subsystem = "store",
            op = "update_tag",
            tag_id = %tag_id,
            tag_name = %new_name,
            result_count = touched,
            "Tag updated"
        );
        self.changed(TimelineEvent::TagUpdated {
            tag_id,
            name: new_name.to_string(),
            entries_touched: touched,
        });
        touched
    }

    /// Delete a tag.
    ///
    /// With `cascade_delete_entries`, every entry holding the tag is removed;
    /// otherwise the tag is stripped from those entries. The registry record
    /// goes in both cases. Returns false for an unknown id, which changes
    /// nothing.
    pub fn delete_tag(&mut self, tag_id: Uuid, cascade_delete_entries: bool) -> bool {
        if !self.knows_tag(tag_id) {
            debug!(subsystem = "store", op = "delete_tag", tag_id = %tag_id, "Unknown tag, ignored");
            return false;
        }
        let affected = if cascade_delete_entries {
            let before = self.entries.len();
            self.entries.retain(|e| !e.has_tag(tag_id));
            before - self.entries.len()
        } else {
            let mut stripped = 0;
            for entry in &mut self.entries {
                let before = entry.tags.len();
                entry.tags.retain(|t| t.id != tag_id);
                if entry.tags.len() != before {
                    stripped += 1;
                }
            }
            stripped
        };
        self.tags.retain(|t| t.id != tag_id);
        self.persist_entries();
        self.persist_tags();

        info!(
            subsystem = "store",
            op = "delete_tag",
            tag_id = %tag_id,
            cascade = cascade_delete_entries,
            result_count = affected,
            "Tag deleted"
        );
        self.changed(TimelineEvent::TagDeleted {
            tag_id,
            cascade: cascade_delete_entries,
        });
        true
    }
}
