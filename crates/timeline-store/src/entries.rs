//! Entry operations and queries.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use timeline_core::{DateRange, Entry, Tag, TimelineEvent};
use tracing::debug;
use uuid::Uuid;

use crate::store::Store;

impl Store {
    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Insert a captured entry at the front and persist.
    pub fn add_entry(&mut self, entry: Entry) {
        let entry_id = entry.id;
        self.entries.insert(0, entry);
        self.persist_entries();
        debug!(subsystem = "store", op = "add_entry", entry_id = %entry_id, "Entry added");
        self.changed(TimelineEvent::EntryAdded { entry_id });
    }

    /// Replace the entry with the same id. Unknown ids are ignored.
    pub fn update_entry(&mut self, entry: Entry) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) else {
            debug!(subsystem = "store", op = "update_entry", entry_id = %entry.id, "Unknown entry, ignored");
            return false;
        };
        let entry_id = entry.id;
        *slot = entry;
        self.persist_entries();
        self.changed(TimelineEvent::EntryUpdated { entry_id });
        true
    }

    /// Assign tags to an entry and mark it processed.
    ///
    /// Always announces the change, even when the tags are identical, so
    /// views refresh after classification.
    pub fn update_entry_tags(&mut self, entry_id: Uuid, tags: Vec<Tag>) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) else {
            debug!(subsystem = "store", op = "update_entry_tags", entry_id = %entry_id, "Unknown entry, ignored");
            return false;
        };
        let tag_count = tags.len();
        entry.tags = tags;
        entry.ai_processed = true;
        self.persist_entries();
        self.changed(TimelineEvent::EntryTagsUpdated {
            entry_id,
            tag_count,
        });
        true
    }

    /// Remove one entry.
    pub fn delete_entry(&mut self, entry_id: Uuid) -> bool {
        self.delete_entries(&[entry_id]) == 1
    }

    /// Remove every entry whose id is listed. Returns how many were removed.
    pub fn delete_entries(&mut self, ids: &[Uuid]) -> usize {
        let wanted: HashSet<Uuid> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if wanted.contains(&e.id) {
                removed.push(e.id);
                false
            } else {
                true
            }
        });
        self.persist_entries();

        let count = removed.len();
        debug!(subsystem = "store", op = "delete_entries", result_count = count, "Entries deleted");
        if count > 0 {
            self.changed(TimelineEvent::EntriesDeleted { entry_ids: removed });
        }
        count
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Entries inside `range`, evaluated against the current wall clock.
    pub fn entries_in_range(&self, range: &DateRange) -> Vec<Entry> {
        self.entries_in_range_at(range, Local::now())
    }

    /// Entries inside `range`, with the wall clock pinned at `now`.
    pub fn entries_in_range_at(&self, range: &DateRange, now: DateTime<Local>) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| range.contains_at(e.created_at, now))
            .cloned()
            .collect()
    }

    /// Entries holding the tag with `tag_id`.
    pub fn entries_with_tag(&self, tag_id: Uuid) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| e.has_tag(tag_id))
            .cloned()
            .collect()
    }

    /// Entries holding at least one of `tag_ids`. An empty set matches all.
    pub fn entries_with_any_tag(&self, tag_ids: &[Uuid]) -> Vec<Entry> {
        if tag_ids.is_empty() {
            return self.entries.clone();
        }
        self.entries
            .iter()
            .filter(|e| tag_ids.iter().any(|id| e.has_tag(*id)))
            .cloned()
            .collect()
    }

    /// Case-insensitive search over content and embedded tag names.
    pub fn search(&self, query: &str) -> Vec<Entry> {
        if query.is_empty() {
            return self.entries.clone();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.content.to_lowercase().contains(&needle)
                    || e.tags.iter().any(|t| t.name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Every tag embedded in some entry, one per id, sorted by name.
    pub fn all_tags(&self) -> Vec<Tag> {
        let mut seen = HashSet::new();
        let mut tags: Vec<Tag> = self
            .entries
            .iter()
            .flat_map(|e| e.tags.iter())
            .filter(|t| seen.insert(t.id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    /// Number of entries holding the tag.
    pub fn tag_count(&self, tag_id: Uuid) -> usize {
        self.entries.iter().filter(|e| e.has_tag(tag_id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use timeline_core::EventBus;

    fn store() -> Store {
        Store::in_memory(Arc::new(EventBus::new(32)))
    }

    #[test]
    fn test_add_entry_prepends() {
        let mut store = store();
        let first = Entry::new("first", vec![]);
        let second = Entry::new("second", vec![]);
        store.add_entry(first.clone());
        store.add_entry(second.clone());

        assert_eq!(store.entries()[0].id, second.id);
        assert_eq!(store.entries()[1].id, first.id);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_update_entry_unknown_id_is_noop() {
        let mut store = store();
        store.add_entry(Entry::new("kept", vec![]));
        let before = store.revision();

        assert!(!store.update_entry(Entry::new("stranger", vec![])));
        assert_eq!(store.revision(), before);
        assert_eq!(store.entries()[0].content, "kept");
    }

    #[test]
    fn test_update_entry_replaces_content() {
        let mut store = store();
        let entry = Entry::new("draft", vec![]);
        store.add_entry(entry.clone());

        assert!(store.update_entry(entry.edited("final")));
        assert_eq!(store.entry(entry.id).unwrap().content, "final");
    }

    #[test]
    fn test_update_entry_tags_marks_processed() {
        let mut store = store();
        let entry = Entry::new("实现登录", vec![]);
        store.add_entry(entry.clone());

        assert!(store.update_entry_tags(entry.id, vec![Tag::named("开发")]));
        let stored = store.entry(entry.id).unwrap();
        assert!(stored.ai_processed);
        assert_eq!(stored.tags[0].name, "开发");
        assert!(!store.update_entry_tags(Uuid::new_v4(), vec![]));
    }

    #[test]
    fn test_update_entry_tags_always_announces() {
        let mut store = store();
        let mut rx = store.events().subscribe();
        let entry = Entry::new("x", vec![]);
        store.add_entry(entry.clone());
        store.update_entry_tags(entry.id, vec![]);
        store.update_entry_tags(entry.id, vec![]);

        let mut tag_updates = 0;
        while let Ok(envelope) = rx.try_recv() {
            if envelope.event_type == "entry.tags_updated" {
                tag_updates += 1;
            }
        }
        assert_eq!(tag_updates, 2);
    }

    #[test]
    fn test_delete_entries() {
        let mut store = store();
        let a = Entry::new("a", vec![]);
        let b = Entry::new("b", vec![]);
        let c = Entry::new("c", vec![]);
        for e in [&a, &b, &c] {
            store.add_entry(e.clone());
        }

        assert_eq!(store.delete_entries(&[a.id, c.id, Uuid::new_v4()]), 2);
        assert_eq!(store.entries().len(), 1);
        assert!(store.delete_entry(b.id));
        assert!(!store.delete_entry(b.id));
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        let mut store = store();
        store.add_entry(Entry::new("a", vec![]));
        store.add_entry(Entry::new("b", vec![]));
        assert_eq!(store.search("").len(), 2);
    }

    #[test]
    fn test_search_matches_tag_name_only() {
        let mut store = store();
        store.add_entry(Entry::new("参加评审", vec![Tag::named("Meeting")]));
        store.add_entry(Entry::new("写代码", vec![]));

        let found = store.search("meet");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "参加评审");
    }

    #[test]
    fn test_search_content_case_insensitive() {
        let mut store = store();
        store.add_entry(Entry::new("Fixed the API bug", vec![]));
        assert_eq!(store.search("api BUG").len(), 1);
        assert!(store.search("database").is_empty());
    }

    #[test]
    fn test_all_tags_dedup_and_sorted() {
        let mut store = store();
        let dev = Tag::named("开发");
        let api = Tag::named("API");
        store.add_entry(Entry::new("a", vec![dev.clone()]));
        store.add_entry(Entry::new("b", vec![dev.clone(), api.clone()]));

        let tags = store.all_tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "API");
        assert_eq!(tags[1].name, "开发");
    }

    #[test]
    fn test_entries_with_tag_and_count() {
        let mut store = store();
        let dev = Tag::named("开发");
        let doc = Tag::named("文档");
        store.add_entry(Entry::new("a", vec![dev.clone()]));
        store.add_entry(Entry::new("b", vec![dev.clone(), doc.clone()]));
        store.add_entry(Entry::new("c", vec![]));

        assert_eq!(store.entries_with_tag(dev.id).len(), 2);
        assert_eq!(store.tag_count(doc.id), 1);
        assert_eq!(store.entries_with_any_tag(&[doc.id]).len(), 1);
        assert_eq!(store.entries_with_any_tag(&[]).len(), 3);
    }
}
