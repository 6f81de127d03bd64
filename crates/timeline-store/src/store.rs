//! The [`Store`]: entries and the tag registry, owned by one coordinator.

use std::sync::Arc;

use timeline_core::defaults::{ENTRIES_FILE, TAGS_FILE};
use timeline_core::{Entry, Error, EventBus, Tag, TimelineEvent};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::persistence::{load_json, save_json, FilesystemBackend, MemoryBackend, StorageBackend};

/// Entry collection plus tag registry, persisted after every mutation.
///
/// Constructed explicitly by the composition root and passed by `&mut` to
/// whoever coordinates changes. Readers get value snapshots; all mutation
/// goes through methods on this type. Each mutation bumps [`Store::revision`]
/// and is announced on the shared [`EventBus`].
pub struct Store {
    pub(crate) entries: Vec<Entry>,
    pub(crate) tags: Vec<Tag>,
    backend: Box<dyn StorageBackend>,
    events: Arc<EventBus>,
    revision: u64,
}

impl Store {
    /// Load both collections from `backend`.
    ///
    /// Missing or undecodable entries start empty. Missing or undecodable
    /// tags fall back to the built-in registry, which is written out.
    pub fn open(backend: Box<dyn StorageBackend>, events: Arc<EventBus>) -> Self {
        let mut entries: Vec<Entry> = match load_json(backend.as_ref(), ENTRIES_FILE) {
            Ok(entries) => entries,
            Err(Error::NotFound(_)) => Vec::new(),
            Err(e) => {
                warn!(
                    subsystem = "store",
                    op = "open",
                    file = ENTRIES_FILE,
                    error = %e,
                    "Entries unreadable, starting empty"
                );
                Vec::new()
            }
        };
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut seeded = false;
        let tags: Vec<Tag> = match load_json(backend.as_ref(), TAGS_FILE) {
            Ok(tags) => tags,
            Err(e) => {
                if !matches!(e, Error::NotFound(_)) {
                    warn!(
                        subsystem = "store",
                        op = "open",
                        file = TAGS_FILE,
                        error = %e,
                        "Tags unreadable, using built-in registry"
                    );
                }
                seeded = true;
                Tag::builtin()
            }
        };

        let store = Self {
            entries,
            tags,
            backend,
            events,
            revision: 0,
        };
        if seeded {
            store.persist_tags();
        }

        info!(
            subsystem = "store",
            op = "open",
            location = %store.backend.location(),
            entry_count = store.entries.len(),
            tag_count = store.tags.len(),
            "Store opened"
        );
        store
    }

    /// Open the JSON files under `dir`.
    pub fn open_dir(dir: impl Into<std::path::PathBuf>, events: Arc<EventBus>) -> Self {
        Self::open(Box::new(FilesystemBackend::new(dir)), events)
    }

    /// A store backed only by memory.
    pub fn in_memory(events: Arc<EventBus>) -> Self {
        Self::open(Box::new(MemoryBackend::new()), events)
    }

    /// Entries, newest captured first (insertion order for new captures).
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Tag registry in registry order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Snapshot of one entry.
    pub fn entry(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Counter incremented by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The bus this store announces changes on.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Where the collections are persisted.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Remove every entry and reset the registry to the built-in tags.
    ///
    /// Both files are rewritten. Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.tags = Tag::builtin();
        self.persist_entries();
        self.persist_tags();

        info!(
            subsystem = "store",
            op = "clear",
            result_count = removed,
            "Store cleared"
        );
        self.changed(TimelineEvent::StoreCleared {
            entries_removed: removed,
        });
        removed
    }

    pub(crate) fn changed(&mut self, event: TimelineEvent) {
        self.revision += 1;
        debug!(
            subsystem = "store",
            revision = self.revision,
            event_type = event.namespaced_event_type(),
            "Store changed"
        );
        self.events.emit_at_revision(event, self.revision);
    }

    pub(crate) fn persist_entries(&self) {
        if let Err(e) = save_json(self.backend.as_ref(), ENTRIES_FILE, &self.entries) {
            warn!(
                subsystem = "store",
                op = "persist",
                file = ENTRIES_FILE,
                error = %e,
                "Failed to persist entries"
            );
        }
    }

    pub(crate) fn persist_tags(&self) {
        if let Err(e) = save_json(self.backend.as_ref(), TAGS_FILE, &self.tags) {
            warn!(
                subsystem = "store",
                op = "persist",
                file = TAGS_FILE,
                error = %e,
                "Failed to persist tags"
            );
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.backend.location())
            .field("entries", &self.entries.len())
            .field("tags", &self.tags.len())
            .field("revision", &self.revision)
            .finish()
    }
}
