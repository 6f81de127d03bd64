//! # timeline-store
//!
//! Entry store and tag registry for the timeline journal, persisted as two
//! JSON files (`entries.json`, `tags.json`).
//!
//! The [`Store`] is owned by a single coordinator. Every mutation persists the
//! affected file before returning and announces itself on the event bus.

mod entries;
pub mod export;
pub mod persistence;
mod registry;
mod store;

pub use export::import_export;
pub use persistence::{FilesystemBackend, MemoryBackend, StorageBackend};
pub use registry::random_palette_color;
pub use store::Store;
