//! Quick capture: store a new entry and hand it to the classifier when it
//! arrived without tags.

use timeline_core::{extract_hashtags, Entry, Error, Result, Tag};
use timeline_store::Store;
use tokio::task::JoinHandle;
use tracing::info;

use crate::pipeline::ClassificationPipeline;
use crate::reconcile::candidate_names;

/// What a capture produced.
#[derive(Debug)]
pub struct CaptureResult {
    /// The stored entry, with its manual tags.
    pub entry: Entry,
    /// Background classification task, when one was started.
    pub classification: Option<JoinHandle<()>>,
}

impl CaptureResult {
    pub fn submitted(&self) -> bool {
        self.classification.is_some()
    }
}

/// Capture `content` as a new entry.
///
/// Manual tags are the names in `manual_tag_names` plus any inline
/// `#hashtags`, each resolved to the registry tag with that exact name or
/// registered fresh. Entries without manual tags are submitted to
/// `pipeline` when one is given and it is enabled and configured.
///
/// # Errors
///
/// `Error::InvalidInput` when `content` is blank.
pub fn capture(
    store: &mut Store,
    pipeline: Option<&ClassificationPipeline>,
    content: &str,
    manual_tag_names: &[String],
) -> Result<CaptureResult> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::InvalidInput("entry content is empty".to_string()));
    }

    let mut names: Vec<String> = Vec::new();
    let explicit = manual_tag_names
        .iter()
        .map(|n| n.trim().trim_start_matches('#').to_string());
    for name in explicit.chain(extract_hashtags(content)) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    let tags: Vec<Tag> = names.iter().filter_map(|n| store.resolve_tag(n)).collect();

    let entry = Entry::new(content, tags);
    store.add_entry(entry.clone());
    info!(
        subsystem = "jobs",
        component = "capture",
        entry_id = %entry.id,
        result_count = entry.tags.len(),
        "Entry captured"
    );

    let classification = match pipeline {
        Some(pipeline) if pipeline.should_classify(entry.tags.len()) => {
            pipeline.submit(entry.id, entry.content.clone(), candidate_names(store))
        }
        _ => None,
    };

    Ok(CaptureResult {
        entry,
        classification,
    })
}
