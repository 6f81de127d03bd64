//! Reconciliation of classifier suggestions against known tags.
//!
//! Runs on the coordinator, which holds `&mut Store`; background tasks only
//! deliver [`ClassificationOutcome`]s.

use std::collections::HashSet;

use timeline_core::{find_matching_tag, Tag};
use timeline_store::Store;
use tracing::{debug, info, warn};

use crate::pipeline::ClassificationOutcome;

/// Tags a suggestion may reuse, in match-priority order.
///
/// Registry tags come first in registry order, followed by tags embedded in
/// entries that the registry no longer lists (in name order).
pub fn candidate_tags(store: &Store) -> Vec<Tag> {
    let mut candidates: Vec<Tag> = store.tags().to_vec();
    let known: HashSet<_> = candidates.iter().map(|t| t.id).collect();
    candidates.extend(store.all_tags().into_iter().filter(|t| !known.contains(&t.id)));
    candidates
}

/// Names shown to the classifier as existing tags.
pub fn candidate_names(store: &Store) -> Vec<String> {
    candidate_tags(store).into_iter().map(|t| t.name).collect()
}

/// Map suggested names onto tags, registering new ones.
///
/// Each suggestion reuses the first candidate that matches it (see
/// [`find_matching_tag`]) or becomes a new registry tag with a palette
/// colour. New tags are candidates for later suggestions in the same batch.
/// The result holds each tag id at most once.
pub fn reconcile_suggestions(store: &mut Store, suggestions: &[String]) -> Vec<Tag> {
    let mut candidates = candidate_tags(store);
    let mut chosen: Vec<Tag> = Vec::new();

    for suggestion in suggestions {
        let tag = match find_matching_tag(&candidates, suggestion) {
            Some(existing) => {
                debug!(
                    subsystem = "jobs",
                    component = "reconcile",
                    suggestion = %suggestion,
                    tag_name = %existing.name,
                    "Reusing existing tag"
                );
                existing.clone()
            }
            None => {
                let Some(minted) = store.resolve_tag(suggestion) else {
                    continue;
                };
                info!(
                    subsystem = "jobs",
                    component = "reconcile",
                    tag_id = %minted.id,
                    tag_name = %minted.name,
                    "Created tag from suggestion"
                );
                candidates.push(minted.clone());
                minted
            }
        };
        if !chosen.iter().any(|t| t.id == tag.id) {
            chosen.push(tag);
        }
    }
    chosen
}

/// Apply a classification outcome to the store.
///
/// Failed outcomes, outcomes for entries deleted meanwhile, and empty
/// suggestion lists leave the store untouched. Returns the tags assigned.
pub fn apply_outcome(store: &mut Store, outcome: ClassificationOutcome) -> Option<Vec<Tag>> {
    let entry_id = outcome.entry_id;
    let suggestions = match outcome.result {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!(
                subsystem = "jobs",
                component = "reconcile",
                entry_id = %entry_id,
                error = %e,
                "Classification failed, entry left untagged"
            );
            return None;
        }
    };

    if store.entry(entry_id).is_none() {
        debug!(
            subsystem = "jobs",
            component = "reconcile",
            entry_id = %entry_id,
            "Entry no longer exists, outcome ignored"
        );
        return None;
    }
    if suggestions.is_empty() {
        debug!(
            subsystem = "jobs",
            component = "reconcile",
            entry_id = %entry_id,
            "No usable suggestions"
        );
        return None;
    }

    let tags = reconcile_suggestions(store, &suggestions);
    if tags.is_empty() {
        return None;
    }
    store.update_entry_tags(entry_id, tags.clone());
    info!(
        subsystem = "jobs",
        component = "reconcile",
        entry_id = %entry_id,
        result_count = tags.len(),
        "Entry tags assigned"
    );
    Some(tags)
}
