//! Tag-name helpers: inline hashtag extraction, classifier response parsing,
//! and the fuzzy name match used to reuse existing tags.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::SUGGESTED_TAG_MAX_CHARS;
use crate::models::Tag;

/// `#` followed by word characters or CJK unified ideographs.
static HASHTAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([\w\u{4e00}-\u{9fa5}]+)").expect("valid hashtag pattern"));

/// Separators accepted between suggested tag names.
const SUGGESTION_SEPARATORS: &[char] = &[',', '，', '、'];

/// Extract inline `#hashtag` names in order of appearance.
///
/// Names are returned without the `#`, case preserved, duplicates removed
/// (first occurrence wins).
///
/// ```
/// use timeline_core::extract_hashtags;
///
/// let tags = extract_hashtags("修复登录问题 #Bug修复 #后端 #后端");
/// assert_eq!(tags, vec!["Bug修复".to_string(), "后端".to_string()]);
/// ```
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in HASHTAG_PATTERN.captures_iter(content) {
        if let Some(name) = cap.get(1) {
            let name = name.as_str();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Split a classifier reply into tag names.
///
/// Splits on `,` `，` `、`, trims each token and drops empty tokens and
/// tokens longer than 10 characters.
pub fn parse_tag_suggestions(reply: &str) -> Vec<String> {
    reply
        .split(SUGGESTION_SEPARATORS)
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().count() <= SUGGESTED_TAG_MAX_CHARS)
        .map(String::from)
        .collect()
}

/// Lower-case a name and strip spaces, for loose equality.
pub fn normalize_tag_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// First candidate whose name matches `suggestion`.
///
/// A candidate matches when its normalised name equals the normalised
/// suggestion, when its name occurs in the suggestion, or when the suggestion
/// occurs in its name. Substring checks are case-sensitive. Candidate order
/// decides ties. Blank names never match.
pub fn find_matching_tag<'a>(candidates: &'a [Tag], suggestion: &str) -> Option<&'a Tag> {
    if suggestion.trim().is_empty() {
        return None;
    }
    let normalized = normalize_tag_name(suggestion);
    candidates.iter().filter(|tag| !tag.name.trim().is_empty()).find(|tag| {
        normalize_tag_name(&tag.name) == normalized
            || tag.name.contains(suggestion)
            || suggestion.contains(tag.name.as_str())
    })
}
