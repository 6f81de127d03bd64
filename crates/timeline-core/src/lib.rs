//! # timeline-core
//!
//! Core types, events, and pure logic for the timeline journal.
//!
//! This crate provides the foundational data structures that the store,
//! inference, and job crates depend on:
//! - Entry / Tag value snapshots and their JSON schema
//! - Date-range boundaries evaluated against the local calendar
//! - Tag-name matching used when reconciling AI suggestions
//! - The change-notification event bus
//! - The report generator

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod report;
pub mod tags;
pub mod temporal;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, TimelineEvent};
pub use models::*;
pub use report::{generate_report, ReportFormat};
pub use tags::{extract_hashtags, find_matching_tag, normalize_tag_name, parse_tag_suggestions};
pub use temporal::{range_start, DateRange};
