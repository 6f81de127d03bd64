//! # timeline-jobs
//!
//! Capture flow and background tag classification.
//!
//! Captured entries without manual tags are classified on a tokio task. The
//! task only talks to the classifier; its [`ClassificationOutcome`] comes
//! back over a channel to the owner of the [`Store`](timeline_store::Store),
//! which reconciles the suggestions against known tags with
//! [`apply_outcome`].

pub mod capture;
pub mod pipeline;
pub mod reconcile;

pub use capture::{capture, CaptureResult};
pub use pipeline::{
    ClassificationOutcome, ClassificationPipeline, OutcomeReceiver, PipelineSettings,
    ENV_AUTO_CLASSIFY,
};
pub use reconcile::{apply_outcome, candidate_names, candidate_tags, reconcile_suggestions};
