//! Background classification of captured entries.
//!
//! Each submission spawns one tokio task that performs only the network
//! call. The task never touches the store: it sends a
//! [`ClassificationOutcome`] back over a channel, and whoever owns the
//! [`Store`](timeline_store::Store) applies it with
//! [`apply_outcome`](crate::reconcile::apply_outcome).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use timeline_core::{EventBus, TimelineEvent};
use timeline_inference::{AiResult, TagClassifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Environment variable toggling automatic classification.
pub const ENV_AUTO_CLASSIFY: &str = "TIMELINE_AUTO_CLASSIFY";

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Classify entries captured without manual tags.
    pub auto_classify: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            auto_classify: true,
        }
    }
}

impl PipelineSettings {
    /// Create settings from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `TIMELINE_AUTO_CLASSIFY` | `true` | `false` or `0` disables |
    pub fn from_env() -> Self {
        let auto_classify = std::env::var(ENV_AUTO_CLASSIFY)
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Self { auto_classify }
    }

    pub fn with_auto_classify(mut self, enabled: bool) -> Self {
        self.auto_classify = enabled;
        self
    }
}

/// Result of one background classification, handed to the coordinator.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub entry_id: Uuid,
    pub result: AiResult<Vec<String>>,
}

/// Receiving half of the outcome channel, held by the coordinator.
pub struct OutcomeReceiver {
    rx: mpsc::UnboundedReceiver<ClassificationOutcome>,
    in_flight: Arc<AtomicUsize>,
}

impl OutcomeReceiver {
    /// Wait for the next outcome.
    pub async fn recv(&mut self) -> Option<ClassificationOutcome> {
        self.rx.recv().await
    }

    /// Next outcome if one is already waiting.
    pub fn try_recv(&mut self) -> Option<ClassificationOutcome> {
        self.rx.try_recv().ok()
    }

    /// Number of submitted tasks still waiting on the classifier.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Dispatches classification requests to background tasks.
pub struct ClassificationPipeline {
    classifier: Option<Arc<dyn TagClassifier>>,
    settings: PipelineSettings,
    events: Arc<EventBus>,
    outcome_tx: mpsc::UnboundedSender<ClassificationOutcome>,
    in_flight: Arc<AtomicUsize>,
}

impl ClassificationPipeline {
    /// Create a pipeline and the receiver its outcomes arrive on.
    ///
    /// `classifier` is `None` when no valid AI configuration exists; the
    /// pipeline then never triggers.
    pub fn new(
        classifier: Option<Arc<dyn TagClassifier>>,
        settings: PipelineSettings,
        events: Arc<EventBus>,
    ) -> (Self, OutcomeReceiver) {
        let (outcome_tx, rx) = mpsc::unbounded_channel();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let pipeline = Self {
            classifier,
            settings,
            events,
            outcome_tx,
            in_flight: in_flight.clone(),
        };
        (pipeline, OutcomeReceiver { rx, in_flight })
    }

    /// Whether an entry captured with `manual_tag_count` tags gets classified.
    pub fn should_classify(&self, manual_tag_count: usize) -> bool {
        manual_tag_count == 0 && self.settings.auto_classify && self.classifier.is_some()
    }

    /// Spawn a classification task for an entry.
    ///
    /// Returns `None` when no classifier is configured. The task sends
    /// exactly one outcome; failures are logged and still reported so the
    /// coordinator can observe them.
    pub fn submit(
        &self,
        entry_id: Uuid,
        content: String,
        existing_tag_names: Vec<String>,
    ) -> Option<JoinHandle<()>> {
        let classifier = self.classifier.clone()?;
        let events = self.events.clone();
        let outcome_tx = self.outcome_tx.clone();
        let in_flight = self.in_flight.clone();

        in_flight.fetch_add(1, Ordering::SeqCst);
        info!(
            subsystem = "jobs",
            component = "pipeline",
            entry_id = %entry_id,
            model = classifier.model_name(),
            "Classification submitted"
        );
        events.emit(TimelineEvent::ClassificationStarted { entry_id });

        Some(tokio::spawn(async move {
            let start = Instant::now();
            let result = classifier.classify(&content, &existing_tag_names).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(suggestions) => {
                    debug!(
                        subsystem = "jobs",
                        component = "pipeline",
                        entry_id = %entry_id,
                        result_count = suggestions.len(),
                        duration_ms,
                        "Classification completed"
                    );
                    events.emit(TimelineEvent::ClassificationCompleted {
                        entry_id,
                        suggestions: suggestions.clone(),
                        duration_ms,
                    });
                }
                Err(e) => {
                    warn!(
                        subsystem = "jobs",
                        component = "pipeline",
                        entry_id = %entry_id,
                        duration_ms,
                        error = %e,
                        "Classification abandoned"
                    );
                    events.emit(TimelineEvent::ClassificationFailed {
                        entry_id,
                        error: e.to_string(),
                    });
                }
            }

            in_flight.fetch_sub(1, Ordering::SeqCst);
            if outcome_tx
                .send(ClassificationOutcome { entry_id, result })
                .is_err()
            {
                debug!(
                    subsystem = "jobs",
                    component = "pipeline",
                    entry_id = %entry_id,
                    "Coordinator gone, outcome dropped"
                );
            }
        }))
    }
}
