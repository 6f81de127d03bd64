//! Capture through classification to persisted tags, using the mock
//! classifier and an on-disk store.

use std::sync::Arc;

use tempfile::TempDir;
use timeline_core::EventBus;
use timeline_inference::mock::MockClassifier;
use timeline_inference::{AiError, TagClassifier};
use timeline_jobs::{
    apply_outcome, capture, ClassificationPipeline, OutcomeReceiver, PipelineSettings,
};
use timeline_store::Store;

struct Harness {
    dir: TempDir,
    events: Arc<EventBus>,
    store: Store,
    pipeline: ClassificationPipeline,
    outcomes: OutcomeReceiver,
}

fn harness(mock: MockClassifier, settings: PipelineSettings) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let events = Arc::new(EventBus::new(128));
    let store = Store::open_dir(dir.path(), events.clone());
    let classifier: Arc<dyn TagClassifier> = Arc::new(mock);
    let (pipeline, outcomes) = ClassificationPipeline::new(Some(classifier), settings, events.clone());
    Harness {
        dir,
        events,
        store,
        pipeline,
        outcomes,
    }
}

#[tokio::test]
async fn test_untagged_capture_gets_new_tag_persisted() {
    let mock = MockClassifier::new().with_response_mapping("装箱", "可视化装箱");
    let mut h = harness(mock, PipelineSettings::default());
    let registry_before = h.store.tags().len();

    let captured = capture(&mut h.store, Some(&h.pipeline), "优化可视化装箱的排序逻辑", &[]).unwrap();
    assert!(captured.submitted());
    assert!(captured.entry.tags.is_empty());

    let outcome = h.outcomes.recv().await.unwrap();
    let assigned = apply_outcome(&mut h.store, outcome).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].name, "可视化装箱");
    assert_eq!(h.store.tags().len(), registry_before + 1);

    let reloaded = Store::open_dir(h.dir.path(), h.events.clone());
    let entry = reloaded.entry(captured.entry.id).unwrap();
    assert!(entry.ai_processed);
    assert_eq!(entry.tags, assigned);
    assert!(reloaded.find_tag_by_name("可视化装箱").is_some());
}

#[tokio::test]
async fn test_existing_tag_reused_by_substring() {
    let mock = MockClassifier::new().with_fixed_response("用户认证模块");
    let mut h = harness(mock, PipelineSettings::default());
    let auth = h.store.resolve_tag("用户认证").unwrap();
    let registry_before = h.store.tags().len();

    let captured = capture(&mut h.store, Some(&h.pipeline), "完成了用户认证模块的开发", &[]).unwrap();
    let outcome = h.outcomes.recv().await.unwrap();
    let assigned = apply_outcome(&mut h.store, outcome).unwrap();

    assert_eq!(assigned, vec![auth]);
    assert_eq!(h.store.tags().len(), registry_before);
    assert!(h.store.entry(captured.entry.id).unwrap().ai_processed);
}

#[tokio::test]
async fn test_manual_tags_skip_classification() {
    let mock = MockClassifier::new().with_fixed_response("不应出现");
    let mut h = harness(mock.clone(), PipelineSettings::default());

    let captured = capture(&mut h.store, Some(&h.pipeline), "周会 #会议", &[]).unwrap();

    assert!(!captured.submitted());
    assert_eq!(captured.entry.tags[0].name, "会议");
    assert!(!captured.entry.ai_processed);
    assert_eq!(mock.call_count(), 0);
    assert_eq!(h.outcomes.in_flight(), 0);
}

#[tokio::test]
async fn test_auto_classify_disabled() {
    let mock = MockClassifier::new().with_fixed_response("标签");
    let mut h = harness(mock.clone(), PipelineSettings::default().with_auto_classify(false));

    let captured = capture(&mut h.store, Some(&h.pipeline), "无标签记录", &[]).unwrap();

    assert!(!captured.submitted());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_failure_leaves_entry_unprocessed() {
    let mock = MockClassifier::new().with_error(AiError::Api {
        status: 503,
        body: "overloaded".to_string(),
    });
    let mut h = harness(mock, PipelineSettings::default());

    let captured = capture(&mut h.store, Some(&h.pipeline), "部署脚本调整", &[]).unwrap();
    let outcome = h.outcomes.recv().await.unwrap();
    assert!(apply_outcome(&mut h.store, outcome).is_none());

    let reloaded = Store::open_dir(h.dir.path(), h.events.clone());
    let entry = reloaded.entry(captured.entry.id).unwrap();
    assert!(entry.tags.is_empty());
    assert!(!entry.ai_processed);
}

#[tokio::test]
async fn test_entry_deleted_before_outcome() {
    let mock = MockClassifier::new().with_fixed_response("数据迁移");
    let mut h = harness(mock, PipelineSettings::default());
    let registry_before = h.store.tags().len();

    let captured = capture(&mut h.store, Some(&h.pipeline), "迁移旧数据", &[]).unwrap();
    assert!(h.store.delete_entry(captured.entry.id));

    let outcome = h.outcomes.recv().await.unwrap();
    assert!(apply_outcome(&mut h.store, outcome).is_none());
    assert_eq!(h.store.tags().len(), registry_before);
    assert!(h.store.entries().is_empty());
}

#[tokio::test]
async fn test_event_sequence_for_classified_capture() {
    let mock = MockClassifier::new().with_fixed_response("性能优化");
    let mut h = harness(mock, PipelineSettings::default());
    let mut events = h.events.subscribe();

    capture(&mut h.store, Some(&h.pipeline), "接口响应从 2s 降到 200ms", &[]).unwrap();
    let outcome = h.outcomes.recv().await.unwrap();
    apply_outcome(&mut h.store, outcome).unwrap();

    let mut types = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        types.push(envelope.event_type);
    }
    assert_eq!(
        types,
        vec![
            "entry.added",
            "classification.started",
            "classification.completed",
            "tag.added",
            "entry.tags_updated",
        ]
    );
}
