//! Metrics Store Integration Tests
//!
//! History bounds, aggregate invariants, and the shape of the summary
//! the presentation layer consumes.

use textlens::core::{MetricsStore, Utilization, HISTORY_CAPACITY};
use textlens::domain::{RunStatus, StepOutcome};

#[test]
fn test_history_never_exceeds_capacity() {
    let store = MetricsStore::new();

    for i in 0..HISTORY_CAPACITY + 5 {
        let handle = store.start_execution(&format!("run {}", i));
        store.finish_execution(handle, RunStatus::Success, None);
        assert!(store.execution_history().len() <= HISTORY_CAPACITY);
    }

    // The five oldest runs were evicted, relative order preserved
    let history = store.execution_history();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history[0].input_summary, "run 5");
    assert_eq!(
        history.last().unwrap().input_summary,
        format!("run {}", HISTORY_CAPACITY + 4)
    );
}

#[test]
fn test_history_is_oldest_first() {
    let store = MetricsStore::new();

    for input in ["first", "second", "third"] {
        let handle = store.start_execution(input);
        store.finish_execution(handle, RunStatus::Success, None);
    }

    let history = store.execution_history();
    let order: Vec<&str> = history.iter().map(|r| r.input_summary.as_str()).collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn test_aggregates_survive_eviction() {
    let store = MetricsStore::new();

    for i in 0..HISTORY_CAPACITY + 10 {
        let mut handle = store.start_execution(&format!("run {}", i));
        store.record_step(&mut handle, "tokenization", 0.01, StepOutcome::Success);
        store.finish_execution(handle, RunStatus::Success, None);
    }

    // Step aggregates count every run ever, not just the history window
    let summary = store.summary();
    let stats = &summary.step_stats["tokenization"];
    assert_eq!(stats.total, (HISTORY_CAPACITY + 10) as u64);
    assert_eq!(stats.success + stats.failure, stats.total);

    // Pipeline stats cover the history snapshot only
    assert_eq!(summary.pipeline_stats.total, HISTORY_CAPACITY as u64);
}

#[test]
fn test_success_rate_over_mixed_outcomes() {
    let store = MetricsStore::new();

    for i in 0..4 {
        let mut handle = store.start_execution("input");
        let (run, step) = if i % 2 == 0 {
            (RunStatus::Success, StepOutcome::Success)
        } else {
            (RunStatus::Failure, StepOutcome::Failure)
        };
        store.record_step(&mut handle, "tokenization", 0.01, step);
        store.finish_execution(handle, run, None);
    }

    let summary = store.summary();
    assert_eq!(summary.pipeline_stats.total, 4);
    assert_eq!(summary.pipeline_stats.successful, 2);
    assert_eq!(summary.pipeline_stats.failed, 2);
    assert_eq!(summary.pipeline_stats.success_rate, 0.5);
    assert_eq!(summary.step_stats["tokenization"].success_rate, 0.5);
}

#[test]
fn test_summary_serializes_with_expected_keys() {
    let store = MetricsStore::new();

    let mut handle = store.start_execution("some text");
    store.record_step(&mut handle, "tokenization", 0.02, StepOutcome::Success);
    store.finish_execution(handle, RunStatus::Success, None);

    let json: serde_json::Value = serde_json::to_value(store.summary()).unwrap();

    assert_eq!(json["pipeline_stats"]["total"], 1);
    assert_eq!(json["pipeline_stats"]["successful"], 1);
    assert_eq!(json["pipeline_stats"]["failed"], 0);
    assert_eq!(json["pipeline_stats"]["success_rate"], 1.0);

    assert_eq!(json["step_stats"]["tokenization"]["total"], 1);
    assert_eq!(json["step_stats"]["tokenization"]["success_rate"], 1.0);

    // Resource readings always serialize as numbers, zero when unavailable
    for key in [
        "cpu_percent",
        "memory_percent",
        "gpu_percent",
        "gpu_memory_percent",
    ] {
        assert!(json["system"][key].is_number(), "missing system.{}", key);
    }
}

#[test]
fn test_unavailable_reading_distinct_from_zero() {
    assert_ne!(Utilization::Unavailable, Utilization::Percent(0.0));
    assert_eq!(Utilization::Unavailable.as_percent(), 0.0);
    assert_eq!(Utilization::Percent(0.0).as_percent(), 0.0);
    assert!(Utilization::Percent(0.0).is_available());
    assert!(!Utilization::Unavailable.is_available());
}

#[test]
fn test_finished_record_is_immutable_copy() {
    let store = MetricsStore::new();

    let mut handle = store.start_execution("input");
    store.record_step(&mut handle, "tokenization", 0.01, StepOutcome::Success);
    let returned = store.finish_execution(handle, RunStatus::Success, None);

    let stored = &store.execution_history()[0];
    assert_eq!(stored.id, returned.id);
    assert_eq!(stored.status, RunStatus::Success);
    assert_eq!(stored.steps.len(), 1);
    assert!(stored.finished_at.is_some());
    assert!(stored.duration_seconds.is_some());
}
