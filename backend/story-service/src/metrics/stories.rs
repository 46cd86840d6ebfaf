//! Prometheus metrics for story sessions and story actions

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};
use std::time::Duration;

/// Story sessions opened, by outcome (opened/empty/not_found/error)
static SESSIONS_OPENED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_sessions_opened_total",
        "Story playback sessions requested, by outcome",
        &["outcome"]
    )
    .expect("failed to register story_sessions_opened_total")
});

/// Story actions (repost/reply/publish), by outcome
static ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_actions_total",
        "Story actions performed, by action and outcome",
        &["action", "outcome"]
    )
    .expect("failed to register story_actions_total")
});

static CLEANUP_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_cleaner_runs_total",
        "Total number of expired story cleanup cycles (success/error)",
        &["status"]
    )
    .expect("failed to register story_cleaner_runs_total")
});

static CLEANUP_DELETED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_cleaner_deleted_total",
        "Expired stories soft-deleted by the cleaner",
        &["kind"]
    )
    .expect("failed to register story_cleaner_deleted_total")
});

static CLEANUP_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "story_cleaner_duration_seconds",
        "Duration of expired story cleanup cycles",
        vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
    )
    .expect("failed to register story_cleaner_duration_seconds")
});

pub fn record_session_opened(outcome: &str) {
    SESSIONS_OPENED_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_action(action: &str, outcome: &str) {
    ACTIONS_TOTAL.with_label_values(&[action, outcome]).inc();
}

pub fn record_cleanup_run(status: &str, duration: Duration) {
    CLEANUP_RUNS_TOTAL.with_label_values(&[status]).inc();
    CLEANUP_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_cleanup_deleted(count: u64) {
    CLEANUP_DELETED_TOTAL
        .with_label_values(&["story"])
        .inc_by(count);
}
