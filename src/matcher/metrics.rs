use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default, Debug)]
pub struct MatchMetrics {
    candidates: AtomicU64,
    calls: AtomicU64,
    node_rejections: AtomicU64,
    arg_rejections: AtomicU64,
    look_ahead_failures: AtomicU64,
    backtracks: AtomicU64,
}

impl MatchMetrics {
    pub fn snapshot(&self) -> MatchMetricsSnapshot {
        MatchMetricsSnapshot {
            candidate_count: self.candidates.load(Ordering::Relaxed),
            call_count: self.calls.load(Ordering::Relaxed),
            node_rejection_count: self.node_rejections.load(Ordering::Relaxed),
            arg_rejection_count: self.arg_rejections.load(Ordering::Relaxed),
            look_ahead_failure_count: self.look_ahead_failures.load(Ordering::Relaxed),
            backtrack_count: self.backtracks.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.candidates.store(0, Ordering::Relaxed);
        self.calls.store(0, Ordering::Relaxed);
        self.node_rejections.store(0, Ordering::Relaxed);
        self.arg_rejections.store(0, Ordering::Relaxed);
        self.look_ahead_failures.store(0, Ordering::Relaxed);
        self.backtracks.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_candidate(&self) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_node_rejection(&self) {
        self.node_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_arg_rejection(&self) {
        self.arg_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_look_ahead_failure(&self) {
        self.look_ahead_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_backtrack(&self) {
        self.backtracks.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchMetricsSnapshot {
    pub candidate_count: u64,
    pub call_count: u64,
    pub node_rejection_count: u64,
    pub arg_rejection_count: u64,
    pub look_ahead_failure_count: u64,
    pub backtrack_count: u64,
}
