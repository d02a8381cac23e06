use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters for click handling and action dispatch.
#[derive(Debug, Default, Clone)]
pub struct DispatchMetrics {
    clicks: u64,
    denied: u64,
    dispatches: u64,
    attempts: u64,
    retries: u64,
    failures: u64,
    cooldown_skips: u64,
    identity_misses: u64,
    renders: u64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_click(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }

    pub fn record_denied(&mut self) {
        self.denied = self.denied.saturating_add(1);
    }

    pub fn record_dispatch(&mut self) {
        self.dispatches = self.dispatches.saturating_add(1);
    }

    pub fn record_completion(&mut self, attempts: u64) {
        self.attempts = self.attempts.saturating_add(attempts);
        self.retries = self.retries.saturating_add(attempts.saturating_sub(1));
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn record_cooldown_skip(&mut self) {
        self.cooldown_skips = self.cooldown_skips.saturating_add(1);
    }

    pub fn record_identity_miss(&mut self) {
        self.identity_misses = self.identity_misses.saturating_add(1);
    }

    pub fn record_render(&mut self) {
        self.renders = self.renders.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            clicks: self.clicks,
            denied: self.denied,
            dispatches: self.dispatches,
            attempts: self.attempts,
            retries: self.retries,
            failures: self.failures,
            cooldown_skips: self.cooldown_skips,
            identity_misses: self.identity_misses,
            renders: self.renders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub clicks: u64,
    pub denied: u64,
    pub dispatches: u64,
    pub attempts: u64,
    pub retries: u64,
    pub failures: u64,
    pub cooldown_skips: u64,
    pub identity_misses: u64,
    pub renders: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "dispatch_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("clicks".to_string(), json!(self.clicks));
        map.insert("denied".to_string(), json!(self.denied));
        map.insert("dispatches".to_string(), json!(self.dispatches));
        map.insert("attempts".to_string(), json!(self.attempts));
        map.insert("retries".to_string(), json!(self.retries));
        map.insert("failures".to_string(), json!(self.failures));
        map.insert("cooldown_skips".to_string(), json!(self.cooldown_skips));
        map.insert("identity_misses".to_string(), json!(self.identity_misses));
        map.insert("renders".to_string(), json!(self.renders));
        map
    }
}
