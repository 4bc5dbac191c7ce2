//! Record every degradation event with its recovery status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysdoc_core::models::DegradationEvent;

use crate::tracing_setup::events;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still serving fallback results.
    Active,
    Recovered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Tracks degradation events for reporting.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    events: Vec<TrackedDegradation>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DegradationEvent) {
        events::degradation_triggered(&event.component, &event.failure, &event.fallback_used);
        self.events.push(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
    }

    pub fn record_all(&mut self, events: impl IntoIterator<Item = DegradationEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Flip the active entries of `component` to recovered. Returns the
    /// number of entries that changed.
    pub fn mark_recovered(&mut self, component: &str) -> usize {
        let now = Utc::now();
        let changed = self
            .events
            .iter_mut()
            .filter(|t| t.is_active_for(component))
            .map(|t| {
                t.recovery_status = RecoveryStatus::Recovered;
                t.recovered_at = Some(now);
            })
            .count();
        if changed > 0 {
            events::degradation_recovered(component);
        }
        changed
    }

    pub fn events(&self) -> &[TrackedDegradation] {
        &self.events
    }

    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.active_for(component).next().is_some()
    }

    /// Events of a component in the last `window_secs` seconds, recovered or not.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let since = Utc::now() - chrono::Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|t| t.event.component == component && t.event.timestamp > since)
            .count()
    }

    /// Time since the oldest still-active event of a component.
    pub fn degraded_duration(&self, component: &str) -> Option<chrono::Duration> {
        let oldest = self.active_for(component).map(|t| t.event.timestamp).min()?;
        Some(Utc::now() - oldest)
    }

    fn active_for<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a TrackedDegradation> + 'a {
        self.events.iter().filter(move |t| t.is_active_for(component))
    }
}

impl TrackedDegradation {
    fn is_active_for(&self, component: &str) -> bool {
        self.recovery_status == RecoveryStatus::Active && self.event.component == component
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_recover() {
        let mut tracker = DegradationTracker::new();
        tracker.record(DegradationEvent::now("rerank", "timeout", "merged_score"));
        tracker.record(DegradationEvent::now("rerank", "timeout", "merged_score"));
        tracker.record(DegradationEvent::now("embeddings", "down", "tfidf-fallback"));
        assert!(tracker.is_degraded("rerank"));
        assert_eq!(tracker.count_recent("rerank", 60), 2);

        assert_eq!(tracker.mark_recovered("rerank"), 2);
        assert!(!tracker.is_degraded("rerank"));
        assert_eq!(tracker.active_degradations().len(), 1);
        assert!(tracker.degraded_duration("rerank").is_none());
        assert!(tracker.degraded_duration("embeddings").is_some());
    }

    #[test]
    fn recovering_unknown_component_is_noop() {
        let mut tracker = DegradationTracker::new();
        assert_eq!(tracker.mark_recovered("rerank"), 0);
        assert!(tracker.events().is_empty());
    }
}
