use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    schedule_builds: AtomicU64,
    entries_emitted: AtomicU64,
    overdue_entries: AtomicU64,
    rejected_records: AtomicU64,
    fills_recorded: AtomicU64,
    geocode_failures: AtomicU64,
    overdue_peak: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_schedule_builds(&self, delta: u64) {
        self.inner.schedule_builds.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_entries_emitted(&self, delta: u64) {
        self.inner.entries_emitted.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_overdue_entries(&self, delta: u64) {
        self.inner.overdue_entries.fetch_add(delta, Ordering::Relaxed);
        self.inner.overdue_peak.fetch_max(delta, Ordering::Relaxed);
    }

    pub fn inc_rejected_records(&self, delta: u64) {
        self.inner.rejected_records.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_fills_recorded(&self, delta: u64) {
        self.inner.fills_recorded.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_geocode_failures(&self, delta: u64) {
        self.inner.geocode_failures.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            schedule_builds: self.inner.schedule_builds.load(Ordering::Relaxed),
            entries_emitted: self.inner.entries_emitted.load(Ordering::Relaxed),
            overdue_entries: self.inner.overdue_entries.load(Ordering::Relaxed),
            rejected_records: self.inner.rejected_records.load(Ordering::Relaxed),
            fills_recorded: self.inner.fills_recorded.load(Ordering::Relaxed),
            geocode_failures: self.inner.geocode_failures.load(Ordering::Relaxed),
            overdue_peak: self.inner.overdue_peak.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub schedule_builds: u64,
    pub entries_emitted: u64,
    pub overdue_entries: u64,
    pub rejected_records: u64,
    pub fills_recorded: u64,
    pub geocode_failures: u64,
    /// Largest overdue count seen in a single build.
    pub overdue_peak: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Line<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Line {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct BuildTimer {
    start: Instant,
}

impl BuildTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
