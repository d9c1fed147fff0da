use analysis::ErrorKind;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,

    // Failures by kind
    provider_unavailable: AtomicUsize,
    provider_call_failed: AtomicUsize,
    no_json_found: AtomicUsize,
    json_parse_failed: AtomicUsize,

    // Timing (in microseconds)
    total_analyze_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            provider_unavailable: AtomicUsize::new(0),
            provider_call_failed: AtomicUsize::new(0),
            no_json_found: AtomicUsize::new(0),
            json_parse_failed: AtomicUsize::new(0),
            total_analyze_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_analysis(&self, duration: Duration, outcome: Result<(), ErrorKind>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_analyze_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let counter = match outcome {
            Ok(()) => &self.successful_requests,
            Err(ErrorKind::ProviderUnavailable) => &self.provider_unavailable,
            Err(ErrorKind::ProviderCallFailed) => &self.provider_call_failed,
            Err(ErrorKind::NoJsonFound) => &self.no_json_found,
            Err(ErrorKind::JsonParseFailed) => &self.json_parse_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful_requests = self.successful_requests.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests,
            successful_requests,
            failed_requests: total_requests.saturating_sub(successful_requests),
            failures: FailureCounts {
                provider_unavailable: self.provider_unavailable.load(Ordering::Relaxed),
                provider_call_failed: self.provider_call_failed.load(Ordering::Relaxed),
                no_json_found: self.no_json_found.load(Ordering::Relaxed),
                json_parse_failed: self.json_parse_failed.load(Ordering::Relaxed),
            },
            avg_analyze_time_ms: self.avg_time_ms(&self.total_analyze_time_us, total_requests),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        total_us.load(Ordering::Relaxed) as f64 / count as f64 / 1000.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub failures: FailureCounts,
    pub avg_analyze_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct FailureCounts {
    pub provider_unavailable: usize,
    pub provider_call_failed: usize,
    pub no_json_found: usize,
    pub json_parse_failed: usize,
}
