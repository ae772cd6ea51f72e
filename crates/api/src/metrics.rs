use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Research,
    Validate,
    Websites,
}

#[derive(Default)]
struct EndpointCounters {
    requests: AtomicUsize,
    failures: AtomicUsize,
    total_time_us: AtomicU64,
}

impl EndpointCounters {
    fn snapshot(&self) -> EndpointSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let total_us = self.total_time_us.load(Ordering::Relaxed) as f64;
        EndpointSnapshot {
            requests,
            failures: self.failures.load(Ordering::Relaxed),
            avg_time_ms: if requests > 0 {
                total_us / requests as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}

/// Request counters and latency per stage endpoint.
#[derive(Default)]
pub struct Metrics {
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    research: EndpointCounters,
    validate: EndpointCounters,
    websites: EndpointCounters,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, endpoint: Endpoint, duration: Duration, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        let counters = self.counters(endpoint);
        counters.requests.fetch_add(1, Ordering::Relaxed);
        if !success {
            counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        counters
            .total_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn counters(&self, endpoint: Endpoint) -> &EndpointCounters {
        match endpoint {
            Endpoint::Research => &self.research,
            Endpoint::Validate => &self.validate,
            Endpoint::Websites => &self.websites,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            research: self.research.snapshot(),
            validate: self.validate.snapshot(),
            websites: self.websites.snapshot(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub research: EndpointSnapshot,
    pub validate: EndpointSnapshot,
    pub websites: EndpointSnapshot,
}

#[derive(Debug, Serialize)]
pub struct EndpointSnapshot {
    pub requests: usize,
    pub failures: usize,
    pub avg_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_endpoint_counters() {
        let metrics = Metrics::new();
        metrics.record(Endpoint::Research, Duration::from_millis(10), true);
        metrics.record(Endpoint::Research, Duration::from_millis(30), false);
        metrics.record(Endpoint::Websites, Duration::from_millis(5), true);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 3);
        assert_eq!(snap.failed_requests, 1);
        assert_eq!(snap.research.requests, 2);
        assert_eq!(snap.research.failures, 1);
        assert!((snap.research.avg_time_ms - 20.0).abs() < 1e-9);
        assert_eq!(snap.validate.requests, 0);
        assert_eq!(snap.validate.avg_time_ms, 0.0);
    }
}
