//! ## klaxon-telemetry::metrics
//! **Prometheus counters for dispatch outcomes**

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub notifications_sent: Counter,
    pub dispatch_failures: Counter,
    pub dispatch_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let notifications_sent = Counter::new(
            "klaxon_notifications_sent_total",
            "Notifications accepted by the provider",
        )?;
        let dispatch_failures = Counter::new(
            "klaxon_dispatch_failures_total",
            "Notifications the provider rejected or never received",
        )?;
        let dispatch_latency = Histogram::with_opts(
            HistogramOpts::new(
                "klaxon_dispatch_latency_seconds",
                "Provider round-trip time per notification",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(notifications_sent.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;
        registry.register(Box::new(dispatch_latency.clone()))?;

        Ok(Self {
            registry,
            notifications_sent,
            dispatch_failures,
            dispatch_latency,
        })
    }

    /// Text exposition format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn record_sent(&self, seconds: f64) {
        self.notifications_sent.inc();
        self.dispatch_latency.observe(seconds);
    }

    pub fn record_failure(&self, seconds: f64) {
        self.dispatch_failures.inc();
        self.dispatch_latency.observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outcomes() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_sent(0.2);
        metrics.record_failure(1.5);
        metrics.record_sent(0.1);

        assert_eq!(metrics.notifications_sent.get(), 2.0);
        assert_eq!(metrics.dispatch_failures.get(), 1.0);
        assert_eq!(metrics.dispatch_latency.get_sample_count(), 3);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("klaxon_notifications_sent_total 2"));
        assert!(text.contains("klaxon_dispatch_failures_total 1"));
    }
}
