use prometheus::{Counter, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use tracing::error;

lazy_static::lazy_static! {
    pub static ref VOICE_EVENTS: Counter = Counter::with_opts(
        Opts::new("domo_voice_events_total", "Total number of voice state events received")
    ).unwrap();

    pub static ref EVENTS_SKIPPED: Counter = Counter::with_opts(
        Opts::new("domo_events_skipped_total", "Total number of voice events filtered out")
    ).unwrap();

    pub static ref NOTIFICATIONS_SENT: Counter = Counter::with_opts(
        Opts::new("domo_notifications_sent_total", "Total number of update messages sent")
    ).unwrap();

    pub static ref METADATA_FETCH_FAILURES: Counter = Counter::with_opts(
        Opts::new("domo_metadata_fetch_failures_total", "Total number of failed or timed out channel lookups")
    ).unwrap();

    pub static ref DELIVERY_FAILURES: Counter = Counter::with_opts(
        Opts::new("domo_delivery_failures_total", "Total number of update messages that failed to send")
    ).unwrap();

    pub static ref METADATA_FETCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("domo_metadata_fetch_duration_seconds", "Time spent fetching channel metadata")
    ).unwrap();
}

pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let registry = Registry::new();

        let collectors: [Box<dyn prometheus::core::Collector>; 6] = [
            Box::new(VOICE_EVENTS.clone()),
            Box::new(EVENTS_SKIPPED.clone()),
            Box::new(NOTIFICATIONS_SENT.clone()),
            Box::new(METADATA_FETCH_FAILURES.clone()),
            Box::new(DELIVERY_FAILURES.clone()),
            Box::new(METADATA_FETCH_DURATION.clone()),
        ];
        for collector in collectors {
            if let Err(e) = registry.register(collector) {
                error!("Failed to register metric: {}", e);
            }
        }

        Self { registry }
    }

    pub fn gather_metrics(&self) -> String {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&metric_families).unwrap_or_else(|e| {
            error!("Failed to encode metrics: {}", e);
            String::new()
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gathered_text_names_every_metric() {
        VOICE_EVENTS.inc();
        METADATA_FETCH_DURATION.observe(0.01);
        let text = MetricsRegistry::new().gather_metrics();
        for name in [
            "domo_voice_events_total",
            "domo_events_skipped_total",
            "domo_notifications_sent_total",
            "domo_metadata_fetch_failures_total",
            "domo_delivery_failures_total",
            "domo_metadata_fetch_duration_seconds",
        ] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}
