use prometheus::{CounterVec, HistogramVec, IntGauge, Registry};

/// Prometheus Metrics für Request-Zählung, Storage-Latenz und
/// Bestandsgrößen
pub struct Metrics {
    pub registry: Registry,
    pub storage_latency: HistogramVec,
    pub api_request_count: CounterVec,
    pub api_error_count: CounterVec,
    pub member_count: IntGauge,
    pub record_count: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let storage_latency = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "storage_latency_seconds",
                "Storage operation latency in seconds",
            ),
            &["operation"],
        )
        .expect("Failed to create storage_latency metric");

        let api_request_count = CounterVec::new(
            prometheus::Opts::new("api_requests_total", "Total API requests"),
            &["endpoint", "status"],
        )
        .expect("Failed to create api_request_count metric");

        let api_error_count = CounterVec::new(
            prometheus::Opts::new("api_errors_total", "Total API errors"),
            &["endpoint", "error_type"],
        )
        .expect("Failed to create api_error_count metric");

        let member_count = IntGauge::new("club_members", "Registered club members")
            .expect("Failed to create member_count metric");

        let record_count = IntGauge::new("club_records", "Stored run records")
            .expect("Failed to create record_count metric");

        registry.register(Box::new(storage_latency.clone())).ok();
        registry.register(Box::new(api_request_count.clone())).ok();
        registry.register(Box::new(api_error_count.clone())).ok();
        registry.register(Box::new(member_count.clone())).ok();
        registry.register(Box::new(record_count.clone())).ok();

        Self {
            registry,
            storage_latency,
            api_request_count,
            api_error_count,
            member_count,
            record_count,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_and_gather() {
        let metrics = Metrics::new();
        metrics
            .api_request_count
            .with_label_values(&["/api/members", "200"])
            .inc();
        metrics
            .api_error_count
            .with_label_values(&["members", "storage"])
            .inc();
        metrics.member_count.set(3);
        metrics
            .storage_latency
            .with_label_values(&["load_members"])
            .observe(0.01);

        let families = metrics.registry().gather();
        for name in [
            "storage_latency_seconds",
            "api_requests_total",
            "api_errors_total",
            "club_members",
            "club_records",
        ] {
            assert!(
                families.iter().any(|f| f.get_name() == name),
                "metric {name} not registered"
            );
        }
    }
}
