use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub confirmations_total: IntCounterVec,
    pub photo_verifications_total: IntCounterVec,
    pub classifier_latency_seconds: HistogramVec,
    pub store_conflicts_total: IntCounterVec,
    pub deliveries_completed_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let confirmations_total = IntCounterVec::new(
            Opts::new("confirmations_total", "Code confirmations by party and outcome"),
            &["party", "outcome"],
        )
        .expect("valid confirmations_total metric");

        let photo_verifications_total = IntCounterVec::new(
            Opts::new(
                "photo_verifications_total",
                "Photo verification attempts by outcome",
            ),
            &["outcome"],
        )
        .expect("valid photo_verifications_total metric");

        let classifier_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "classifier_latency_seconds",
                "Latency of photo classification in seconds",
            ),
            &["outcome"],
        )
        .expect("valid classifier_latency_seconds metric");

        let store_conflicts_total = IntCounterVec::new(
            Opts::new(
                "store_conflicts_total",
                "Conditional updates rejected by a concurrent writer",
            ),
            &["operation", "resolution"],
        )
        .expect("valid store_conflicts_total metric");

        let deliveries_completed_total = IntCounterVec::new(
            Opts::new(
                "deliveries_completed_total",
                "Deliveries that reached the delivered state, by verification path",
            ),
            &["path"],
        )
        .expect("valid deliveries_completed_total metric");

        registry
            .register(Box::new(confirmations_total.clone()))
            .expect("register confirmations_total");
        registry
            .register(Box::new(photo_verifications_total.clone()))
            .expect("register photo_verifications_total");
        registry
            .register(Box::new(classifier_latency_seconds.clone()))
            .expect("register classifier_latency_seconds");
        registry
            .register(Box::new(store_conflicts_total.clone()))
            .expect("register store_conflicts_total");
        registry
            .register(Box::new(deliveries_completed_total.clone()))
            .expect("register deliveries_completed_total");

        // Zero-initialize so the series exist before the first delivery.
        for path in ["code", "photo"] {
            deliveries_completed_total.with_label_values(&[path]);
        }

        Self {
            registry,
            confirmations_total,
            photo_verifications_total,
            classifier_latency_seconds,
            store_conflicts_total,
            deliveries_completed_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
