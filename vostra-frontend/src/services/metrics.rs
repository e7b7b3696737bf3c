use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Duration;

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    invoice_api_calls_total: IntCounterVec,
    invoice_api_duration_seconds: HistogramVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;
        let invoice_api_calls_total = IntCounterVec::new(
            Opts::new(
                "invoice_api_calls_total",
                "Invoice backend calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        let invoice_api_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "invoice_api_duration_seconds",
                "Invoice backend call duration in seconds",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(invoice_api_calls_total.clone()))?;
        registry.register(Box::new(invoice_api_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            invoice_api_calls_total,
            invoice_api_duration_seconds,
        })
    }
}

/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }
    let metrics = Metrics::new()?;
    // Lost races leave the first registry in place.
    let _ = METRICS.set(metrics);
    Ok(())
}

pub fn record_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    if let Some(m) = METRICS.get() {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        m.http_requests_total.with_label_values(&labels).inc();
        m.http_request_duration_seconds
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }
}

/// `outcome` is `ok` or an [`vostra_core::ApiError::kind`] label.
pub fn record_api_call(operation: &str, outcome: &str, elapsed: Duration) {
    if let Some(m) = METRICS.get() {
        m.invoice_api_calls_total
            .with_label_values(&[operation, outcome])
            .inc();
        m.invoice_api_duration_seconds
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }
}

/// Prometheus text exposition of every registered metric. Empty before
/// [`init_metrics`] has run.
pub fn get_metrics() -> Result<String, prometheus::Error> {
    let Some(m) = METRICS.get() else {
        return Ok(String::new());
    };
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&m.registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
