use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all server metrics
const PREFIX: &str = "musicmedia";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Deletion Metrics
    pub static ref DELETIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_deletions_total"), "Entity deletions by outcome"),
        &["entity", "outcome"]
    ).expect("Failed to create deletions_total metric");

    pub static ref ROWS_DELETED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_rows_deleted_total"), "Rows removed by cascading deletes"),
        &["table"]
    ).expect("Failed to create rows_deleted_total metric");

    pub static ref DELETION_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_deletion_failures_total"), "Failed deletions by error kind"),
        &["entity", "kind"]
    ).expect("Failed to create deletion_failures_total metric");

    pub static ref DELETION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_deletion_duration_seconds"),
            "Cascading delete duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["entity"]
    ).expect("Failed to create deletion_duration_seconds metric");

    // Process Metrics
    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DELETIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ROWS_DELETED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DELETION_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DELETION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a finished deletion, successful or not
pub fn record_deletion(entity: &str, outcome: &str, duration: Duration) {
    DELETIONS_TOTAL.with_label_values(&[entity, outcome]).inc();

    DELETION_DURATION_SECONDS
        .with_label_values(&[entity])
        .observe(duration.as_secs_f64());
}

pub fn record_rows_deleted(table: &str, rows: usize) {
    if rows > 0 {
        ROWS_DELETED_TOTAL
            .with_label_values(&[table])
            .inc_by(rows as f64);
    }
}

pub fn record_deletion_failure(entity: &str, kind: &str) {
    DELETION_FAILURES_TOTAL
        .with_label_values(&[entity, kind])
        .inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    // RSS is reported in kB
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        if let Ok(kb) = kb_str.parse::<f64>() {
                            PROCESS_MEMORY_BYTES.set(kb * 1024.0);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
