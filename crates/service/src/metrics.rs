use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static CONTENT_FALLBACK_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_content_fallback_total",
        "Reads answered from built-in content (or empty) instead of the store",
        &["kind"]
    )
    .expect("register content_fallback_total")
});

pub static CONTENT_READ_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_content_read_failures_total",
        "Store reads that failed or returned no decodable row",
        &["kind"]
    )
    .expect("register content_read_failures_total")
});

pub static CONTENT_ROWS_SKIPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_content_rows_skipped_total",
        "Stored rows left out of a read because they could not be decoded",
        &["kind"]
    )
    .expect("register content_rows_skipped_total")
});

pub static CONTENT_WRITES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_content_writes_total",
        "Admin writes by kind, operation and outcome",
        &["kind", "op", "outcome"]
    )
    .expect("register content_writes_total")
});

pub static IMAGE_UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_image_uploads_total",
        "Image uploads by outcome",
        &["outcome"]
    )
    .expect("register image_uploads_total")
});

pub static LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hls_admin_logins_total",
        "Admin login attempts by outcome",
        &["outcome"]
    )
    .expect("register admin_logins_total")
});

pub fn outcome<T, E>(res: &Result<T, E>) -> &'static str {
    if res.is_ok() { "ok" } else { "error" }
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
