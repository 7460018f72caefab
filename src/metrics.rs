// ============================================================================
// Prometheus Metrics
// ============================================================================

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder, opts, register_int_counter};

pub static PROXIED_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "workforce_proxied_requests_total",
        "Total number of requests forwarded by the gateway"
    ))
    .unwrap()
});

pub static AUTH_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "workforce_auth_rejections_total",
        "Total number of requests rejected by token verification"
    ))
    .unwrap()
});

pub static UNVERIFIED_ACCEPTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "workforce_unverified_accepts_total",
        "Total number of tokens accepted without signature verification"
    ))
    .unwrap()
});

pub static EMPLOYEE_OPERATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "workforce_employee_operations_total",
        "Total number of completed employee aggregation operations"
    ))
    .unwrap()
});

/// Gather all metrics in Prometheus text format.
pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
