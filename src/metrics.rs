//! Prometheus metrics (default registry)

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

pub static WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_writes_total", "Total records written")
        .expect("register writes_total")
});

pub static READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_reads_total", "Total record lookups")
        .expect("register reads_total")
});

pub static READ_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_read_misses_total", "Total lookups for absent keys")
        .expect("register read_misses_total")
});

pub static DELETES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_deletes_total", "Total delete requests")
        .expect("register deletes_total")
});

pub static SNAPSHOT_SAVES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_snapshot_saves_total", "Total successful snapshot saves")
        .expect("register snapshot_saves_total")
});

pub static SNAPSHOT_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("ferrumkv_snapshot_failures_total", "Total failed snapshot saves")
        .expect("register snapshot_failures_total")
});

pub static RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("ferrumkv_records", "Records in the last saved snapshot")
        .expect("register records")
});

/// Render every registered metric in the Prometheus text format
pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
