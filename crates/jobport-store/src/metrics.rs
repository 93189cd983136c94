//! Store request metrics.
//!
//! Request counters by operation, table and status, plus latency
//! histograms by operation.

use metrics::{counter, histogram};

/// Metric name constants.
pub mod names {
    /// Total store requests by operation, table and status.
    pub const REQUESTS_TOTAL: &str = "store_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "store_latency_seconds";
}

/// Record metrics for a completed store request.
pub fn record_request(operation: &str, table: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "table" => table.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.starts_with("store_"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_request("list_jobs", "jobs", 200, 12.0);
    }
}
