//! Prometheus metrics for mock-api.
//!
//! Tracks public requests, applied behaviors and parked requests.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_int_gauge, CounterVec, Encoder, IntGauge, TextEncoder,
};

lazy_static! {
    /// Public requests by method and status actually sent (0 for resets)
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "mock_api_requests_total",
        "Total number of requests handled by the public listener",
        &["method", "status"]
    )
    .expect("mock_api_requests_total registers once");

    /// Behaviors applied to requests
    pub static ref BEHAVIORS_TOTAL: CounterVec = register_counter_vec!(
        "mock_api_behaviors_total",
        "Total number of advanced behaviors applied",
        &["behavior"]  // reject|timeout|hang|delay|respond|drop
    )
    .expect("mock_api_behaviors_total registers once");

    /// Requests currently parked
    pub static ref HANGING_REQUESTS: IntGauge = register_int_gauge!(
        "mock_api_hanging_requests",
        "Number of requests currently parked awaiting resolution"
    )
    .expect("mock_api_hanging_requests registers once");
}

/// Collect all metrics in Prometheus text format
pub fn collect_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Record a public request outcome
pub fn record_request(method: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[method_label(method), &status.to_string()])
        .inc();
}

/// Standard methods keep their name; anything else shares one label
fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "OTHER",
    }
}

/// Record an applied behavior
pub fn record_behavior(behavior: &str) {
    BEHAVIORS_TOTAL.with_label_values(&[behavior]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let before = REQUESTS_TOTAL.with_label_values(&["PATCH", "299"]).get();
        record_request("PATCH", 299);
        let after = REQUESTS_TOTAL.with_label_values(&["PATCH", "299"]).get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_extension_methods_share_a_label() {
        let before = REQUESTS_TOTAL.with_label_values(&["OTHER", "298"]).get();
        record_request("BREW", 298);
        record_request("X-CUSTOM-1", 298);
        let after = REQUESTS_TOTAL.with_label_values(&["OTHER", "298"]).get();
        assert_eq!(after - before, 2.0);
        assert_eq!(method_label("DELETE"), "DELETE");
    }

    #[test]
    fn test_collect_metrics_renders_text() {
        record_behavior("delay");
        let text = collect_metrics().unwrap();
        assert!(text.contains("mock_api_behaviors_total"));
    }
}
