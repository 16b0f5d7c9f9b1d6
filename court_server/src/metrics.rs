//! Prometheus metrics for monitoring the booking service.
//!
//! Counters are recorded unconditionally; they only leave the process when
//! [`init_metrics`] has installed the exporter.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts by method, path and status
//! - **Booking Metrics**: Bookings created, cancelled and rescheduled
//! - **Money Metrics**: Payments, refunds and top-ups
//! - **Auth Metrics**: Login attempts
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use court_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/bookings", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Errors
///
/// Returns an error message if the exporter cannot be installed
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Booking Metrics
// ============================================================================

pub fn bookings_created_total(court_id: i64) {
    metrics::counter!("bookings_created_total",
        "court_id" => court_id.to_string()
    )
    .increment(1);
}

pub fn bookings_cancelled_total() {
    metrics::counter!("bookings_cancelled_total").increment(1);
}

pub fn bookings_rescheduled_total() {
    metrics::counter!("bookings_rescheduled_total").increment(1);
}

/// Set current active bookings count.
pub fn active_bookings(count: usize) {
    metrics::gauge!("active_bookings").set(count as f64);
}

// ============================================================================
// Money Metrics
// ============================================================================

/// Record a settled invoice.
pub fn payments_total(method: &str, amount_cents: i64) {
    metrics::counter!("payments_total", "method" => method.to_string()).increment(1);
    metrics::counter!("payments_cents_total", "method" => method.to_string())
        .increment(amount_cents.max(0) as u64);
}

/// Record a refunded invoice.
pub fn refunds_total(amount_cents: i64) {
    metrics::counter!("refunds_total").increment(1);
    metrics::counter!("refunds_cents_total").increment(amount_cents.max(0) as u64);
}

/// Record a wallet deposit.
pub fn top_ups_total(method: &str, amount_cents: i64) {
    metrics::counter!("top_ups_total", "method" => method.to_string()).increment(1);
    metrics::counter!("top_ups_cents_total").increment(amount_cents.max(0) as u64);
}

/// Set current system account balance.
pub fn system_balance_cents(balance: i64) {
    metrics::gauge!("system_balance_cents").set(balance as f64);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}
