//! HTTP server for the court booking service.
//!
//! Exposes the `court_booking` managers over a JSON API, with JWT bearer
//! authentication, request ids, structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
