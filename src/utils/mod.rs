//! # Utility Modules
//!
//! Supporting utilities for logging, metrics and deadlines.
//!
//! ## Components
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe traffic and error counters
//! - **Timeout**: Async deadline wrappers for transport operations

pub mod logging;
pub mod metrics;
pub mod timeout;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
