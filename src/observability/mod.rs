//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::server / pipeline::Engine produce:
//!     → logging.rs (structured log events, one access line per request)
//!     → metrics.rs (request counters, latency histograms, negotiation counts)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the access line and the trace span
//! - Metrics are cheap and become no-ops when no recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
