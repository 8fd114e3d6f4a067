//! Prometheus metrics exporter for the scanning station.
//!
//! # Metrics Exposed
//!
//! ## Session
//! - `ticket_gate_camera_active` - 1 while the camera is decoding
//! - `ticket_gate_verifying` - 1 while a verification is in flight
//! - `ticket_gate_cooldown_remaining_seconds` - Seconds left on the cooldown
//!
//! ## Intake
//! - `ticket_gate_detections_total` - Non-empty codes reported by the scanner
//! - `ticket_gate_suppressed_total` - Duplicates ignored during cooldown
//! - `ticket_gate_verifications_dispatched_total` - Requests sent
//! - `ticket_gate_verifications_rejected_busy_total` - Attempts refused while busy
//!
//! ## Outcomes
//! - `ticket_gate_verifications_total{outcome}` - Completed verifications
//! - `ticket_gate_verification_failures_total` - Requests that errored
//! - `ticket_gate_camera_faults_total` - Runtime camera faults
//!
//! The HTTP exporter requires the `metrics` feature.
//!
//! # Example
//!
//! ```no_run
//! use ticket_gate::controller::ScanStats;
//! use ticket_gate::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     camera_active: true,
//!     verifying: false,
//!     cooldown_remaining: 14,
//!     stats: ScanStats {
//!         detections: 12,
//!         valid: 9,
//!         ..ScanStats::default()
//!     },
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
