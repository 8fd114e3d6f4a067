//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::controller::{CameraStatus, ScanSession, ScanStats};
use crate::verification::Classification;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of scanner state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the camera is currently decoding.
    pub camera_active: bool,
    /// Whether a verification is in flight.
    pub verifying: bool,
    /// Seconds left on the duplicate-suppression cooldown.
    pub cooldown_remaining: u32,
    /// Controller counters.
    pub stats: ScanStats,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a controller's session and counters.
    pub fn from_session(session: &ScanSession, stats: &ScanStats) -> Self {
        Self {
            camera_active: session.camera_status() == CameraStatus::Active,
            verifying: session.is_verifying(),
            cooldown_remaining: session.cooldown_remaining(),
            stats: stats.clone(),
        }
    }
}

/// Prometheus metrics registry for the scanning station.
pub struct MetricsRegistry {
    registry: Registry,

    // Session gauges
    camera_active: IntGauge,
    verifying: IntGauge,
    cooldown_remaining: IntGauge,

    // Intake counters
    detections_total: IntCounter,
    suppressed_total: IntCounter,
    dispatched_total: IntCounter,
    rejected_busy_total: IntCounter,

    // Outcome counters
    verifications_total: IntCounterVec,
    failures_total: IntCounter,
    camera_faults_total: IntCounter,
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all scanner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let camera_active = IntGauge::new(
            "ticket_gate_camera_active",
            "Camera decoding status (1=active, 0=not active)",
        )?;
        let verifying = IntGauge::new(
            "ticket_gate_verifying",
            "Whether a verification request is in flight",
        )?;
        let cooldown_remaining = IntGauge::new(
            "ticket_gate_cooldown_remaining_seconds",
            "Seconds until the last code may be scanned again",
        )?;

        let detections_total = IntCounter::new(
            "ticket_gate_detections_total",
            "Non-empty codes reported by the scanner",
        )?;
        let suppressed_total = IntCounter::new(
            "ticket_gate_suppressed_total",
            "Detections ignored as duplicates during cooldown",
        )?;
        let dispatched_total = IntCounter::new(
            "ticket_gate_verifications_dispatched_total",
            "Verification requests sent",
        )?;
        let rejected_busy_total = IntCounter::new(
            "ticket_gate_verifications_rejected_busy_total",
            "Verification attempts refused while another was in flight",
        )?;

        let verifications_total = IntCounterVec::new(
            Opts::new(
                "ticket_gate_verifications_total",
                "Completed verifications by outcome",
            ),
            &["outcome"],
        )?;
        let failures_total = IntCounter::new(
            "ticket_gate_verification_failures_total",
            "Verification requests that returned an error",
        )?;
        let camera_faults_total = IntCounter::new(
            "ticket_gate_camera_faults_total",
            "Runtime faults reported by the camera",
        )?;

        registry.register(Box::new(camera_active.clone()))?;
        registry.register(Box::new(verifying.clone()))?;
        registry.register(Box::new(cooldown_remaining.clone()))?;
        registry.register(Box::new(detections_total.clone()))?;
        registry.register(Box::new(suppressed_total.clone()))?;
        registry.register(Box::new(dispatched_total.clone()))?;
        registry.register(Box::new(rejected_busy_total.clone()))?;
        registry.register(Box::new(verifications_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(camera_faults_total.clone()))?;

        // Pre-create every outcome so they show up as zero.
        for classification in Classification::ALL {
            verifications_total.with_label_values(&[classification.as_str()]);
        }

        Ok(Self {
            registry,
            camera_active,
            verifying,
            cooldown_remaining,
            detections_total,
            suppressed_total,
            dispatched_total,
            rejected_busy_total,
            verifications_total,
            failures_total,
            camera_faults_total,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Counters only move forward; a snapshot older than the last one
    /// leaves them untouched.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.camera_active.set(i64::from(snapshot.camera_active));
        self.verifying.set(i64::from(snapshot.verifying));
        self.cooldown_remaining.set(i64::from(snapshot.cooldown_remaining));

        let stats = &snapshot.stats;
        advance(&self.detections_total, stats.detections);
        advance(&self.suppressed_total, stats.suppressed);
        advance(&self.dispatched_total, stats.dispatched);
        advance(&self.rejected_busy_total, stats.rejected_busy);
        advance(&self.failures_total, stats.failures);
        advance(&self.camera_faults_total, stats.camera_faults);

        for classification in Classification::ALL {
            let counter = self
                .verifications_total
                .with_label_values(&[classification.as_str()]);
            advance(&counter, stats.count(classification));
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
