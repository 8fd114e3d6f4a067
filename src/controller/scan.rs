//! Scan-and-verify controller.
//!
//! Drives one [`ScanSession`]: camera lifecycle, decode intake, cooldown
//! suppression, single-flight verification and classification. All
//! mutation happens through `&mut self`, so the session is only ever
//! touched from one logical thread; asynchronous work (driver decoding,
//! verification calls, the cooldown timer) reports back through channels
//! drained by [`ScanController::step`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::cooldown::CooldownTimer;
use super::session::{CameraStatus, ScanSession};
use crate::api::ApiError;
use crate::feedback::{AudioFeedback, Tone};
use crate::scanner::{
    CameraSelector, DecodeSink, DriverError, DriverEvent, DriverState, FacingMode, ScanConfig,
    ScannerDriver,
};
use crate::verification::{Classification, VerificationEndpoint, VerificationRecord};

const VERIFY_FALLBACK: &str = "Failed to verify ticket";

/// Errors returned by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("camera is {0:?}; stop it before starting again")]
    CameraBusy(CameraStatus),
    #[error("Camera error: No camera available")]
    NoCamera(#[source] Option<DriverError>),
    #[error("scan session has been torn down")]
    Disposed,
}

/// What happened to a detected code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Empty payload.
    Empty,
    /// Same code as the last one, still cooling down.
    Suppressed,
    /// Accepted; `dispatched` is false if a verification was already
    /// in flight.
    Accepted { dispatched: bool },
}

/// Result of one [`ScanController::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Detected { code: String, detection: Detection },
    Verified(Classification),
    VerificationFailed(String),
    CooldownTick { remaining: u32 },
    CooldownExpired,
    CameraFault(String),
}

/// Running totals for metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub detections: u64,
    pub suppressed: u64,
    pub dispatched: u64,
    pub rejected_busy: u64,
    pub valid: u64,
    pub already_used: u64,
    pub payment_pending: u64,
    pub payment_cancelled: u64,
    pub invalid: u64,
    pub failures: u64,
    pub camera_faults: u64,
}

impl ScanStats {
    fn record(&mut self, classification: Classification) {
        let counter = match classification {
            Classification::Valid => &mut self.valid,
            Classification::AlreadyUsed => &mut self.already_used,
            Classification::PaymentPending => &mut self.payment_pending,
            Classification::PaymentCancelled => &mut self.payment_cancelled,
            Classification::Invalid => &mut self.invalid,
        };
        *counter += 1;
    }

    /// Count of verifications with the given classification.
    pub fn count(&self, classification: Classification) -> u64 {
        match classification {
            Classification::Valid => self.valid,
            Classification::AlreadyUsed => self.already_used,
            Classification::PaymentPending => self.payment_pending,
            Classification::PaymentCancelled => self.payment_cancelled,
            Classification::Invalid => self.invalid,
        }
    }
}

struct VerifyDone {
    generation: u64,
    outcome: Result<VerificationRecord, ApiError>,
}

enum Event {
    Driver(DriverEvent),
    Verified(VerifyDone),
    CooldownTick,
}

async fn next_driver_event(
    rx: &mut Option<mpsc::UnboundedReceiver<DriverEvent>>,
) -> Option<DriverEvent> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Controller for one scanning screen.
///
/// Must be used from within a tokio runtime: verification calls are
/// spawned as tasks.
pub struct ScanController<D, F> {
    session: ScanSession,
    config: ScanConfig,
    driver: D,
    endpoint: Arc<dyn VerificationEndpoint>,
    feedback: F,
    cooldown: CooldownTimer,
    driver_rx: Option<mpsc::UnboundedReceiver<DriverEvent>>,
    verify_tx: mpsc::UnboundedSender<VerifyDone>,
    verify_rx: mpsc::UnboundedReceiver<VerifyDone>,
    in_flight: Option<JoinHandle<()>>,
    generation: u64,
    stats: ScanStats,
    disposed: bool,
}

impl<D, F> std::fmt::Debug for ScanController<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanController")
            .field("session", &self.session)
            .field("generation", &self.generation)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<D, F> ScanController<D, F>
where
    D: ScannerDriver,
    F: AudioFeedback,
{
    /// Creates a controller with an idle camera.
    pub fn new(
        driver: D,
        endpoint: Arc<dyn VerificationEndpoint>,
        feedback: F,
        config: ScanConfig,
    ) -> Self {
        let (verify_tx, verify_rx) = mpsc::unbounded_channel();
        Self {
            session: ScanSession::new(),
            config,
            driver,
            endpoint,
            feedback,
            cooldown: CooldownTimer::new(),
            driver_rx: None,
            verify_tx,
            verify_rx,
            in_flight: None,
            generation: 0,
            stats: ScanStats::default(),
            disposed: false,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Selectors to try, most preferred first.
    async fn camera_candidates(&mut self) -> Vec<CameraSelector> {
        let mut candidates = Vec::with_capacity(3);
        match self.driver.list_cameras().await {
            Ok(cameras) => {
                tracing::debug!(count = cameras.len(), "Enumerated cameras");
                if let Some(rear) = cameras.iter().find(|c| c.is_rear_facing()) {
                    candidates.push(CameraSelector::Id(rear.id.clone()));
                }
            }
            Err(e) => tracing::warn!(error = %e, "Camera enumeration failed"),
        }
        candidates.push(CameraSelector::Facing(FacingMode::Environment));
        candidates.push(CameraSelector::Facing(FacingMode::User));
        candidates
    }

    /// Acquires a camera and begins continuous decoding.
    ///
    /// On failure the session moves to [`CameraStatus::Error`] with a
    /// message in `last_error`; calling again retries.
    pub async fn start_camera(&mut self) -> Result<(), ControllerError> {
        if self.disposed {
            return Err(ControllerError::Disposed);
        }
        let status = self.session.camera_status();
        if !status.can_start() {
            return Err(ControllerError::CameraBusy(status));
        }

        self.session.camera_starting();
        if self.driver.state() != DriverState::NotStarted {
            if let Err(e) = self.driver.release().await {
                tracing::warn!(error = %e, "Failed to release previous scanner state");
            }
        }

        let mut last_err = None;
        for selector in self.camera_candidates().await {
            let (sink, rx) = DecodeSink::channel();
            match self.driver.start(&selector, &self.config, sink).await {
                Ok(()) => {
                    self.driver_rx = Some(rx);
                    self.session.camera_active();
                    tracing::info!(%selector, fps = self.config.fps, "Camera active");
                    return Ok(());
                }
                Err(e) => {
                    tracing::info!(%selector, error = %e, "Camera unavailable, trying next");
                    last_err = Some(e);
                }
            }
        }

        let err = ControllerError::NoCamera(last_err);
        tracing::error!(error = %err, "Could not start any camera");
        self.session.camera_failed(err.to_string());
        Err(err)
    }

    /// Stops decoding and releases the camera. Never fails.
    pub async fn stop_camera(&mut self) {
        let state = self.driver.state();
        if state == DriverState::Scanning {
            if let Err(e) = self.driver.stop().await {
                tracing::warn!(error = %e, "Error stopping scanner");
            }
        }
        if state != DriverState::NotStarted {
            if let Err(e) = self.driver.release().await {
                tracing::warn!(error = %e, "Error releasing scanner");
            }
        }
        self.driver_rx = None;
        self.session.camera_idle();
    }

    /// Handles a decoded payload from the camera.
    pub fn on_code_detected(&mut self, code: &str) -> Detection {
        if self.disposed || code.trim().is_empty() {
            return Detection::Empty;
        }
        self.stats.detections += 1;
        if self.session.suppresses(code) {
            self.stats.suppressed += 1;
            tracing::trace!(
                code,
                remaining = self.session.cooldown_remaining(),
                "Duplicate scan ignored"
            );
            return Detection::Suppressed;
        }

        tracing::info!(code, "QR code detected");
        self.session.accept_code(code, self.config.cooldown_secs);
        self.cooldown.arm();
        Detection::Accepted {
            dispatched: self.verify(code),
        }
    }

    /// Starts verifying `code`. Returns false if the code is blank or a
    /// verification is already in flight; nothing is queued.
    pub fn verify(&mut self, code: &str) -> bool {
        let code = code.trim();
        if self.disposed || code.is_empty() {
            return false;
        }
        if self.session.is_verifying() {
            self.stats.rejected_busy += 1;
            tracing::debug!(code, "Verification already in flight");
            return false;
        }

        self.session.begin_verification();
        self.generation += 1;
        self.stats.dispatched += 1;

        let endpoint = Arc::clone(&self.endpoint);
        let tx = self.verify_tx.clone();
        let generation = self.generation;
        let code = code.to_string();
        tracing::debug!(code = %code, generation, "Verifying ticket");
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = endpoint.verify_ticket(&code).await;
            let _ = tx.send(VerifyDone { generation, outcome });
        }));
        true
    }

    /// Replaces the manual-entry field.
    pub fn set_manual_input(&mut self, input: impl Into<String>) {
        self.session.set_manual_input(input.into());
    }

    /// Verifies the manual-entry field.
    pub fn submit_manual(&mut self) -> bool {
        let input = self.session.manual_input().to_string();
        self.verify(&input)
    }

    /// Dismisses the current result or error and cancels the cooldown.
    pub fn clear_result(&mut self) {
        self.session.clear_result();
        self.cooldown.cancel();
    }

    /// Waits for the next event and applies it.
    ///
    /// Returns `None` once the controller has been torn down. Cancel-safe.
    pub async fn step(&mut self) -> Option<StepOutcome> {
        loop {
            if self.disposed {
                return None;
            }
            let event = tokio::select! {
                Some(done) = self.verify_rx.recv() => Event::Verified(done),
                driver = next_driver_event(&mut self.driver_rx) => match driver {
                    Some(event) => Event::Driver(event),
                    None => {
                        self.driver_rx = None;
                        continue;
                    }
                },
                _ = self.cooldown.tick() => Event::CooldownTick,
            };
            if let Some(outcome) = self.apply(event) {
                return Some(outcome);
            }
        }
    }

    fn apply(&mut self, event: Event) -> Option<StepOutcome> {
        match event {
            Event::Driver(DriverEvent::Decoded(code)) => {
                if self.session.camera_status() != CameraStatus::Active {
                    tracing::debug!(code = %code, "Decode after camera stopped, dropped");
                    return None;
                }
                let detection = self.on_code_detected(&code);
                Some(StepOutcome::Detected { code, detection })
            }
            Event::Driver(DriverEvent::Fault(message)) => {
                if self.session.camera_status() != CameraStatus::Active {
                    return None;
                }
                self.stats.camera_faults += 1;
                tracing::error!(error = %message, "Camera fault");
                self.session.camera_failed(format!("Camera error: {message}"));
                self.driver_rx = None;
                Some(StepOutcome::CameraFault(message))
            }
            Event::Verified(done) => self.finish_verification(done),
            Event::CooldownTick => {
                if self.session.tick_cooldown() {
                    self.cooldown.cancel();
                    tracing::debug!("Scan cooldown expired");
                    Some(StepOutcome::CooldownExpired)
                } else {
                    Some(StepOutcome::CooldownTick {
                        remaining: self.session.cooldown_remaining(),
                    })
                }
            }
        }
    }

    fn finish_verification(&mut self, done: VerifyDone) -> Option<StepOutcome> {
        if done.generation != self.generation {
            tracing::debug!(generation = done.generation, "Stale verification result dropped");
            return None;
        }
        self.in_flight = None;

        let outcome = match done.outcome {
            Ok(record) => {
                let classification = Classification::of(&record);
                tracing::info!(
                    code = %record.ticket_code,
                    booking = %record.booking_id,
                    outcome = classification.as_str(),
                    "Ticket verified"
                );
                self.stats.record(classification);
                self.session.set_result(record, classification);
                self.feedback.play_tone(classification.tone());
                self.session.set_manual_input(String::new());
                StepOutcome::Verified(classification)
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = VERIFY_FALLBACK.to_string();
                }
                tracing::warn!(error = %message, "Ticket verification failed");
                self.stats.failures += 1;
                self.session.set_error(message.clone());
                self.feedback.play_tone(Tone::Failure);
                StepOutcome::VerificationFailed(message)
            }
        };
        self.session.end_verification();
        Some(outcome)
    }

    /// Releases the camera, cancels timers and discards in-flight work.
    ///
    /// Every later operation is a no-op.
    pub async fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.stop_camera().await;
        self.cooldown.cancel();
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        self.generation += 1;
        self.disposed = true;
        tracing::info!("Scan session torn down");
    }
}

impl<D, F> Drop for ScanController<D, F> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
