//! Scan-and-verify state machine.
//!
//! [`ScanController`] owns a [`ScanSession`] and mediates everything that
//! changes it:
//!
//! - camera acquisition with rear-camera preference and fallback
//! - duplicate suppression for a cooldown window after each accepted code
//! - single-flight ticket verification
//! - outcome classification and audio feedback
//!
//! Events arrive asynchronously and are applied one at a time by
//! [`ScanController::step`].

mod cooldown;
mod scan;
mod session;

pub use cooldown::CooldownTimer;
pub use scan::{ControllerError, Detection, ScanController, ScanStats, StepOutcome};
pub use session::{CameraStatus, ScanSession};
