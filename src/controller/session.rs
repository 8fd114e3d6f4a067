//! Observable state of one scanning screen.

use serde::Serialize;

use crate::verification::{Classification, VerificationRecord};

/// Camera lifecycle as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    #[default]
    Idle,
    Starting,
    Active,
    Error,
}

impl CameraStatus {
    /// True if `start_camera` may be called.
    pub fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }
}

/// State of a scanning screen.
///
/// Read-only outside the controller. A verification result and an error
/// are never held at the same time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSession {
    camera_status: CameraStatus,
    is_scanning: bool,
    last_scanned_code: String,
    cooldown_remaining: u32,
    is_verifying: bool,
    verification_result: Option<VerificationRecord>,
    classification: Option<Classification>,
    last_error: Option<String>,
    manual_input: String,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera_status(&self) -> CameraStatus {
        self.camera_status
    }

    pub fn is_scanning(&self) -> bool {
        self.is_scanning
    }

    /// Most recently accepted code; empty once the cooldown has run out.
    pub fn last_scanned_code(&self) -> &str {
        &self.last_scanned_code
    }

    /// Whole seconds left before the same code is accepted again.
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    pub fn is_verifying(&self) -> bool {
        self.is_verifying
    }

    pub fn verification_result(&self) -> Option<&VerificationRecord> {
        self.verification_result.as_ref()
    }

    /// Classification of the current result.
    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn manual_input(&self) -> &str {
        &self.manual_input
    }

    /// True when a result or error is on screen.
    pub fn has_outcome(&self) -> bool {
        self.verification_result.is_some() || self.last_error.is_some()
    }

    /// True if a detection of `code` is to be ignored.
    pub fn suppresses(&self, code: &str) -> bool {
        code.is_empty() || (code == self.last_scanned_code && self.cooldown_remaining > 0)
    }

    pub(crate) fn set_manual_input(&mut self, input: String) {
        self.manual_input = input;
    }

    pub(crate) fn camera_starting(&mut self) {
        self.camera_status = CameraStatus::Starting;
        self.is_scanning = false;
        self.last_error = None;
    }

    pub(crate) fn camera_active(&mut self) {
        self.camera_status = CameraStatus::Active;
        self.is_scanning = true;
    }

    pub(crate) fn camera_failed(&mut self, message: String) {
        self.camera_status = CameraStatus::Error;
        self.is_scanning = false;
        self.set_error(message);
    }

    pub(crate) fn camera_idle(&mut self) {
        self.camera_status = CameraStatus::Idle;
        self.is_scanning = false;
    }

    /// Accepts `code` and (re)starts its cooldown.
    pub(crate) fn accept_code(&mut self, code: &str, cooldown_secs: u32) {
        self.last_scanned_code = code.to_string();
        self.cooldown_remaining = cooldown_secs;
    }

    /// One cooldown second elapsed. Returns true when the cooldown ended.
    pub(crate) fn tick_cooldown(&mut self) -> bool {
        if self.cooldown_remaining <= 1 {
            self.cooldown_remaining = 0;
            self.last_scanned_code.clear();
            return true;
        }
        self.cooldown_remaining -= 1;
        false
    }

    pub(crate) fn begin_verification(&mut self) {
        self.is_verifying = true;
        self.verification_result = None;
        self.classification = None;
        self.last_error = None;
    }

    pub(crate) fn end_verification(&mut self) {
        self.is_verifying = false;
    }

    pub(crate) fn set_result(
        &mut self,
        record: VerificationRecord,
        classification: Classification,
    ) {
        self.last_error = None;
        self.verification_result = Some(record);
        self.classification = Some(classification);
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.verification_result = None;
        self.classification = None;
        self.last_error = Some(message);
    }

    /// Dismisses the outcome and re-enables the last code immediately.
    pub(crate) fn clear_result(&mut self) {
        self.verification_result = None;
        self.classification = None;
        self.last_error = None;
        self.last_scanned_code.clear();
        self.cooldown_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{BookingStatus, PaymentStatus};

    fn record() -> VerificationRecord {
        VerificationRecord::new("T-1", "b-1", BookingStatus::Confirmed, PaymentStatus::Completed)
    }

    #[test]
    fn test_result_and_error_exclusive() {
        let mut session = ScanSession::new();

        session.set_result(record(), Classification::Valid);
        assert!(session.verification_result().is_some());
        assert!(session.last_error().is_none());

        session.set_error("Ticket not found".into());
        assert!(session.verification_result().is_none());
        assert!(session.classification().is_none());
        assert_eq!(session.last_error(), Some("Ticket not found"));

        session.set_result(record(), Classification::Valid);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_suppression_only_for_same_code_in_cooldown() {
        let mut session = ScanSession::new();
        assert!(session.suppresses(""));
        assert!(!session.suppresses("ABC123"));

        session.accept_code("ABC123", 5);
        assert!(session.suppresses("ABC123"));
        assert!(!session.suppresses("XYZ999"));
    }

    #[test]
    fn test_cooldown_expiry_clears_code() {
        let mut session = ScanSession::new();
        session.accept_code("ABC123", 3);

        assert!(!session.tick_cooldown());
        assert!(!session.tick_cooldown());
        assert_eq!(session.cooldown_remaining(), 1);
        assert_eq!(session.last_scanned_code(), "ABC123");

        assert!(session.tick_cooldown());
        assert_eq!(session.cooldown_remaining(), 0);
        assert_eq!(session.last_scanned_code(), "");
        assert!(!session.suppresses("ABC123"));
    }

    #[test]
    fn test_clear_result_resets_cooldown() {
        let mut session = ScanSession::new();
        session.accept_code("ABC123", 20);
        session.set_error("boom".into());

        session.clear_result();
        assert!(!session.has_outcome());
        assert_eq!(session.last_scanned_code(), "");
        assert_eq!(session.cooldown_remaining(), 0);
    }

    #[test]
    fn test_camera_failure_sets_error() {
        let mut session = ScanSession::new();
        session.camera_starting();
        assert!(!session.camera_status().can_start());

        session.camera_failed("Camera error: No camera available".into());
        assert_eq!(session.camera_status(), CameraStatus::Error);
        assert!(!session.is_scanning());
        assert!(session.camera_status().can_start());
    }
}
