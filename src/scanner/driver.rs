//! Scanner driver abstraction.
//!
//! A driver owns a video source and a QR decoder. It reports decoded
//! payloads through a [`DecodeSink`] rather than returning them, since
//! decoding runs continuously once started.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::ScanConfig;

/// Errors that can occur during driver operations.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("viewfinder element not ready")]
    NotReady,
    #[error("failed to start decoding: {0}")]
    StartFailed(String),
    #[error("failed to stop decoding: {0}")]
    StopFailed(String),
    #[error("failed to enumerate cameras: {0}")]
    EnumerationFailed(String),
}

/// A camera reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    /// Opaque platform identifier.
    pub id: String,
    /// Human-readable label, e.g. "Back Camera".
    pub label: String,
}

impl CameraDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// True if the label suggests a rear-facing camera.
    pub fn is_rear_facing(&self) -> bool {
        let label = self.label.to_lowercase();
        ["back", "rear", "environment"]
            .iter()
            .any(|hint| label.contains(hint))
    }
}

/// Camera facing preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacingMode {
    Environment,
    User,
}

/// Which camera a driver should open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CameraSelector {
    /// A specific device from [`ScannerDriver::list_cameras`].
    Id(String),
    /// Any device facing the given way.
    Facing(FacingMode),
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "camera {id}"),
            Self::Facing(FacingMode::Environment) => f.write_str("environment-facing camera"),
            Self::Facing(FacingMode::User) => f.write_str("user-facing camera"),
        }
    }
}

/// Driver lifecycle as reported by the driver itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    NotStarted,
    Scanning,
    Paused,
}

/// Events a running driver reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A payload was decoded from the current frame.
    Decoded(String),
    /// The video source failed while running.
    Fault(String),
}

/// Callback handle given to a driver on start.
///
/// Cloneable so drivers can move it into their decode task.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    tx: mpsc::UnboundedSender<DriverEvent>,
}

impl DecodeSink {
    /// Creates a sink and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DriverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Reports a decoded payload. Returns false once the owner has
    /// stopped listening.
    pub fn decoded(&self, payload: impl Into<String>) -> bool {
        self.tx.send(DriverEvent::Decoded(payload.into())).is_ok()
    }

    /// Per-frame "nothing decodable" notification. Never surfaced.
    pub fn frame_error(&self, reason: &str) {
        tracing::trace!(reason, "No code in frame");
    }

    /// Reports a runtime fault of the video source.
    pub fn fault(&self, message: impl Into<String>) -> bool {
        self.tx.send(DriverEvent::Fault(message.into())).is_ok()
    }

    /// True once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Trait for scanner implementations.
///
/// `stop` and `release` must be safe to call when nothing is running.
#[async_trait]
pub trait ScannerDriver: Send {
    /// Lists available cameras.
    async fn list_cameras(&mut self) -> Result<Vec<CameraDescriptor>, DriverError>;

    /// Begins continuous decoding from the selected camera.
    async fn start(
        &mut self,
        selector: &CameraSelector,
        config: &ScanConfig,
        sink: DecodeSink,
    ) -> Result<(), DriverError>;

    /// Current driver state.
    fn state(&self) -> DriverState;

    /// Halts decoding.
    async fn stop(&mut self) -> Result<(), DriverError>;

    /// Frees the underlying media stream.
    async fn release(&mut self) -> Result<(), DriverError>;
}

/// Scripted driver for tests and demos.
#[derive(Debug, Default)]
pub struct MockScanner {
    cameras: Vec<CameraDescriptor>,
    enumeration_fails: bool,
    refused: HashSet<CameraSelector>,
    fail_stop: bool,
    state: DriverState,
    sink: Option<DecodeSink>,
    attempts: Vec<CameraSelector>,
    stop_calls: u32,
    release_calls: u32,
}

impl MockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver exposing the given cameras.
    pub fn with_cameras(cameras: Vec<CameraDescriptor>) -> Self {
        Self {
            cameras,
            ..Self::default()
        }
    }

    /// Makes `list_cameras` fail.
    pub fn fail_enumeration(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    /// Makes `start` fail for the given selector.
    pub fn refuse(mut self, selector: CameraSelector) -> Self {
        self.refused.insert(selector);
        self
    }

    /// Makes `stop` and `release` fail (state is still reset).
    pub fn fail_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Feeds a decoded payload as if read from the camera.
    pub fn emit(&self, payload: &str) -> bool {
        match (&self.sink, self.state) {
            (Some(sink), DriverState::Scanning) => sink.decoded(payload),
            _ => false,
        }
    }

    /// Simulates a runtime fault of the video source.
    pub fn emit_fault(&self, message: &str) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.fault(message))
    }

    /// Selectors passed to `start`, in order.
    pub fn attempts(&self) -> &[CameraSelector] {
        &self.attempts
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls
    }

    pub fn release_calls(&self) -> u32 {
        self.release_calls
    }
}

#[async_trait]
impl ScannerDriver for MockScanner {
    async fn list_cameras(&mut self) -> Result<Vec<CameraDescriptor>, DriverError> {
        if self.enumeration_fails {
            return Err(DriverError::EnumerationFailed("mock enumeration failure".into()));
        }
        Ok(self.cameras.clone())
    }

    async fn start(
        &mut self,
        selector: &CameraSelector,
        config: &ScanConfig,
        sink: DecodeSink,
    ) -> Result<(), DriverError> {
        self.attempts.push(selector.clone());
        if self.refused.contains(selector) {
            return Err(DriverError::DeviceNotFound(selector.to_string()));
        }
        let ideal = config.ideal_resolution;
        let region = config.detection_region(ideal.width, ideal.height);
        self.sink = Some(sink);
        self.state = DriverState::Scanning;
        tracing::info!(%selector, fps = config.fps, region = region.width(), "MockScanner started");
        Ok(())
    }

    fn state(&self) -> DriverState {
        self.state
    }

    async fn stop(&mut self) -> Result<(), DriverError> {
        self.stop_calls += 1;
        if self.state == DriverState::Scanning {
            self.state = DriverState::Paused;
        }
        if self.fail_stop {
            return Err(DriverError::StopFailed("mock stop failure".into()));
        }
        Ok(())
    }

    async fn release(&mut self) -> Result<(), DriverError> {
        self.release_calls += 1;
        self.state = DriverState::NotStarted;
        self.sink = None;
        if self.fail_stop {
            return Err(DriverError::StopFailed("mock release failure".into()));
        }
        tracing::info!("MockScanner released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rear_facing_labels() {
        assert!(CameraDescriptor::new("a", "Back Camera").is_rear_facing());
        assert!(CameraDescriptor::new("b", "camera2 0, facing REAR").is_rear_facing());
        assert!(CameraDescriptor::new("c", "Environment cam").is_rear_facing());
        assert!(!CameraDescriptor::new("d", "FaceTime HD Camera").is_rear_facing());
    }

    #[tokio::test]
    async fn test_mock_scanner_lifecycle() {
        let mut scanner = MockScanner::new();
        let (sink, mut rx) = DecodeSink::channel();

        assert_eq!(scanner.state(), DriverState::NotStarted);
        assert!(!scanner.emit("T-1"));

        scanner
            .start(&CameraSelector::Facing(FacingMode::User), &ScanConfig::default(), sink)
            .await
            .unwrap();
        assert_eq!(scanner.state(), DriverState::Scanning);

        assert!(scanner.emit("T-1"));
        assert_eq!(rx.recv().await, Some(DriverEvent::Decoded("T-1".into())));

        scanner.stop().await.unwrap();
        assert_eq!(scanner.state(), DriverState::Paused);
        scanner.release().await.unwrap();
        assert_eq!(scanner.state(), DriverState::NotStarted);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_refused_selector() {
        let selector = CameraSelector::Facing(FacingMode::Environment);
        let mut scanner = MockScanner::new().refuse(selector.clone());
        let (sink, _rx) = DecodeSink::channel();

        let result = scanner.start(&selector, &ScanConfig::default(), sink).await;
        assert!(matches!(result, Err(DriverError::DeviceNotFound(_))));
        assert_eq!(scanner.state(), DriverState::NotStarted);
        assert_eq!(scanner.attempts(), &[selector]);
    }
}
