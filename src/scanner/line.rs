//! Line-oriented scanner driver.
//!
//! Handheld USB/Bluetooth scanners in keyboard-wedge mode type each
//! decoded payload followed by a newline. This driver treats any async
//! reader the same way: every line is one decoded payload.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::driver::{
    CameraDescriptor, CameraSelector, DecodeSink, DriverError, DriverState, FacingMode,
    ScannerDriver,
};
use super::ScanConfig;

const DEVICE_ID: &str = "line-input";

/// Scanner driver reading decoded payloads line by line.
pub struct LineScanner<R> {
    label: String,
    lines: Option<Lines<R>>,
    task: Option<DecodeTask<R>>,
    paused: bool,
}

struct DecodeTask<R> {
    cancel: watch::Sender<bool>,
    pause: watch::Sender<bool>,
    handle: JoinHandle<Option<Lines<R>>>,
}

impl<R> LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    /// Creates a driver over `reader`, reported under `label`.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            lines: Some(reader.lines()),
            task: None,
            paused: false,
        }
    }

    async fn join_task(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.cancel.send(true);
            match task.handle.await {
                Ok(lines) => self.lines = lines,
                Err(e) => tracing::warn!(error = %e, "Line reader task failed"),
            }
        }
    }
}

impl LineScanner<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Driver over the process's standard input.
    pub fn stdin() -> Self {
        Self::new(
            tokio::io::BufReader::new(tokio::io::stdin()),
            "Handheld scanner (rear)",
        )
    }
}

async fn read_lines<R>(
    mut lines: Lines<R>,
    sink: DecodeSink,
    mut cancel: watch::Receiver<bool>,
    pause: watch::Receiver<bool>,
) -> Option<Lines<R>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        tokio::select! {
            _ = cancel.changed() => return Some(lines),
            next = lines.next_line() => match next {
                Ok(Some(line)) => {
                    let payload = line.trim();
                    let paused = *pause.borrow();
                    if payload.is_empty() {
                        sink.frame_error("blank line");
                    } else if paused {
                        sink.frame_error("paused");
                    } else if !sink.decoded(payload) {
                        return Some(lines);
                    }
                }
                Ok(None) => {
                    sink.fault("scanner input closed");
                    return None;
                }
                Err(e) => {
                    sink.fault(format!("scanner input failed: {e}"));
                    return None;
                }
            },
        }
    }
}

#[async_trait]
impl<R> ScannerDriver for LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn list_cameras(&mut self) -> Result<Vec<CameraDescriptor>, DriverError> {
        Ok(vec![CameraDescriptor::new(DEVICE_ID, self.label.clone())])
    }

    async fn start(
        &mut self,
        selector: &CameraSelector,
        config: &ScanConfig,
        sink: DecodeSink,
    ) -> Result<(), DriverError> {
        match selector {
            CameraSelector::Id(id) if id == DEVICE_ID => {}
            CameraSelector::Facing(FacingMode::Environment) => {}
            other => return Err(DriverError::DeviceNotFound(other.to_string())),
        }
        if self.task.is_some() {
            return Err(DriverError::StartFailed("already running".into()));
        }
        let lines = self
            .lines
            .take()
            .ok_or_else(|| DriverError::DeviceNotFound("scanner input closed".into()))?;

        let (cancel, cancel_rx) = watch::channel(false);
        let (pause, pause_rx) = watch::channel(false);
        let handle = tokio::spawn(read_lines(lines, sink, cancel_rx, pause_rx));
        self.task = Some(DecodeTask {
            cancel,
            pause,
            handle,
        });
        self.paused = false;

        tracing::info!(%selector, label = %self.label, fps = config.fps, "Line scanner started");
        Ok(())
    }

    fn state(&self) -> DriverState {
        match (&self.task, self.paused) {
            (None, _) => DriverState::NotStarted,
            (Some(_), true) => DriverState::Paused,
            (Some(_), false) => DriverState::Scanning,
        }
    }

    /// Lines read while paused are consumed and dropped.
    async fn stop(&mut self) -> Result<(), DriverError> {
        if let Some(task) = &self.task {
            let _ = task.pause.send(true);
        }
        self.paused = true;
        Ok(())
    }

    async fn release(&mut self) -> Result<(), DriverError> {
        self.join_task().await;
        self.paused = false;
        tracing::info!(label = %self.label, "Line scanner released");
        Ok(())
    }
}

impl<R> Drop for LineScanner<R> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DriverEvent;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_lines_become_decodes() {
        let input: &'static [u8] = b"T-001\n\n  T-002  \n";
        let mut scanner = LineScanner::new(input, "test input");
        let (sink, mut rx) = DecodeSink::channel();

        let cameras = scanner.list_cameras().await.unwrap();
        assert_eq!(cameras.len(), 1);

        scanner
            .start(&CameraSelector::Id(cameras[0].id.clone()), &ScanConfig::default(), sink)
            .await
            .unwrap();
        assert_eq!(scanner.state(), DriverState::Scanning);

        assert_eq!(rx.recv().await, Some(DriverEvent::Decoded("T-001".into())));
        assert_eq!(rx.recv().await, Some(DriverEvent::Decoded("T-002".into())));
        assert!(matches!(rx.recv().await, Some(DriverEvent::Fault(_))));

        scanner.release().await.unwrap();
        assert_eq!(scanner.state(), DriverState::NotStarted);
    }

    #[tokio::test]
    async fn test_stop_drops_later_lines() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut scanner = LineScanner::new(tokio::io::BufReader::new(reader), "test input");
        let (sink, mut rx) = DecodeSink::channel();

        scanner
            .start(
                &CameraSelector::Facing(FacingMode::Environment),
                &ScanConfig::default(),
                sink,
            )
            .await
            .unwrap();

        writer.write_all(b"T-001\n").await.unwrap();
        assert_eq!(rx.recv().await, Some(DriverEvent::Decoded("T-001".into())));

        scanner.stop().await.unwrap();
        assert_eq!(scanner.state(), DriverState::Paused);

        writer.write_all(b"T-002\n").await.unwrap();
        drop(writer);
        assert!(matches!(rx.recv().await, Some(DriverEvent::Fault(_))));
    }

    #[tokio::test]
    async fn test_user_facing_refused() {
        let input: &'static [u8] = b"";
        let mut scanner = LineScanner::new(input, "test input");
        let (sink, _rx) = DecodeSink::channel();

        let result = scanner
            .start(&CameraSelector::Facing(FacingMode::User), &ScanConfig::default(), sink)
            .await;
        assert!(matches!(result, Err(DriverError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn test_release_when_idle() {
        let input: &'static [u8] = b"";
        let mut scanner = LineScanner::new(input, "test input");
        scanner.stop().await.unwrap();
        scanner.release().await.unwrap();
        assert_eq!(scanner.state(), DriverState::NotStarted);
    }
}
