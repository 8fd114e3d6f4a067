//! Scanner input and configuration.
//!
//! This module provides the driver abstraction over cameras and QR
//! decoders, the scan configuration, and two concrete drivers: a
//! scripted mock and a line-oriented reader for handheld scanners.

mod config;
mod driver;
mod line;
mod region;

pub use config::{
    ApiConfig, ConfigError, FeedbackConfig, FileConfig, MetricsConfig, Resolution, ScanConfig,
    DEFAULT_BASE_URL,
};
pub use driver::{
    CameraDescriptor, CameraSelector, DecodeSink, DriverError, DriverEvent, DriverState,
    FacingMode, MockScanner, ScannerDriver,
};
pub use line::LineScanner;
pub use region::DetectionRegion;
