//! Scanner and application configuration.
//!
//! The scanner runs at a deliberately low frame rate: handheld devices
//! decode reliably at 10 fps and the verification endpoint is the
//! bottleneck anyway.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::region::DetectionRegion;

/// Base URL of the booking platform API.
pub const DEFAULT_BASE_URL: &str = "https://bookmovie-5n6n.onrender.com";

/// Requested video resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Configuration for continuous QR decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Decode attempts per second.
    pub fps: u32,
    /// Detection box edge as a fraction of the shorter viewfinder edge.
    pub region_ratio: f64,
    /// Viewfinder aspect ratio (width / height).
    pub aspect_ratio: f64,
    /// Seconds during which a re-scan of the same code is ignored.
    pub cooldown_secs: u32,
    /// Preferred capture resolution.
    pub ideal_resolution: Resolution,
    /// Lowest acceptable capture resolution.
    pub min_resolution: Resolution,
    /// Highest acceptable capture resolution.
    pub max_resolution: Resolution,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            region_ratio: 0.6,
            aspect_ratio: 1.0,
            cooldown_secs: 20,
            ideal_resolution: Resolution::new(640, 480),
            min_resolution: Resolution::new(320, 240),
            max_resolution: Resolution::new(1280, 720),
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with a custom cooldown.
    pub fn with_cooldown(cooldown_secs: u32) -> Self {
        Self {
            cooldown_secs,
            ..Default::default()
        }
    }

    /// Cooldown window as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(u64::from(self.cooldown_secs))
    }

    /// Square detection region for a viewfinder of the given size.
    pub fn detection_region(
        &self,
        viewfinder_width: u32,
        viewfinder_height: u32,
    ) -> DetectionRegion {
        DetectionRegion::for_viewfinder(viewfinder_width, viewfinder_height, self.region_ratio)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > 60 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if !(0.3..=1.0).contains(&self.region_ratio) {
            return Err(ConfigError::InvalidRegionRatio(self.region_ratio));
        }
        if self.aspect_ratio.is_nan() || self.aspect_ratio <= 0.0 {
            return Err(ConfigError::InvalidAspectRatio);
        }
        if self.cooldown_secs == 0 {
            return Err(ConfigError::InvalidCooldown);
        }
        let (min, ideal, max) = (self.min_resolution, self.ideal_resolution, self.max_resolution);
        if min.width == 0
            || min.height == 0
            || min.width > ideal.width
            || min.height > ideal.height
            || ideal.width > max.width
            || ideal.height > max.height
        {
            return Err(ConfigError::InvalidResolution);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame rate (must be 1-60 fps)")]
    InvalidFrameRate,
    #[error("invalid detection region ratio {0} (must be 0.3-1.0)")]
    InvalidRegionRatio(f64),
    #[error("invalid aspect ratio")]
    InvalidAspectRatio,
    #[error("cooldown must be at least one second")]
    InvalidCooldown,
    #[error("resolutions must satisfy min <= ideal <= max")]
    InvalidResolution,
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scanner: ScanConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the booking platform.
    pub base_url: String,
    /// Transport timeout. Unset means no client-side timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Creates a config pointing at a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

/// Audio feedback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Play tones after each verification.
    pub enabled: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.api.validate()?;
        config.scanner.validate()?;
        Ok(config)
    }
}
