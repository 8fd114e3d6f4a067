//! Ticket Gate Library
//!
//! QR ticket scanning and verification for movie-booking door staff.
//! Codes read by a camera (or typed in) are verified against the booking
//! platform and classified into an entry decision, with audio feedback.
//!
//! # Architecture
//!
//! ```text
//! scanner ──decoded codes──→ controller ──ticket code──→ api
//!                               │    ↑                    │
//!                               │    └──VerificationRecord┘
//!                               ↓
//!                 verification (classify) → feedback
//! ```
//!
//! # Design Principles
//!
//! - **Single flight**: at most one verification request outstanding
//! - **Duplicate suppression**: the same code is ignored during a cooldown
//! - **Explicit auth context**: the staff token travels in an [`AuthSession`]
//! - **Best-effort feedback**: audio never turns an outcome into an error
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticket_gate::{
//!     api::ApiClient,
//!     auth::AuthSession,
//!     controller::ScanController,
//!     feedback::TerminalBell,
//!     scanner::{ApiConfig, LineScanner, ScanConfig},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ApiConfig::default())?;
//! let session: AuthSession = client.users().restore("staff-token").await?;
//! let endpoint = Arc::new(client.ticket_endpoint(&session)?);
//!
//! let mut controller = ScanController::new(
//!     LineScanner::stdin(),
//!     endpoint,
//!     TerminalBell,
//!     ScanConfig::default(),
//! );
//! controller.start_camera().await?;
//!
//! while let Some(outcome) = controller.step().await {
//!     println!("{outcome:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod controller;
pub mod feedback;
pub mod metrics;
pub mod scanner;
pub mod verification;

// Re-export commonly used types at crate root
pub use api::{ApiClient, ApiError, TicketEndpoint};
pub use auth::AuthSession;
pub use controller::{CameraStatus, ScanController, ScanSession, StepOutcome};
pub use feedback::{AudioFeedback, Tone};
pub use scanner::{FileConfig, LineScanner, MockScanner, ScanConfig, ScannerDriver};
pub use verification::{Classification, VerificationEndpoint, VerificationRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
