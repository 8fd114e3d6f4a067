//! Ticket verification records and classification.
//!
//! The booking platform answers a verification request with the booking's
//! current status; this module turns that answer into an entry decision.

mod classify;
mod record;

pub use classify::Classification;
pub use record::{
    BookingStatus, Customer, Movie, PaymentStatus, Screen, Seat, Showtime, Theater,
    VerificationRecord,
};

use async_trait::async_trait;

use crate::api::ApiError;

/// Remote capability that verifies a ticket code.
///
/// Implementations receive a trimmed, non-empty code.
#[async_trait]
pub trait VerificationEndpoint: Send + Sync {
    async fn verify_ticket(&self, ticket_code: &str) -> Result<VerificationRecord, ApiError>;
}
