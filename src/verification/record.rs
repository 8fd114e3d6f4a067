//! Verification records returned by the booking platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Used,
    Cancelled,
    #[serde(other)]
    Other,
}

/// Payment status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Cancelled,
    #[serde(other)]
    Other,
}

/// Result of verifying a ticket code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub ticket_code: String,
    pub booking_id: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub booking_time: DateTime<Utc>,
    pub verified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<Movie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theater: Option<Theater>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<Screen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showtime: Option<Showtime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seats: Vec<Seat>,
}

impl VerificationRecord {
    /// Minimal record without booking context.
    pub fn new(
        ticket_code: impl Into<String>,
        booking_id: impl Into<String>,
        status: BookingStatus,
        payment_status: PaymentStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            ticket_code: ticket_code.into(),
            booking_id: booking_id.into(),
            status,
            payment_status,
            booking_time: now,
            verified_at: now,
            user: None,
            movie: None,
            theater: None,
            screen: None,
            showtime: None,
            seats: Vec::new(),
        }
    }

    /// Seat labels such as `"F7"`, in booking order.
    pub fn seat_labels(&self) -> Vec<String> {
        self.seats
            .iter()
            .map(|seat| format!("{}{}", seat.row, seat.number))
            .collect()
    }

    /// Sum of seat prices.
    pub fn total_price(&self) -> f64 {
        self.seats.iter().map(|seat| seat.price).sum()
    }
}

/// Ticket holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Running time in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theater {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub screen_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    #[serde(rename = "_id")]
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub row: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub seat_type: String,
    pub price: f64,
}
