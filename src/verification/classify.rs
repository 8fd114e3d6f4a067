//! Entry decision for a verification record.

use serde::Serialize;

use super::record::{BookingStatus, PaymentStatus, VerificationRecord};
use crate::feedback::Tone;

/// How the door should treat a verified ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Valid,
    AlreadyUsed,
    PaymentPending,
    PaymentCancelled,
    Invalid,
}

impl Classification {
    /// All variants, in rule order.
    pub const ALL: [Classification; 5] = [
        Self::AlreadyUsed,
        Self::PaymentPending,
        Self::PaymentCancelled,
        Self::Valid,
        Self::Invalid,
    ];

    /// Classifies a record. Rules are checked in order; first match wins.
    pub fn of(record: &VerificationRecord) -> Self {
        if record.status == BookingStatus::Used {
            Self::AlreadyUsed
        } else if record.payment_status == PaymentStatus::Pending {
            Self::PaymentPending
        } else if record.payment_status == PaymentStatus::Cancelled {
            Self::PaymentCancelled
        } else if record.status == BookingStatus::Confirmed
            && record.payment_status == PaymentStatus::Completed
        {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    pub fn allows_entry(self) -> bool {
        self == Self::Valid
    }

    /// Feedback tone for this outcome.
    pub fn tone(self) -> Tone {
        if self.allows_entry() {
            Tone::Success
        } else {
            Tone::Failure
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Valid => "Valid Ticket",
            Self::AlreadyUsed => "Ticket Already Used",
            Self::PaymentPending => "Payment Pending",
            Self::PaymentCancelled => "Payment Cancelled",
            Self::Invalid => "Invalid Ticket",
        }
    }

    /// Explanation naming the ticket, for outcomes with a specific cause.
    pub fn detail(self, ticket_code: &str) -> Option<String> {
        match self {
            Self::AlreadyUsed => Some(format!("Ticket code {ticket_code} has been used")),
            Self::PaymentPending => Some(format!(
                "Payment for ticket {ticket_code} is still pending"
            )),
            Self::PaymentCancelled => Some(format!(
                "Payment for ticket {ticket_code} has been cancelled"
            )),
            Self::Valid | Self::Invalid => None,
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::AlreadyUsed => "already_used",
            Self::PaymentPending => "payment_pending",
            Self::PaymentCancelled => "payment_cancelled",
            Self::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.headline())
    }
}
