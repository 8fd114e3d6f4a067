//! REST client for the booking platform.
//!
//! Every call maps failures onto [`ApiError`], whose `Display` text is
//! ready to show to door staff.

mod client;
mod error;
mod tickets;
mod types;
mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::{ApiError, ErrorMessages, Wording};
pub use tickets::TicketEndpoint;
pub use types::{
    Address, ChangePasswordRequest, Envelope, LoginResult, MessageResponse, RegisterRequest,
    RegisterResponse, RegisteredUser, Role, UpdateProfileRequest, User,
};
pub use users::UserApi;
