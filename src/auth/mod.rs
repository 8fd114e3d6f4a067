//! Authentication context.
//!
//! The logged-in identity is an explicit value passed to whatever needs
//! it. There is no process-wide token lookup.

mod session;

pub use session::AuthSession;
