//! Cooperative animation driver.

/// Clock state machine and run loop.
pub mod clock;
/// Time sources (real and manual).
pub mod time;
