//! Database model definitions

mod booking;
mod facility;
mod profile;
mod review;
mod room;

pub use booking::*;
pub use facility::*;
pub use profile::*;
pub use review::*;
pub use room::*;

/// Fixed hold window for a pending booking, in minutes
///
/// This is a design constant, not a per-facility setting: the estimated
/// arrival time a guest enters never moves the expiry deadline
pub const BOOKING_HOLD_MINUTES: i64 = 15;

/// Hard cap on the amount of rows any list query will return
pub const QUERY_HARD_LIMIT: i64 = 100;
