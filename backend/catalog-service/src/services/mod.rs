//! Business logic layer.

pub mod clock;
pub mod ranking;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ranking::{RankingService, LAST_6_MONTHS_MIN_REVIEWS, LAST_MONTH_MIN_REVIEWS};
