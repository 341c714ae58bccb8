//! Clock Port
//!
//! Wall-clock time and blocking waits, so polling can run against simulated time.

use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Block the current thread for `duration`
    fn sleep(&self, duration: Duration);
}
