//! Clock port trait: wall time and cycle pacing for the polling loop.

use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;

pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Suspend the calling loop between polling cycles.
    fn sleep(&self, duration: Duration);
}
