//! Wall-clock adapter.

use chrono::NaiveDateTime;
use std::time::Duration;

use crate::ports::clock_port::ClockPort;

#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), clock.now().date());
    }
}
