//! OHLCV bar representation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// One completed price bar. Sequences are ordered by strictly increasing
/// timestamp with no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// |open - close|
    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    /// high - low
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Split an ordered bar sequence into per-session runs, preserving order.
pub fn split_sessions(bars: &[OhlcvBar]) -> Vec<(NaiveDate, &[OhlcvBar])> {
    let mut sessions: Vec<(NaiveDate, &[OhlcvBar])> = Vec::new();
    let mut start = 0;
    for i in 1..=bars.len() {
        if i == bars.len() || bars[i].date() != bars[start].date() {
            sessions.push((bars[start].date(), &bars[start..i]));
            start = i;
        }
    }
    sessions
}
