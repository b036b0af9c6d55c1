//! Opening-range breakout: the first minutes of the session define a range;
//! trade the first volume-backed close beyond it.
//!
//! The computed range is retained per session date and recomputed when the
//! evaluated bar belongs to a different date, so state never leaks across
//! days.

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const VOLUME_WINDOW: usize = 20;
const VOLUME_FACTOR: f64 = 1.5;
/// The natural stop for a range trade is the far side of the range; ranges
/// narrower than this are not worth the risk.
const MIN_RANGE_POINTS: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
struct OpeningRange {
    session: NaiveDate,
    high: f64,
    low: f64,
}

#[derive(Debug)]
pub struct OpeningRangeBreakout {
    session_open: NaiveTime,
    orb_minutes: u32,
    range: Option<OpeningRange>,
}

impl OpeningRangeBreakout {
    pub fn new(session_open: NaiveTime, orb_minutes: u32) -> OpeningRangeBreakout {
        OpeningRangeBreakout {
            session_open,
            orb_minutes,
            range: None,
        }
    }

    fn range_for(&mut self, ctx: &StrategyContext) -> Option<OpeningRange> {
        let session = ctx.bars[ctx.index].date();
        if let Some(range) = self.range {
            if range.session == session {
                return Some(range);
            }
            self.range = None;
        }

        let orb_end = self.session_open + Duration::minutes(self.orb_minutes as i64);
        if ctx.bars[ctx.index].time() < orb_end {
            return None;
        }

        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        for bar in ctx.bars {
            if bar.date() == session && bar.time() >= self.session_open && bar.time() <= orb_end {
                high = high.max(bar.high);
                low = low.min(bar.low);
            }
        }
        if low.is_infinite() {
            return None;
        }

        debug!(%session, high, low, "opening range set");
        let range = OpeningRange { session, high, low };
        self.range = Some(range);
        Some(range)
    }
}

impl Strategy for OpeningRangeBreakout {
    fn name(&self) -> &'static str {
        "opening_range_breakout"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }
        let Some(range) = self.range_for(ctx) else {
            return Decision::Hold;
        };
        if range.high - range.low < MIN_RANGE_POINTS {
            return Decision::Hold;
        }
        let Some(volume_mean) =
            ctx.cache
                .simple(ctx.bars, IndicatorType::VolumeSma(VOLUME_WINDOW), ctx.index)
        else {
            return Decision::Hold;
        };

        let current = &ctx.bars[ctx.index];
        let last = &ctx.bars[ctx.index - 1];
        let volume_ok = current.volume as f64 > volume_mean * VOLUME_FACTOR;

        match ctx.bias {
            Bias::Bullish
                if last.close < range.high && current.close > range.high && volume_ok =>
            {
                Decision::Buy
            }
            Bias::Bearish
                if last.close > range.low && current.close < range.low && volume_ok =>
            {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}
