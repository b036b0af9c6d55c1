//! Prior-session breakout: a close crossing the previous day's high or low
//! on expanded volume.

use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const VOLUME_WINDOW: usize = 20;
const VOLUME_FACTOR: f64 = 1.2;

#[derive(Debug, Default)]
pub struct PrevDayBreakout;

impl PrevDayBreakout {
    pub fn new() -> PrevDayBreakout {
        PrevDayBreakout
    }
}

impl Strategy for PrevDayBreakout {
    fn name(&self) -> &'static str {
        "prev_day_breakout"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }
        let (Some(prev_high), Some(prev_low)) = ctx
            .pivots
            .map(|p| (p.prev_high, p.prev_low))
            .unwrap_or((None, None))
        else {
            return Decision::Hold;
        };
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
                if last.close < prev_high && current.close > prev_high && volume_ok =>
            {
                Decision::Buy
            }
            Bias::Bearish if last.close > prev_low && current.close < prev_low && volume_ok => {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::pivot::PivotLevels;
    use crate::domain::strategy::test_support::{evaluate_latest, ts};

    fn pivots() -> PivotLevels {
        PivotLevels::from_prev_session(110.0, 90.0, 100.0)
    }

    fn bars_crossing(level: f64, upward: bool, volume: i64) -> Vec<OhlcvBar> {
        let mut bars: Vec<OhlcvBar> = (0..25)
            .map(|i| OhlcvBar {
                timestamp: ts(i),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000,
            })
            .collect();
        let (last_close, current_close) = if upward {
            (level - 1.0, level + 1.0)
        } else {
            (level + 1.0, level - 1.0)
        };
        let n = bars.len();
        bars[n - 1].close = last_close;
        bars.push(OhlcvBar {
            timestamp: ts(n),
            open: last_close,
            high: last_close.max(current_close) + 0.5,
            low: last_close.min(current_close) - 0.5,
            close: current_close,
            volume,
        });
        bars
    }

    #[test]
    fn buys_crossing_prev_high_on_volume() {
        let p = pivots();
        let bars = bars_crossing(110.0, true, 5000);
        let mut s = PrevDayBreakout::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, Some(&p)),
            Decision::Buy
        );
    }

    #[test]
    fn sells_crossing_prev_low_on_volume() {
        let p = pivots();
        let bars = bars_crossing(90.0, false, 5000);
        let mut s = PrevDayBreakout::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bearish, Some(&p)),
            Decision::Sell
        );
    }

    #[test]
    fn holds_without_volume_expansion() {
        let p = pivots();
        let bars = bars_crossing(110.0, true, 1100);
        let mut s = PrevDayBreakout::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, Some(&p)),
            Decision::Hold
        );
    }

    #[test]
    fn holds_when_already_above_prev_high() {
        // No fresh cross: both closes beyond the level.
        let p = pivots();
        let mut bars = bars_crossing(110.0, true, 5000);
        let n = bars.len();
        bars[n - 2].close = 111.5;
        let mut s = PrevDayBreakout::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, Some(&p)),
            Decision::Hold
        );
    }

    #[test]
    fn holds_without_pivots() {
        let bars = bars_crossing(110.0, true, 5000);
        let mut s = PrevDayBreakout::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, None),
            Decision::Hold
        );
    }
}
