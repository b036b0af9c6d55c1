//! Volume-spread strategy: climactic volume on a wide-spread bar, read
//! through where the bar closed within its range.

use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const WINDOW: usize = 20;
const VOLUME_FACTOR: f64 = 1.3;

#[derive(Debug, Default)]
pub struct VolumeSpread;

impl VolumeSpread {
    pub fn new() -> VolumeSpread {
        VolumeSpread
    }
}

impl Strategy for VolumeSpread {
    fn name(&self) -> &'static str {
        "volume_spread"
    }

    fn min_index(&self) -> usize {
        20
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let last = ctx.index - 1;
        let Some(volume_mean) = ctx
            .cache
            .simple(ctx.bars, IndicatorType::VolumeSma(WINDOW), last)
        else {
            return Decision::Hold;
        };
        let Some(spread_mean) = ctx
            .cache
            .simple(ctx.bars, IndicatorType::SpreadSma(WINDOW), last)
        else {
            return Decision::Hold;
        };

        let last_candle = &ctx.bars[last];
        let is_high_volume = last_candle.volume as f64 > volume_mean * VOLUME_FACTOR;
        let is_wide_spread = last_candle.spread() > spread_mean;
        if !is_high_volume || !is_wide_spread {
            return Decision::Hold;
        }

        let range_midpoint = last_candle.low + last_candle.spread() * 0.5;
        match ctx.bias {
            // Sign of strength: selling bar absorbed, close held in the
            // upper half of the range.
            Bias::Bullish if last_candle.is_bearish() && last_candle.close > range_midpoint => {
                Decision::Buy
            }
            // Sign of weakness: buying bar rejected, close in the lower half.
            Bias::Bearish if last_candle.is_bullish() && last_candle.close < range_midpoint => {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}
