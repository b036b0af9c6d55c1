//! Counter-trend strategy: an oversized move on elevated ATR, faded when the
//! last completed candle closed against the bias direction.

use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const ATR_PERIOD: usize = 14;
const ATR_MEAN_WINDOW: usize = 20;
const LARGE_MOVE_FACTOR: f64 = 1.5;

#[derive(Debug, Default)]
pub struct VolatilityReversal;

impl VolatilityReversal {
    pub fn new() -> VolatilityReversal {
        VolatilityReversal
    }
}

impl Strategy for VolatilityReversal {
    fn name(&self) -> &'static str {
        "volatility_reversal"
    }

    fn min_index(&self) -> usize {
        20
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        // Decisions key off the last completed candle, not the forming one.
        let last = ctx.index - 1;

        let atr_series = ctx
            .cache
            .get_or_compute(ctx.bars, IndicatorType::Atr(ATR_PERIOD));
        let atr_values: Vec<Option<f64>> = (0..ctx.bars.len())
            .map(|i| atr_series.simple_at(i))
            .collect();
        let Some(atr) = atr_values[last] else {
            return Decision::Hold;
        };
        let Some(atr_mean) = rolling_mean(&atr_values, ATR_MEAN_WINDOW)[last] else {
            return Decision::Hold;
        };

        let last_candle = &ctx.bars[last];
        let is_high_volatility = atr > atr_mean;
        let is_large_move = last_candle.body() > atr * LARGE_MOVE_FACTOR;

        match ctx.bias {
            Bias::Bullish if is_high_volatility && is_large_move && last_candle.is_bearish() => {
                Decision::Buy
            }
            Bias::Bearish if is_high_volatility && is_large_move && last_candle.is_bullish() => {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}
