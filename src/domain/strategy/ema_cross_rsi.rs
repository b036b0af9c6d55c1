//! Fast EMA cross with RSI confirmation: EMA-9 crossing EMA-15 on the
//! evaluated bar, RSI through the midline, close on the right side of EMA-9.

use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const FAST: usize = 9;
const SLOW: usize = 15;
const RSI_MIDLINE: f64 = 50.0;

#[derive(Debug, Default)]
pub struct EmaCrossRsi;

impl EmaCrossRsi {
    pub fn new() -> EmaCrossRsi {
        EmaCrossRsi
    }
}

impl Strategy for EmaCrossRsi {
    fn name(&self) -> &'static str {
        "ema_cross_rsi"
    }

    fn min_index(&self) -> usize {
        2
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let (Some(fast), Some(slow), Some(last_fast), Some(last_slow), Some(rsi)) = (
            ctx.cache.simple(ctx.bars, IndicatorType::Ema(FAST), ctx.index),
            ctx.cache.simple(ctx.bars, IndicatorType::Ema(SLOW), ctx.index),
            ctx.cache
                .simple(ctx.bars, IndicatorType::Ema(FAST), ctx.index - 1),
            ctx.cache
                .simple(ctx.bars, IndicatorType::Ema(SLOW), ctx.index - 1),
            ctx.cache
                .simple(ctx.bars, IndicatorType::Rsi(RSI_PERIOD), ctx.index),
        ) else {
            return Decision::Hold;
        };

        let close = ctx.bars[ctx.index].close;
        let was_below = last_fast < last_slow;
        let is_above = fast > slow;
        let was_above = last_fast > last_slow;
        let is_below = fast < slow;

        match ctx.bias {
            Bias::Bullish
                if was_below && is_above && rsi > RSI_MIDLINE && close > fast =>
            {
                Decision::Buy
            }
            Bias::Bearish
                if was_above && is_below && rsi < RSI_MIDLINE && close < fast =>
            {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}
