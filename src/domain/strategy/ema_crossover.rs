//! Fast MA crossover: EMA-9 crossing EMA-21 on the evaluated bar.

use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const FAST: usize = 9;
const SLOW: usize = 21;

#[derive(Debug, Default)]
pub struct EmaCrossover;

impl EmaCrossover {
    pub fn new() -> EmaCrossover {
        EmaCrossover
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &'static str {
        "ema_crossover"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let (Some(fast), Some(slow), Some(last_fast), Some(last_slow)) = (
            ctx.cache.simple(ctx.bars, IndicatorType::Ema(FAST), ctx.index),
            ctx.cache.simple(ctx.bars, IndicatorType::Ema(SLOW), ctx.index),
            ctx.cache
                .simple(ctx.bars, IndicatorType::Ema(FAST), ctx.index - 1),
            ctx.cache
                .simple(ctx.bars, IndicatorType::Ema(SLOW), ctx.index - 1),
        ) else {
            return Decision::Hold;
        };

        match ctx.bias {
            Bias::Bullish if last_fast <= last_slow && fast > slow => Decision::Buy,
            Bias::Bearish if last_fast >= last_slow && fast < slow => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}
