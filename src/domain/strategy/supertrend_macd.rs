//! Trend-following strategy: supertrend direction agreeing with the bias,
//! confirmed by MACD relative to its signal line.

use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::supertrend::{DEFAULT_MULT_X100, DEFAULT_PERIOD};
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

#[derive(Debug, Default)]
pub struct SupertrendMacd;

impl SupertrendMacd {
    pub fn new() -> SupertrendMacd {
        SupertrendMacd
    }
}

impl Strategy for SupertrendMacd {
    fn name(&self) -> &'static str {
        "supertrend_macd"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let Some(direction) = ctx.cache.supertrend_direction_at(
            ctx.bars,
            DEFAULT_PERIOD,
            DEFAULT_MULT_X100,
            ctx.index,
        ) else {
            return Decision::Hold;
        };
        let Some((macd, signal)) = ctx.cache.macd_at(
            ctx.bars,
            DEFAULT_FAST,
            DEFAULT_SLOW,
            DEFAULT_SIGNAL,
            ctx.index,
        ) else {
            return Decision::Hold;
        };

        let (wanted_direction, macd_ok) = match ctx.bias {
            Bias::Bullish => (1, macd > signal),
            Bias::Bearish => (-1, macd < signal),
            Bias::Neutral => return Decision::Hold,
        };

        if direction == wanted_direction && macd_ok {
            Decision::for_bias(ctx.bias)
        } else {
            Decision::Hold
        }
    }
}
