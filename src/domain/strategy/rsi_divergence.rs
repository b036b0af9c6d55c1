//! Pure divergence strategy: trade only price/RSI divergence in the bias
//! direction.

use crate::domain::indicator::checks::{check_divergence, DIVERGENCE_LOOKBACK};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::Decision;
use crate::domain::strategy::{Strategy, StrategyContext};

#[derive(Debug, Default)]
pub struct RsiDivergence;

impl RsiDivergence {
    pub fn new() -> RsiDivergence {
        RsiDivergence
    }
}

impl Strategy for RsiDivergence {
    fn name(&self) -> &'static str {
        "rsi_divergence"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let rsi = ctx
            .cache
            .get_or_compute(ctx.bars, IndicatorType::Rsi(RSI_PERIOD));
        let vote = check_divergence(ctx.bars, rsi, ctx.index, DIVERGENCE_LOOKBACK);

        if vote.agrees_with(ctx.bias) {
            Decision::for_bias(ctx.bias)
        } else {
            Decision::Hold
        }
    }
}
