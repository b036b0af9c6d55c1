//! Momentum strategy anchored on session VWAP, confirmed by RSI.

use crate::domain::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const RSI_BULLISH: f64 = 55.0;
const RSI_BEARISH: f64 = 45.0;

#[derive(Debug, Default)]
pub struct VwapMomentum;

impl VwapMomentum {
    pub fn new() -> VwapMomentum {
        VwapMomentum
    }
}

impl Strategy for VwapMomentum {
    fn name(&self) -> &'static str {
        "vwap_momentum"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let Some(vwap) = ctx.cache.simple(ctx.bars, IndicatorType::Vwap, ctx.index) else {
            return Decision::Hold;
        };
        let Some(rsi) = ctx
            .cache
            .simple(ctx.bars, IndicatorType::Rsi(RSI_PERIOD), ctx.index)
        else {
            return Decision::Hold;
        };

        let close = ctx.bars[ctx.index].close;
        match ctx.bias {
            Bias::Bullish if close > vwap && rsi > RSI_BULLISH => Decision::Buy,
            Bias::Bearish if close < vwap && rsi < RSI_BEARISH => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{evaluate_latest, flat_bars};

    #[test]
    fn buys_above_vwap_with_momentum() {
        // Steady rise keeps price above the session VWAP with RSI at 100.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = flat_bars(&closes);
        let mut s = VwapMomentum::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, None),
            Decision::Buy
        );
    }

    #[test]
    fn sells_below_vwap_with_momentum() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let bars = flat_bars(&closes);
        let mut s = VwapMomentum::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bearish, None),
            Decision::Sell
        );
    }

    #[test]
    fn holds_against_bias() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = flat_bars(&closes);
        let mut s = VwapMomentum::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bearish, None),
            Decision::Hold
        );
    }

    #[test]
    fn holds_during_rsi_warmup() {
        let bars = flat_bars(&[100.0, 101.0, 102.0]);
        let mut s = VwapMomentum::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, None),
            Decision::Hold
        );
    }
}
