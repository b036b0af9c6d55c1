//! Default multi-vote strategy: a CPR breakout in the bias direction,
//! confirmed by at least one of EMA-50 position or RSI momentum.

use crate::domain::indicator::checks::check_cpr_breakout;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const EMA_PERIOD: usize = 50;
const RSI_PERIOD: usize = 14;
const RSI_BULLISH: f64 = 55.0;
const RSI_BEARISH: f64 = 45.0;

#[derive(Debug, Default)]
pub struct PivotConfluence;

impl PivotConfluence {
    pub fn new() -> PivotConfluence {
        PivotConfluence
    }
}

impl Strategy for PivotConfluence {
    fn name(&self) -> &'static str {
        "pivot_confluence"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }
        let Some(pivots) = ctx.pivots else {
            return Decision::Hold;
        };

        let breakout = check_cpr_breakout(ctx.bars, pivots, ctx.index);
        if !breakout.agrees_with(ctx.bias) {
            return Decision::Hold;
        }

        let close = ctx.bars[ctx.index].close;
        let ema = ctx
            .cache
            .simple(ctx.bars, IndicatorType::Ema(EMA_PERIOD), ctx.index);
        let rsi = ctx
            .cache
            .simple(ctx.bars, IndicatorType::Rsi(RSI_PERIOD), ctx.index);

        let mut confirmations = 0;
        match ctx.bias {
            Bias::Bullish => {
                if ema.is_some_and(|e| close > e) {
                    confirmations += 1;
                }
                if rsi.is_some_and(|r| r > RSI_BULLISH) {
                    confirmations += 1;
                }
            }
            Bias::Bearish => {
                if ema.is_some_and(|e| close < e) {
                    confirmations += 1;
                }
                if rsi.is_some_and(|r| r < RSI_BEARISH) {
                    confirmations += 1;
                }
            }
            Bias::Neutral => return Decision::Hold,
        }

        if confirmations >= 1 {
            Decision::for_bias(ctx.bias)
        } else {
            Decision::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pivot::PivotLevels;
    use crate::domain::strategy::test_support::{evaluate_latest, flat_bars};

    fn pivots() -> PivotLevels {
        PivotLevels::from_prev_session(102.0, 98.0, 100.0)
    }

    // pivots() yields tc = bc = 100.

    fn rising_through_tc(p: &PivotLevels) -> Vec<f64> {
        // Monotonic rise ending with two closes above tc; all-gain RSI (100)
        // carries the confirmation while EMA-50 is still warming up.
        let mut closes: Vec<f64> = (0..20).map(|i| p.tc - 9.5 + i as f64 * 0.5).collect();
        closes.push(p.tc + 0.5);
        closes.push(p.tc + 1.0);
        closes
    }

    #[test]
    fn buy_on_breakout_with_rising_closes() {
        let p = pivots();
        let bars = flat_bars(&rising_through_tc(&p));
        let mut s = PivotConfluence::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, Some(&p)),
            Decision::Buy
        );
    }

    #[test]
    fn sell_on_breakdown() {
        let p = pivots();
        // Monotonic decline ending with two closes below bc; all-loss RSI (0).
        let mut closes: Vec<f64> = (0..20).map(|i| p.bc + 9.5 - i as f64 * 0.5).collect();
        closes.push(p.bc - 0.5);
        closes.push(p.bc - 1.0);
        let bars = flat_bars(&closes);
        let mut s = PivotConfluence::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bearish, Some(&p)),
            Decision::Sell
        );
    }

    #[test]
    fn holds_when_breakout_disagrees_with_bias() {
        let p = pivots();
        let bars = flat_bars(&rising_through_tc(&p));
        let mut s = PivotConfluence::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bearish, Some(&p)),
            Decision::Hold
        );
    }

    #[test]
    fn holds_without_pivots() {
        let bars = flat_bars(&[100.0, 101.0, 102.0]);
        let mut s = PivotConfluence::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, None),
            Decision::Hold
        );
    }

    #[test]
    fn holds_below_min_index() {
        let p = pivots();
        let bars = flat_bars(&[p.tc + 2.0]);
        let mut s = PivotConfluence::new();
        assert_eq!(
            evaluate_latest(&mut s, &bars, Bias::Bullish, Some(&p)),
            Decision::Hold
        );
    }
}
