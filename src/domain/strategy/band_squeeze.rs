//! Band-squeeze breakout: volatility compression (band width under its own
//! average) resolved by a close beyond the band.

use crate::domain::indicator::bollinger::{bandwidth_at, DEFAULT_MULT_X100, DEFAULT_PERIOD};
use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{Bias, Decision};
use crate::domain::strategy::{Strategy, StrategyContext};

const BANDWIDTH_WINDOW: usize = 20;

#[derive(Debug, Default)]
pub struct BandSqueeze;

impl BandSqueeze {
    pub fn new() -> BandSqueeze {
        BandSqueeze
    }
}

impl Strategy for BandSqueeze {
    fn name(&self) -> &'static str {
        "band_squeeze"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision {
        if ctx.index < self.min_index() || ctx.index >= ctx.bars.len() {
            return Decision::Hold;
        }

        let bands = ctx.cache.get_or_compute(
            ctx.bars,
            IndicatorType::Bollinger {
                period: DEFAULT_PERIOD,
                stddev_mult_x100: DEFAULT_MULT_X100,
            },
        );
        let widths: Vec<Option<f64>> = (0..ctx.bars.len())
            .map(|i| bandwidth_at(bands, i))
            .collect();
        let (Some(width), Some(width_mean)) = (
            widths[ctx.index],
            rolling_mean(&widths, BANDWIDTH_WINDOW)[ctx.index],
        ) else {
            return Decision::Hold;
        };
        if width >= width_mean {
            return Decision::Hold;
        }

        let (Some((upper, _, lower)), Some((last_upper, _, last_lower))) = (
            band_triple(bands, ctx.index),
            band_triple(bands, ctx.index - 1),
        ) else {
            return Decision::Hold;
        };

        let close = ctx.bars[ctx.index].close;
        let last_close = ctx.bars[ctx.index - 1].close;
        match ctx.bias {
            Bias::Bullish if last_close < last_upper && close > upper => Decision::Buy,
            Bias::Bearish if last_close > last_lower && close < lower => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}

fn band_triple(
    series: &crate::domain::indicator::IndicatorSeries,
    index: usize,
) -> Option<(f64, f64, f64)> {
    use crate::domain::indicator::{IndicatorPoint, IndicatorValue};
    match series.values.get(index) {
        Some(IndicatorPoint {
            valid: true,
            value:
                IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                },
            ..
        }) => Some((*upper, *middle, *lower)),
        _ => None,
    }
}
