//! Bollinger Bands.
//!
//! Middle = SMA(n), Upper/Lower = Middle ± multiplier × population stddev.
//! Defaults: period 20, multiplier 2.0. Warmup: first (n-1) bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let warmup = period - 1;
    let mult = stddev_mult_x100 as f64 / 100.0;
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let valid = i >= warmup;
        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];
            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Band width at one bar: (upper - lower) / middle. `None` during warmup or
/// when the middle band is zero.
pub fn bandwidth_at(series: &IndicatorSeries, index: usize) -> Option<f64> {
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
        }) if *middle != 0.0 => Some((upper - lower) / middle),
        _ => None,
    }
}
