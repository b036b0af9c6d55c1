//! Supertrend — ATR-banded directional indicator.
//!
//! Bands ratchet toward price: the upper band may only fall while closes stay
//! under it, the lower band may only rise while closes stay above it.
//! Direction flips when the close crosses the active band. Defaults 7 / 3.0.

use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 7;
pub const DEFAULT_MULT_X100: u32 = 300;

pub fn calculate_supertrend(
    bars: &[OhlcvBar],
    period: usize,
    multiplier_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Supertrend {
        period,
        multiplier_x100,
    };
    let multiplier = multiplier_x100 as f64 / 100.0;
    let atr = calculate_atr(bars, period);

    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());
    let mut upper_band = 0.0;
    let mut lower_band = 0.0;
    let mut trending_up = true;
    let mut started = false;

    for (i, bar) in bars.iter().enumerate() {
        let atr_val = match atr.simple_at(i) {
            Some(v) => v,
            None => {
                values.push(IndicatorPoint {
                    timestamp: bar.timestamp,
                    valid: false,
                    value: IndicatorValue::Supertrend {
                        level: 0.0,
                        direction: 0,
                    },
                });
                continue;
            }
        };

        let hl2 = (bar.high + bar.low) / 2.0;
        let basic_upper = hl2 + multiplier * atr_val;
        let basic_lower = hl2 - multiplier * atr_val;

        if !started {
            upper_band = basic_upper;
            lower_band = basic_lower;
            trending_up = true;
            started = true;
        } else {
            let prev_close = bars[i - 1].close;
            upper_band = if prev_close <= upper_band {
                basic_upper.min(upper_band)
            } else {
                basic_upper
            };
            lower_band = if prev_close >= lower_band {
                basic_lower.max(lower_band)
            } else {
                basic_lower
            };

            if trending_up && bar.close < lower_band {
                trending_up = false;
            } else if !trending_up && bar.close > upper_band {
                trending_up = true;
            }
        }

        let (level, direction) = if trending_up {
            (lower_band, 1)
        } else {
            (upper_band, -1)
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Supertrend { level, direction },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
