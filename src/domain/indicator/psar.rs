//! Parabolic SAR with Wilder's acceleration factor schedule.
//!
//! Maintains direction, extreme point and acceleration factor; the SAR is
//! clamped by the prior two bars' extremes and reverses when price pierces
//! it. Fixed parameters 0.02 / 0.02 / 0.20. Needs at least 2 bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

const AF_START: f64 = 0.02;
const AF_STEP: f64 = 0.02;
const AF_MAX: f64 = 0.20;

pub fn calculate_psar(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            timestamp: b.timestamp,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        })
        .collect();

    if bars.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Psar,
            values,
        };
    }

    let mut is_long = bars[1].close >= bars[0].close;
    let mut af = AF_START;
    let mut sar;
    let mut ep;
    if is_long {
        sar = bars[0].low;
        ep = bars[1].high;
    } else {
        sar = bars[0].high;
        ep = bars[1].low;
    }

    values[1] = IndicatorPoint {
        timestamp: bars[1].timestamp,
        valid: true,
        value: IndicatorValue::Simple(sar),
    };

    for i in 2..bars.len() {
        let mut new_sar = sar + af * (ep - sar);

        if is_long {
            // SAR may not sit above the prior two lows.
            new_sar = new_sar.min(bars[i - 1].low).min(bars[i - 2].low);
            if bars[i].low < new_sar {
                is_long = false;
                new_sar = ep;
                ep = bars[i].low;
                af = AF_START;
            } else if bars[i].high > ep {
                ep = bars[i].high;
                af = (af + AF_STEP).min(AF_MAX);
            }
        } else {
            // SAR may not sit below the prior two highs.
            new_sar = new_sar.max(bars[i - 1].high).max(bars[i - 2].high);
            if bars[i].high > new_sar {
                is_long = true;
                new_sar = ep;
                ep = bars[i].high;
                af = AF_START;
            } else if bars[i].low < ep {
                ep = bars[i].low;
                af = (af + AF_STEP).min(AF_MAX);
            }
        }

        sar = new_sar;
        values[i] = IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid: true,
            value: IndicatorValue::Simple(sar),
        };
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Psar,
        values,
    }
}
