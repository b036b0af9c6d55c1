//! Session-anchored volume-weighted average price.
//!
//! Cumulative typical-price×volume over cumulative volume, reset whenever
//! the bar date changes so multi-day slices never blend sessions.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_session_vwap(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;
    let mut session = None;

    for bar in bars {
        if session != Some(bar.date()) {
            session = Some(bar.date());
            cum_pv = 0.0;
            cum_vol = 0.0;
        }
        cum_pv += bar.typical_price() * bar.volume as f64;
        cum_vol += bar.volume as f64;

        let (valid, vwap) = if cum_vol > 0.0 {
            (true, cum_pv / cum_vol)
        } else {
            (false, 0.0)
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(vwap),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Vwap,
        values,
    }
}
