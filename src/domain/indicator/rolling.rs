//! Rolling-window means over bar fields and derived series.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Rolling mean over an arbitrary value series. `None` until a full window
/// exists; `None` inputs poison their window.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().map(|v| v.unwrap_or(0.0)).sum();
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.volume as f64)).collect();
    series_from_means(
        bars,
        IndicatorType::VolumeSma(period),
        rolling_mean(&volumes, period),
    )
}

pub fn calculate_spread_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let spreads: Vec<Option<f64>> = bars.iter().map(|b| Some(b.spread())).collect();
    series_from_means(
        bars,
        IndicatorType::SpreadSma(period),
        rolling_mean(&spreads, period),
    )
}

fn series_from_means(
    bars: &[OhlcvBar],
    indicator_type: IndicatorType,
    means: Vec<Option<f64>>,
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(means)
        .map(|(bar, mean)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: mean.is_some(),
            value: IndicatorValue::Simple(mean.unwrap_or(0.0)),
        })
        .collect();
    IndicatorSeries {
        indicator_type,
        values,
    }
}
