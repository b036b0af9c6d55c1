//! Two-candle and windowed pattern checks, each returning a [`Vote`].

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pivot::PivotLevels;
use crate::domain::signal::Vote;

pub const DIVERGENCE_LOOKBACK: usize = 30;

/// Sustained EMA crossover: close above the EMA on both the current and the
/// previous bar reads Bullish, the mirror reads Bearish.
pub fn check_ema_crossover(bars: &[OhlcvBar], ema: &IndicatorSeries, index: usize) -> Vote {
    if index == 0 || index >= bars.len() {
        return Vote::None;
    }
    let (Some(ema_now), Some(ema_prev)) = (ema.simple_at(index), ema.simple_at(index - 1)) else {
        return Vote::None;
    };
    let price = bars[index].close;
    let last_price = bars[index - 1].close;

    if price > ema_now && last_price > ema_prev {
        Vote::Bullish
    } else if price < ema_now && last_price < ema_prev {
        Vote::Bearish
    } else {
        Vote::None
    }
}

/// Windowed price/oscillator divergence over the trailing `lookback` bars
/// ending at `index`.
///
/// Bullish: price prints a new window low while the oscillator holds above
/// its own trailing minimum. Bearish is the mirror on highs. Requires at
/// least two valid oscillator values in the window.
pub fn check_divergence(
    bars: &[OhlcvBar],
    oscillator: &IndicatorSeries,
    index: usize,
    lookback: usize,
) -> Vote {
    if index >= bars.len() || lookback < 2 {
        return Vote::None;
    }
    let start = (index + 1).saturating_sub(lookback);
    if index == start {
        return Vote::None;
    }

    let Some(osc_last) = oscillator.simple_at(index) else {
        return Vote::None;
    };
    let prior_osc: Vec<f64> = (start..index)
        .filter_map(|i| oscillator.simple_at(i))
        .collect();
    if prior_osc.is_empty() {
        return Vote::None;
    }
    let osc_min = prior_osc.iter().cloned().fold(f64::INFINITY, f64::min);
    let osc_max = prior_osc.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let prior_low = bars[start..index]
        .iter()
        .map(|b| b.low)
        .fold(f64::INFINITY, f64::min);
    let prior_high = bars[start..index]
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if bars[index].low < prior_low && osc_last > osc_min {
        Vote::Bullish
    } else if bars[index].high > prior_high && osc_last < osc_max {
        Vote::Bearish
    } else {
        Vote::None
    }
}

/// CPR breakout: current and previous close both above tc reads Bullish,
/// both below bc reads Bearish.
pub fn check_cpr_breakout(bars: &[OhlcvBar], pivots: &PivotLevels, index: usize) -> Vote {
    if index == 0 || index >= bars.len() {
        return Vote::None;
    }
    let price = bars[index].close;
    let last_price = bars[index - 1].close;

    if price > pivots.tc && last_price > pivots.tc {
        Vote::Bullish
    } else if price < pivots.bc && last_price < pivots.bc {
        Vote::Bearish
    } else {
        Vote::None
    }
}
