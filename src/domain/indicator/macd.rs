//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow), Signal Line = EMA(signal) of the MACD
//! line, Histogram = Line - Signal. Defaults 12/26/9.
//! Warmup: (slow - 1) + (signal - 1) bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let ema_fast = ema_raw(bars, fast);
    let ema_slow = ema_raw(bars, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    // Signal line: EMA of the MACD line, seeded once the slow EMA exists.
    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_line = vec![0.0; bars.len()];
    let macd_warmup = slow - 1;

    if macd_warmup + signal_period <= bars.len() {
        let seed: f64 = macd_line[macd_warmup..macd_warmup + signal_period]
            .iter()
            .sum::<f64>()
            / signal_period as f64;
        let mut signal_ema = seed;
        signal_line[macd_warmup + signal_period - 1] = signal_ema;
        for i in (macd_warmup + signal_period)..bars.len() {
            signal_ema = macd_line[i] * k + signal_ema * (1.0 - k);
            signal_line[i] = signal_ema;
        }
    }

    let warmup = slow - 1 + signal_period - 1;
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: i >= warmup,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Raw EMA values without validity: 0.0 through the warmup, SMA seed at
/// period-1, recursive afterwards.
fn ema_raw(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let mut out = vec![0.0; bars.len()];
    if bars.len() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = bars[..period].iter().map(|b| b.close).sum::<f64>() / period as f64;
    out[period - 1] = ema;
    for i in period..bars.len() {
        ema = bars[i].close * k + ema * (1.0 - k);
        out[i] = ema;
    }
    out
}
