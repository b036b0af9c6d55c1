//! Technical indicator implementations.
//!
//! Every calculation is a pure function from an ordered bar slice to an
//! [`IndicatorSeries`] with one point per bar and an explicit validity flag
//! for the warmup window. [`IndicatorCache`] memoizes series per
//! (indicator, parameters) for one bar-slice snapshot, so repeated strategy
//! evaluations in a cycle never recompute a column and never mutate shared
//! state.

pub mod ema;
pub mod rsi;
pub mod atr;
pub mod macd;
pub mod bollinger;
pub mod supertrend;
pub mod psar;
pub mod vwap;
pub mod rolling;
pub mod checks;

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Supertrend {
        level: f64,
        /// +1 while trending up, -1 while trending down.
        direction: i8,
    },
}

/// Indicator identity plus parameters; doubles as the memo key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    VolumeSma(usize),
    SpreadSma(usize),
    Vwap,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Supertrend {
        period: usize,
        multiplier_x100: u32,
    },
    Psar,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLSMA({})", period),
            IndicatorType::SpreadSma(period) => write!(f, "SPREADSMA({})", period),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => write!(f, "BOLLINGER({},{})", period, *stddev_mult_x100 as f64 / 100.0),
            IndicatorType::Supertrend {
                period,
                multiplier_x100,
            } => write!(f, "SUPERTREND({},{})", period, *multiplier_x100 as f64 / 100.0),
            IndicatorType::Psar => write!(f, "PSAR"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The `Simple` value at `index`, if present and past warmup.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }
}

/// Lazily computed indicator columns for one bar-slice snapshot.
///
/// The cache is tied to the slice it was built against; callers create a
/// fresh cache whenever they fetch a new series and must not reuse it across
/// snapshots.
#[derive(Debug, Default)]
pub struct IndicatorCache {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorCache {
    pub fn new() -> IndicatorCache {
        IndicatorCache {
            series: HashMap::new(),
        }
    }

    pub fn get_or_compute(&mut self, bars: &[OhlcvBar], ty: IndicatorType) -> &IndicatorSeries {
        self.series
            .entry(ty.clone())
            .or_insert_with(|| compute(bars, &ty))
    }

    /// Valid `Simple` value of `ty` at `index`.
    pub fn simple(&mut self, bars: &[OhlcvBar], ty: IndicatorType, index: usize) -> Option<f64> {
        self.get_or_compute(bars, ty).simple_at(index)
    }

    /// Valid MACD (line, signal) pair at `index`.
    pub fn macd_at(
        &mut self,
        bars: &[OhlcvBar],
        fast: usize,
        slow: usize,
        signal: usize,
        index: usize,
    ) -> Option<(f64, f64)> {
        let series = self.get_or_compute(bars, IndicatorType::Macd { fast, slow, signal });
        match series.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Macd { line, signal, .. },
                ..
            }) => Some((*line, *signal)),
            _ => None,
        }
    }

    /// Valid Bollinger (upper, middle, lower) triple at `index`.
    pub fn bollinger_at(
        &mut self,
        bars: &[OhlcvBar],
        period: usize,
        stddev_mult_x100: u32,
        index: usize,
    ) -> Option<(f64, f64, f64)> {
        let series = self.get_or_compute(
            bars,
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            },
        );
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

    /// Valid supertrend direction at `index`: +1 up, -1 down.
    pub fn supertrend_direction_at(
        &mut self,
        bars: &[OhlcvBar],
        period: usize,
        multiplier_x100: u32,
        index: usize,
    ) -> Option<i8> {
        let series = self.get_or_compute(
            bars,
            IndicatorType::Supertrend {
                period,
                multiplier_x100,
            },
        );
        match series.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Supertrend { direction, .. },
                ..
            }) => Some(*direction),
            _ => None,
        }
    }
}

fn compute(bars: &[OhlcvBar], ty: &IndicatorType) -> IndicatorSeries {
    match *ty {
        IndicatorType::Ema(period) => ema::calculate_ema(bars, period),
        IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
        IndicatorType::Atr(period) => atr::calculate_atr(bars, period),
        IndicatorType::VolumeSma(period) => rolling::calculate_volume_sma(bars, period),
        IndicatorType::SpreadSma(period) => rolling::calculate_spread_sma(bars, period),
        IndicatorType::Vwap => vwap::calculate_session_vwap(bars),
        IndicatorType::Macd { fast, slow, signal } => {
            macd::calculate_macd(bars, fast, slow, signal)
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => bollinger::calculate_bollinger(bars, period, stddev_mult_x100),
        IndicatorType::Supertrend {
            period,
            multiplier_x100,
        } => supertrend::calculate_supertrend(bars, period, multiplier_x100),
        IndicatorType::Psar => psar::calculate_psar(bars),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(9, 15 + i as u32, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ema(50).to_string(), "EMA(50)");
        assert_eq!(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .to_string(),
            "MACD(12,26,9)"
        );
        assert_eq!(
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
            .to_string(),
            "BOLLINGER(20,2)"
        );
    }

    #[test]
    fn cache_computes_once_per_key() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let mut cache = IndicatorCache::new();

        let first = cache.simple(&bars, IndicatorType::Ema(3), 4);
        let second = cache.simple(&bars, IndicatorType::Ema(3), 4);
        assert_eq!(first, second);
        assert_eq!(cache.series.len(), 1);

        cache.simple(&bars, IndicatorType::Ema(5), 4);
        assert_eq!(cache.series.len(), 2);
    }

    #[test]
    fn simple_at_rejects_warmup_and_out_of_range() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let mut cache = IndicatorCache::new();
        let series = cache.get_or_compute(&bars, IndicatorType::Ema(3));
        assert!(series.simple_at(0).is_none());
        assert!(series.simple_at(2).is_some());
        assert!(series.simple_at(10).is_none());
    }
}
