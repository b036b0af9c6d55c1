//! Central Pivot Range and floor pivots, derived once per session from the
//! prior completed session's OHLC.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::Bias;

#[derive(Debug, Clone, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub bc: f64,
    pub tc: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub prev_high: Option<f64>,
    pub prev_low: Option<f64>,
}

impl PivotLevels {
    /// Derive pivot levels from the prior session's high, low and close.
    /// tc and bc are swapped when the raw formula inverts them, so
    /// `tc >= bc` always holds.
    pub fn from_prev_session(high: f64, low: f64, close: f64) -> PivotLevels {
        let pivot = (high + low + close) / 3.0;
        let mut bc = (high + low) / 2.0;
        let mut tc = (pivot - bc) + pivot;
        if tc < bc {
            std::mem::swap(&mut tc, &mut bc);
        }

        PivotLevels {
            pivot,
            bc,
            tc,
            r1: 2.0 * pivot - low,
            r2: pivot + (high - low),
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - (high - low),
            s3: low - 2.0 * (high - pivot),
            prev_high: Some(high),
            prev_low: Some(low),
        }
    }

    /// Derive pivot levels from the last bar of a prior-session sequence.
    /// Returns `None` when the sequence is empty.
    pub fn from_prev_bar(prev_session: &[OhlcvBar]) -> Option<PivotLevels> {
        let bar = prev_session.last()?;
        Some(Self::from_prev_session(bar.high, bar.low, bar.close))
    }
}

/// Classify the day bias used by the backtest replay: the prior close above
/// the pivot reads Bullish, otherwise Bearish.
pub fn classify_day_bias(prev_close: f64, pivots: &PivotLevels) -> Bias {
    if prev_close > pivots.pivot {
        Bias::Bullish
    } else {
        Bias::Bearish
    }
}
