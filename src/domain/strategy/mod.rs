//! Trading strategies: a closed registry of named evaluators over a bar
//! series, a directional bias and the session's pivot levels.
//!
//! Strategies read the context and return a [`Decision`]; they never mutate
//! global state. The only retained state is the opening-range strategy's
//! computed range, scoped to one session. Indicator columns are derived
//! lazily through the context's [`IndicatorCache`].

pub mod pivot_confluence;
pub mod supertrend_macd;
pub mod volatility_reversal;
pub mod volume_spread;
pub mod vwap_momentum;
pub mod prev_day_breakout;
pub mod opening_range;
pub mod band_squeeze;
pub mod ema_crossover;
pub mod rsi_divergence;
pub mod ema_cross_rsi;

use crate::domain::config::TradingConfig;
use crate::domain::error::DaytraderError;
use crate::domain::indicator::IndicatorCache;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pivot::PivotLevels;
use crate::domain::signal::{Bias, Decision};

/// Everything a strategy may look at for one evaluation.
pub struct StrategyContext<'a> {
    pub bars: &'a [OhlcvBar],
    pub bias: Bias,
    pub pivots: Option<&'a PivotLevels>,
    /// Bar under evaluation; defaults to the last bar via [`Self::latest`].
    pub index: usize,
    pub cache: &'a mut IndicatorCache,
}

impl<'a> StrategyContext<'a> {
    /// Context evaluating the last bar of the series.
    pub fn latest(
        bars: &'a [OhlcvBar],
        bias: Bias,
        pivots: Option<&'a PivotLevels>,
        cache: &'a mut IndicatorCache,
    ) -> StrategyContext<'a> {
        let index = bars.len().saturating_sub(1);
        StrategyContext {
            bars,
            bias,
            pivots,
            index,
            cache,
        }
    }

    pub fn at_index(
        bars: &'a [OhlcvBar],
        bias: Bias,
        pivots: Option<&'a PivotLevels>,
        index: usize,
        cache: &'a mut IndicatorCache,
    ) -> StrategyContext<'a> {
        StrategyContext {
            bars,
            bias,
            pivots,
            index,
            cache,
        }
    }

    pub fn current(&self) -> &OhlcvBar {
        &self.bars[self.index]
    }

    pub fn previous(&self) -> Option<&OhlcvBar> {
        self.index.checked_sub(1).map(|i| &self.bars[i])
    }
}

/// The universal interface for a trading strategy.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Minimum evaluation index; below it the strategy holds.
    fn min_index(&self) -> usize;

    fn evaluate(&mut self, ctx: &mut StrategyContext) -> Decision;
}

pub const DEFAULT_STRATEGY: &str = "pivot_confluence";

pub const STRATEGY_NAMES: [&str; 11] = [
    "pivot_confluence",
    "supertrend_macd",
    "volatility_reversal",
    "volume_spread",
    "vwap_momentum",
    "prev_day_breakout",
    "opening_range_breakout",
    "band_squeeze",
    "ema_crossover",
    "rsi_divergence",
    "ema_cross_rsi",
];

pub fn is_known_strategy(name: &str) -> bool {
    STRATEGY_NAMES.contains(&name)
}

/// Build a strategy instance by registry name. Unknown names fail with
/// [`DaytraderError::UnknownStrategy`].
pub fn create_strategy(
    name: &str,
    config: &TradingConfig,
) -> Result<Box<dyn Strategy>, DaytraderError> {
    let strategy: Box<dyn Strategy> = match name {
        "pivot_confluence" => Box::new(pivot_confluence::PivotConfluence::new()),
        "supertrend_macd" => Box::new(supertrend_macd::SupertrendMacd::new()),
        "volatility_reversal" => Box::new(volatility_reversal::VolatilityReversal::new()),
        "volume_spread" => Box::new(volume_spread::VolumeSpread::new()),
        "vwap_momentum" => Box::new(vwap_momentum::VwapMomentum::new()),
        "prev_day_breakout" => Box::new(prev_day_breakout::PrevDayBreakout::new()),
        "opening_range_breakout" => Box::new(opening_range::OpeningRangeBreakout::new(
            config.session_open,
            config.orb_minutes,
        )),
        "band_squeeze" => Box::new(band_squeeze::BandSqueeze::new()),
        "ema_crossover" => Box::new(ema_crossover::EmaCrossover::new()),
        "rsi_divergence" => Box::new(rsi_divergence::RsiDivergence::new()),
        "ema_cross_rsi" => Box::new(ema_cross_rsi::EmaCrossRsi::new()),
        _ => {
            return Err(DaytraderError::UnknownStrategy {
                name: name.to_string(),
            });
        }
    };
    Ok(strategy)
}
