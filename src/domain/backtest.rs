//! Day-replay backtest: score a candidate strategy over a historical window
//! with a simplified pivot-recross exit.
//!
//! This is a coarse heuristic for ranking strategies against each other, not
//! a fill-accurate simulator.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::config::TradingConfig;
use crate::domain::error::DaytraderError;
use crate::domain::indicator::IndicatorCache;
use crate::domain::ohlcv::{split_sessions, OhlcvBar};
use crate::domain::pivot::{classify_day_bias, PivotLevels};
use crate::domain::signal::{Decision, TradeDirection};
use crate::domain::strategy::{create_strategy, Strategy, StrategyContext};

/// Sessions with fewer intraday bars than this are skipped outright.
const MIN_SESSION_BARS: usize = 50;
/// First evaluated index within a session; earlier bars only warm indicators.
const WARMUP_INDEX: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: String,
    /// Win rate in percent; 0 when no synthetic trades fired.
    pub win_rate: f64,
    pub trades: usize,
}

#[derive(Debug, Clone, Copy)]
struct SyntheticTrade {
    direction: TradeDirection,
    entry: f64,
    exit: f64,
}

impl SyntheticTrade {
    fn is_win(&self) -> bool {
        match self.direction {
            TradeDirection::Buy => self.exit > self.entry,
            TradeDirection::Sell => self.exit < self.entry,
        }
    }
}

/// Generic parallel map over independent, side-effect-free tasks. Results
/// come back in input order; callers merge by key.
pub fn parallel_map<T, R, F>(items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    items.into_par_iter().map(f).collect()
}

/// Replay the window through one strategy instance.
pub fn run_backtest(
    strategy: &mut dyn Strategy,
    daily: &[OhlcvBar],
    intraday: &[OhlcvBar],
) -> BacktestResult {
    let sessions: HashMap<NaiveDate, &[OhlcvBar]> = split_sessions(intraday).into_iter().collect();
    let mut trades: Vec<SyntheticTrade> = Vec::new();

    for i in 1..daily.len() {
        let prev = &daily[i - 1];
        let date = daily[i].date();
        let Some(bars) = sessions.get(&date).copied() else {
            continue;
        };
        if bars.len() < MIN_SESSION_BARS {
            debug!(%date, bars = bars.len(), "session skipped, too few bars");
            continue;
        }

        let pivots = PivotLevels::from_prev_session(prev.high, prev.low, prev.close);
        let bias = classify_day_bias(prev.close, &pivots);
        let mut cache = IndicatorCache::new();
        let mut position: Option<(TradeDirection, f64)> = None;

        for j in WARMUP_INDEX..bars.len() {
            let close = bars[j].close;

            if let Some((direction, entry)) = position {
                let crossed_back = match direction {
                    TradeDirection::Buy => close < pivots.pivot,
                    TradeDirection::Sell => close > pivots.pivot,
                };
                if crossed_back {
                    trades.push(SyntheticTrade {
                        direction,
                        entry,
                        exit: close,
                    });
                    position = None;
                }
            }

            if position.is_none() {
                let mut ctx = StrategyContext::at_index(bars, bias, Some(&pivots), j, &mut cache);
                let decision = strategy.evaluate(&mut ctx);
                if decision != Decision::Hold && decision == Decision::for_bias(bias) {
                    position = Some((decision.direction().unwrap_or(TradeDirection::Buy), close));
                }
            }
        }
        // A position still open at the session end is discarded, not scored.
    }

    let wins = trades.iter().filter(|t| t.is_win()).count();
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64 * 100.0
    };

    info!(
        strategy = strategy.name(),
        trades = trades.len(),
        wins,
        win_rate,
        "backtest complete"
    );

    BacktestResult {
        strategy: strategy.name().to_string(),
        win_rate,
        trades: trades.len(),
    }
}

/// Backtest each candidate independently and in parallel, merging results by
/// strategy name.
pub fn evaluate_candidates(
    names: &[String],
    daily: &[OhlcvBar],
    intraday: &[OhlcvBar],
    config: &TradingConfig,
) -> Result<HashMap<String, BacktestResult>, DaytraderError> {
    let results: Vec<Result<BacktestResult, DaytraderError>> =
        parallel_map(names.to_vec(), |name| {
            let mut strategy = create_strategy(&name, config)?;
            Ok(run_backtest(strategy.as_mut(), daily, intraday))
        });

    let mut merged = HashMap::new();
    for result in results {
        let result = result?;
        merged.insert(result.strategy.clone(), result);
    }
    Ok(merged)
}
