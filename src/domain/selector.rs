//! Pre-market strategy selection: conditions and bias in, one activated
//! strategy and the day's pivot levels out.

use std::collections::HashMap;

use chrono::Duration;
use tracing::{info, warn};

use crate::domain::backtest::{evaluate_candidates, BacktestResult};
use crate::domain::config::TradingConfig;
use crate::domain::error::DaytraderError;
use crate::domain::pivot::PivotLevels;
use crate::domain::signal::Bias;
use crate::domain::strategy::{is_known_strategy, DEFAULT_STRATEGY};
use crate::ports::advisor_port::AdvisorPort;
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::ClockPort;
use crate::ports::conditions_port::{ConditionsPort, UNKNOWN_CONDITION};
use crate::ports::sentiment_port::SentimentPort;

/// Everything the live session needs for one trading day.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub strategy_name: String,
    pub bias: Bias,
    pub pivots: PivotLevels,
    /// Win rate of the activated strategy; `None` when the startup backtest
    /// is disabled.
    pub win_rate: Option<f64>,
}

/// Pick the best-scoring result, walking `order` so earlier candidates win
/// ties.
pub fn pick_winner<'a>(
    results: &'a HashMap<String, BacktestResult>,
    order: &[String],
) -> Option<&'a BacktestResult> {
    let mut winner: Option<&BacktestResult> = None;
    for name in order {
        if let Some(result) = results.get(name) {
            if winner.is_none_or(|w| result.win_rate > w.win_rate) {
                winner = Some(result);
            }
        }
    }
    winner
}

pub fn select_for_day(
    broker: &dyn BrokerPort,
    sentiment: &dyn SentimentPort,
    conditions: &dyn ConditionsPort,
    advisor: &dyn AdvisorPort,
    clock: &dyn ClockPort,
    config: &TradingConfig,
) -> Result<DayPlan, DaytraderError> {
    let today = clock.today();

    let tags = conditions.conditions_for(today)?;
    if tags
        .iter()
        .any(|t| t.eq_ignore_ascii_case(UNKNOWN_CONDITION))
    {
        return Err(DaytraderError::SetupAborted {
            reason: "could not determine today's market conditions".into(),
        });
    }
    info!(?tags, "market conditions identified");

    let bias = sentiment.market_bias()?;
    if !bias.is_tradeable() {
        return Err(DaytraderError::SetupAborted {
            reason: format!("market bias is {bias}, trading halted for the day"),
        });
    }
    info!(%bias, "day bias set");

    let recommended = match advisor.recommend(&tags) {
        Ok(name) if is_known_strategy(&name) => name,
        Ok(name) => {
            warn!(%name, "advisor recommended an unknown strategy, using default");
            DEFAULT_STRATEGY.to_string()
        }
        Err(e) => {
            warn!(error = %e, "advisor call failed, using default strategy");
            DEFAULT_STRATEGY.to_string()
        }
    };
    info!(strategy = %recommended, "advisor recommendation");

    let (strategy_name, win_rate) = if config.run_startup_backtest {
        let mut candidates = vec![DEFAULT_STRATEGY.to_string()];
        if recommended != DEFAULT_STRATEGY {
            candidates.push(recommended.clone());
        }

        let to = clock.now();
        let from = to - Duration::days(365 * config.backtest_years as i64);
        let daily = broker.historical_bars(
            &config.underlying_instrument,
            &config.exchange,
            "day",
            from,
            to,
        )?;
        let intraday = broker.historical_bars(
            &config.underlying_instrument,
            &config.exchange,
            &config.chart_timeframe,
            from,
            to,
        )?;

        let results = evaluate_candidates(&candidates, &daily, &intraday, config)?;
        let Some(winner) = pick_winner(&results, &candidates) else {
            return Err(DaytraderError::SetupAborted {
                reason: "backtesting yielded no results".into(),
            });
        };
        info!(
            strategy = %winner.strategy,
            win_rate = winner.win_rate,
            trades = winner.trades,
            "backtest winner"
        );

        if winner.win_rate < config.win_rate_threshold {
            return Err(DaytraderError::SetupAborted {
                reason: format!(
                    "winning strategy '{}' win rate ({:.2}%) is below threshold ({:.2}%)",
                    winner.strategy, winner.win_rate, config.win_rate_threshold
                ),
            });
        }
        (winner.strategy.clone(), Some(winner.win_rate))
    } else {
        warn!("startup backtest validation is disabled");
        (recommended, None)
    };

    let pivots = todays_pivots(broker, clock, config)?;
    info!(strategy = %strategy_name, pivot = pivots.pivot, "strategy activated");

    Ok(DayPlan {
        strategy_name,
        bias,
        pivots,
        win_rate,
    })
}

/// Pivot levels from the most recently completed session.
pub fn todays_pivots(
    broker: &dyn BrokerPort,
    clock: &dyn ClockPort,
    config: &TradingConfig,
) -> Result<PivotLevels, DaytraderError> {
    let to = clock.now();
    let from = to - Duration::days(7);
    let daily = broker.historical_bars(
        &config.underlying_instrument,
        &config.exchange,
        "day",
        from,
        to,
    )?;

    let today = clock.today();
    let prev = daily
        .iter()
        .filter(|bar| bar.date() < today)
        .next_back()
        .ok_or_else(|| DaytraderError::InsufficientData {
            symbol: config.underlying_instrument.clone(),
            bars: daily.len(),
            minimum: 1,
        })?;

    Ok(PivotLevels::from_prev_session(prev.high, prev.low, prev.close))
}
