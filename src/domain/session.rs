//! The live trading day: one single-threaded polling loop that owns all
//! mutable trade state and talks to the outside world only through ports.
//!
//! Each cycle either looks for an entry (strategy decision → sizing → order)
//! or manages the open trade (stop ratchet → exit). A failed external call
//! degrades to skipping the cycle; order placement is never retried within
//! the same signal.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::config::TradingConfig;
use crate::domain::error::DaytraderError;
use crate::domain::indicator::IndicatorCache;
use crate::domain::position::{
    CompletedTrade, IndicatorExit, ManageAction, PositionManager, TradeIntent,
};
use crate::domain::report::summarize;
use crate::domain::selector::{select_for_day, DayPlan};
use crate::domain::sizing::plan_option_trade;
use crate::domain::strategy::{create_strategy, Strategy, StrategyContext};
use crate::ports::advisor_port::AdvisorPort;
use crate::ports::broker_port::{BrokerPort, OrderRequest, OrderSide};
use crate::ports::clock_port::ClockPort;
use crate::ports::conditions_port::ConditionsPort;
use crate::ports::sentiment_port::SentimentPort;
use crate::ports::trade_log_port::TradeLogPort;

/// Sleep while waiting for the tradeable window to open.
const PRE_SESSION_SLEEP_SECS: u64 = 60;
/// How far back each cycle's bar fetch reaches.
const BAR_FETCH_DAYS: i64 = 5;

pub struct SessionPorts<'a> {
    pub broker: &'a dyn BrokerPort,
    pub sentiment: &'a dyn SentimentPort,
    pub conditions: &'a dyn ConditionsPort,
    pub advisor: &'a dyn AdvisorPort,
    pub trade_log: &'a mut dyn TradeLogPort,
    pub clock: &'a dyn ClockPort,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub trades: Vec<CompletedTrade>,
    pub no_trade_reason: Option<String>,
}

/// Run one full trading day: setup, polling loop, end-of-day reporting.
pub fn run_trading_day(
    ports: &mut SessionPorts,
    config: &TradingConfig,
) -> Result<SessionOutcome, DaytraderError> {
    let today = ports.clock.today();

    let plan = match select_for_day(
        ports.broker,
        ports.sentiment,
        ports.conditions,
        ports.advisor,
        ports.clock,
        config,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "day setup failed, no trades will be attempted");
            let reason = e.to_string();
            let outcome = SessionOutcome {
                trades: Vec::new(),
                no_trade_reason: Some(reason.clone()),
            };
            report_end_of_day(ports, today, &outcome.trades, Some(&reason))?;
            return Ok(outcome);
        }
    };

    let mut strategy = create_strategy(&plan.strategy_name, config)?;
    let mut manager = PositionManager::new(
        config.stop_loss_percent,
        config.min_stop_loss_points,
        config.trailing,
        config.indicator_exit,
    );

    info!(
        strategy = %plan.strategy_name,
        bias = %plan.bias,
        paper = config.paper_trading,
        "session started"
    );

    let mut trades: Vec<CompletedTrade> = Vec::new();
    let mut trades_today: u32 = 0;

    while ports.clock.now().time() < config.session_close {
        let now = ports.clock.now();
        if now.time() < config.trade_start {
            ports.clock.sleep(Duration::from_secs(PRE_SESSION_SLEEP_SECS));
            continue;
        }

        if manager.is_idle() {
            if trades_today < config.max_trades_per_day {
                if let Some(intent) = seek_entry(ports, config, &plan, strategy.as_mut()) {
                    match execute_entry(ports, config, &intent) {
                        Some(entry_price) => {
                            manager.open(&intent, entry_price, &plan.strategy_name, now)?;
                            trades_today += 1;
                        }
                        None => {
                            // Intent dropped for this cycle; never re-sent.
                        }
                    }
                }
            }
        } else if let Some(completed) = manage_open_trade(ports, config, &mut manager) {
            if let Err(e) = ports.trade_log.record(&completed) {
                error!(error = %e, "failed to record completed trade");
            }
            trades.push(completed);
        }

        ports.clock.sleep(Duration::from_secs(config.poll_interval_secs));
    }

    info!(trades = trades.len(), "session closed");
    report_end_of_day(ports, today, &trades, None)?;

    Ok(SessionOutcome {
        trades,
        no_trade_reason: None,
    })
}

/// Evaluate the active strategy on fresh bars; size the trade on a non-HOLD
/// decision. Any failure skips this cycle.
fn seek_entry(
    ports: &mut SessionPorts,
    config: &TradingConfig,
    plan: &DayPlan,
    strategy: &mut dyn Strategy,
) -> Option<TradeIntent> {
    match ports
        .broker
        .last_price(&config.vix_symbol, &config.exchange)
    {
        Ok(vix) if vix > config.max_vix_level => {
            warn!(vix, max = config.max_vix_level, "VIX above limit, holding");
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "VIX check failed, skipping cycle");
            return None;
        }
    }

    let now = ports.clock.now();
    let bars = match ports.broker.historical_bars(
        &config.underlying_instrument,
        &config.exchange,
        &config.chart_timeframe,
        now - ChronoDuration::days(BAR_FETCH_DAYS),
        now,
    ) {
        Ok(bars) if !bars.is_empty() => bars,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "bar fetch failed, skipping cycle");
            return None;
        }
    };

    let mut cache = IndicatorCache::new();
    let mut ctx = StrategyContext::latest(&bars, plan.bias, Some(&plan.pivots), &mut cache);
    let decision = strategy.evaluate(&mut ctx);
    let direction = decision.direction()?;
    info!(%decision, "entry signal");

    match plan_option_trade(direction, ports.broker, config, ports.clock.today()) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(error = %e, "sizing failed, skipping cycle");
            None
        }
    }
}

/// Place the entry order and confirm its fill. `None` drops the intent.
fn execute_entry(
    ports: &mut SessionPorts,
    config: &TradingConfig,
    intent: &TradeIntent,
) -> Option<f64> {
    // Both directions are long option positions, so the entry leg is a buy.
    let order = OrderRequest {
        symbol: intent.symbol.clone(),
        exchange: config.derivatives_exchange.clone(),
        side: OrderSide::Buy,
        quantity: intent.quantity,
    };

    let order_id = match ports.broker.place_market_order(&order) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, symbol = %intent.symbol, "entry order failed");
            return None;
        }
    };

    match ports.broker.order_fill_price(&order_id) {
        Ok(Some(price)) if price > 0.0 => {
            info!(%order_id, price, "entry filled");
            Some(price)
        }
        Ok(_) => {
            error!(%order_id, "order did not fill or filled at zero, dropping intent");
            None
        }
        Err(e) => {
            error!(error = %e, %order_id, "fill confirmation failed, dropping intent");
            None
        }
    }
}

/// Poll the open trade. Returns the completed record when an exit fires and
/// the closing order is confirmed; the trade stays open otherwise.
fn manage_open_trade(
    ports: &mut SessionPorts,
    config: &TradingConfig,
    manager: &mut PositionManager,
) -> Option<CompletedTrade> {
    let symbol = manager.active()?.symbol.clone();
    let quantity = manager.active()?.quantity;

    let price = match ports
        .broker
        .last_price(&symbol, &config.derivatives_exchange)
    {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "price poll failed, skipping cycle");
            return None;
        }
    };

    let mut cache = IndicatorCache::new();
    let underlying_bars = if config.indicator_exit != IndicatorExit::None {
        let now = ports.clock.now();
        match ports.broker.historical_bars(
            &config.underlying_instrument,
            &config.exchange,
            &config.chart_timeframe,
            now - ChronoDuration::days(BAR_FETCH_DAYS),
            now,
        ) {
            Ok(bars) => Some(bars),
            Err(e) => {
                warn!(error = %e, "underlying fetch failed, managing on price only");
                None
            }
        }
    } else {
        None
    };

    let action = manager.manage(
        price,
        underlying_bars.as_deref().map(|bars| (bars, &mut cache)),
    );
    let ManageAction::Exit(reason) = action else {
        return None;
    };
    info!(?reason, price, "exit triggered");

    let order = OrderRequest {
        symbol: symbol.clone(),
        exchange: config.derivatives_exchange.clone(),
        side: OrderSide::Sell,
        quantity,
    };
    let order_id = match ports.broker.place_market_order(&order) {
        Ok(id) => id,
        Err(e) => {
            // The trade stays open; the next cycle retries the exit.
            error!(error = %e, %symbol, "closing order failed, trade remains open");
            return None;
        }
    };

    let exit_price = ports
        .broker
        .order_fill_price(&order_id)
        .ok()
        .flatten()
        .filter(|p| *p > 0.0)
        .unwrap_or(price);

    manager.close(exit_price, ports.clock.now())
}

fn report_end_of_day(
    ports: &mut SessionPorts,
    date: NaiveDate,
    trades: &[CompletedTrade],
    no_trade_reason: Option<&str>,
) -> Result<(), DaytraderError> {
    let summary = summarize(trades);
    ports
        .trade_log
        .daily_summary(date, &summary, no_trade_reason)?;

    if is_last_day_of_month(date) {
        let monthly_trades = ports.trade_log.trades_for_month(date.year(), date.month())?;
        let monthly = summarize(&monthly_trades);
        info!(
            wins = monthly.wins,
            losses = monthly.losses,
            pnl = monthly.total_pnl,
            "sending monthly summary"
        );
        ports
            .trade_log
            .monthly_summary(date.year(), date.month(), &monthly)?;
    }
    Ok(())
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    match date.succ_opt() {
        Some(next) => next.month() != date.month(),
        None => true,
    }
}
