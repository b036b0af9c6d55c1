#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;

use daytrader::domain::config::TradingConfig;
use daytrader::domain::error::DaytraderError;
pub use daytrader::domain::ohlcv::OhlcvBar;
use daytrader::domain::position::CompletedTrade;
use daytrader::domain::report::TradeSummary;
use daytrader::domain::signal::Bias;
use daytrader::ports::advisor_port::AdvisorPort;
use daytrader::ports::broker_port::{
    BrokerPort, OptionInstrument, OptionKind, OrderRequest,
};
use daytrader::ports::clock_port::ClockPort;
use daytrader::ports::conditions_port::ConditionsPort;
use daytrader::ports::sentiment_port::SentimentPort;
use daytrader::ports::trade_log_port::TradeLogPort;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn intraday_bars(day: u32, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: date(day).and_hms_opt(9, 15, 0).unwrap()
                + Duration::minutes(5 * i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn daily_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: date(day).and_hms_opt(0, 0, 0).unwrap(),
        open: close,
        high,
        low,
        close,
        volume: 100_000,
    }
}

/// A quote tape: `last_price` walks the script and sticks on the final
/// value; fills peek at the most recently served quote.
pub struct QuoteScript {
    values: Vec<f64>,
    position: RefCell<usize>,
}

impl QuoteScript {
    pub fn new(values: &[f64]) -> QuoteScript {
        QuoteScript {
            values: values.to_vec(),
            position: RefCell::new(0),
        }
    }

    fn next(&self) -> f64 {
        let mut pos = self.position.borrow_mut();
        let value = self.values[(*pos).min(self.values.len() - 1)];
        *pos += 1;
        value
    }

    fn peek(&self) -> f64 {
        let pos = *self.position.borrow();
        self.values[pos.saturating_sub(1).min(self.values.len() - 1)]
    }
}

#[derive(Default)]
pub struct MockBroker {
    pub quotes: HashMap<String, QuoteScript>,
    pub daily: Vec<OhlcvBar>,
    pub intraday: Vec<OhlcvBar>,
    /// (symbol, strike, kind, expiry, lot_size)
    pub options: Vec<(String, f64, OptionKind, NaiveDate, u32)>,
    pub capital: f64,
    pub fail_orders: bool,
    pub orders: RefCell<Vec<OrderRequest>>,
}

impl MockBroker {
    pub fn new() -> MockBroker {
        MockBroker {
            capital: 100_000.0,
            ..MockBroker::default()
        }
    }

    pub fn with_quotes(mut self, symbol: &str, script: &[f64]) -> MockBroker {
        self.quotes.insert(symbol.to_string(), QuoteScript::new(script));
        self
    }

    pub fn with_daily(mut self, bars: Vec<OhlcvBar>) -> MockBroker {
        self.daily = bars;
        self
    }

    pub fn with_intraday(mut self, bars: Vec<OhlcvBar>) -> MockBroker {
        self.intraday = bars;
        self
    }

    pub fn with_option(
        mut self,
        symbol: &str,
        strike: f64,
        kind: OptionKind,
        expiry: NaiveDate,
        lot_size: u32,
    ) -> MockBroker {
        self.options
            .push((symbol.to_string(), strike, kind, expiry, lot_size));
        self
    }
}

impl BrokerPort for MockBroker {
    fn resolve_instrument(&self, symbol: &str, exchange: &str) -> Result<u64, DaytraderError> {
        if self.quotes.contains_key(symbol) {
            Ok(1)
        } else {
            Err(DaytraderError::UnknownInstrument {
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
            })
        }
    }

    fn last_price(&self, symbol: &str, exchange: &str) -> Result<f64, DaytraderError> {
        self.quotes
            .get(symbol)
            .map(|script| script.next())
            .ok_or_else(|| DaytraderError::UnknownInstrument {
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
            })
    }

    fn historical_bars(
        &self,
        _symbol: &str,
        _exchange: &str,
        timeframe: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, DaytraderError> {
        let source = if timeframe == "day" {
            &self.daily
        } else {
            &self.intraday
        };
        Ok(source
            .iter()
            .filter(|b| b.timestamp >= from && b.timestamp <= to)
            .cloned()
            .collect())
    }

    fn available_capital(&self) -> Result<f64, DaytraderError> {
        Ok(self.capital)
    }

    fn resolve_option(
        &self,
        _underlying: &str,
        strike: f64,
        kind: OptionKind,
        expiry: NaiveDate,
    ) -> Result<Option<OptionInstrument>, DaytraderError> {
        Ok(self
            .options
            .iter()
            .find(|(_, s, k, e, _)| (*s - strike).abs() < f64::EPSILON && *k == kind && *e == expiry)
            .map(|(symbol, _, _, _, lot_size)| OptionInstrument {
                symbol: symbol.clone(),
                lot_size: *lot_size,
            }))
    }

    fn place_market_order(&self, order: &OrderRequest) -> Result<String, DaytraderError> {
        if self.fail_orders {
            return Err(DaytraderError::external("broker", "order rejected"));
        }
        let mut orders = self.orders.borrow_mut();
        orders.push(order.clone());
        Ok(orders.len().to_string())
    }

    fn order_fill_price(&self, order_id: &str) -> Result<Option<f64>, DaytraderError> {
        let orders = self.orders.borrow();
        let index: usize = order_id
            .parse::<usize>()
            .map_err(|_| DaytraderError::external("broker", "unknown order id"))?;
        let Some(order) = orders.get(index.wrapping_sub(1)) else {
            return Ok(None);
        };
        Ok(self.quotes.get(&order.symbol).map(|script| script.peek()))
    }
}

pub struct StubSentiment(pub Bias);

impl SentimentPort for StubSentiment {
    fn market_bias(&self) -> Result<Bias, DaytraderError> {
        Ok(self.0)
    }
}

pub struct StubConditions(pub Vec<String>);

impl ConditionsPort for StubConditions {
    fn conditions_for(&self, _date: NaiveDate) -> Result<Vec<String>, DaytraderError> {
        Ok(self.0.clone())
    }
}

pub struct StubAdvisor(pub String);

impl AdvisorPort for StubAdvisor {
    fn recommend(&self, _conditions: &[String]) -> Result<String, DaytraderError> {
        Ok(self.0.clone())
    }
}

/// Clock that advances by exactly the slept duration.
pub struct StepClock(pub RefCell<NaiveDateTime>);

impl StepClock {
    pub fn starting_at(ts: NaiveDateTime) -> StepClock {
        StepClock(RefCell::new(ts))
    }
}

impl ClockPort for StepClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.borrow()
    }

    fn sleep(&self, duration: std::time::Duration) {
        let mut now = self.0.borrow_mut();
        *now += Duration::seconds(duration.as_secs() as i64);
    }
}

#[derive(Default)]
pub struct MemoryTradeLog {
    pub trades: Vec<CompletedTrade>,
    pub daily: Vec<(NaiveDate, TradeSummary, Option<String>)>,
    pub monthly: Vec<(i32, u32, TradeSummary)>,
}

impl TradeLogPort for MemoryTradeLog {
    fn record(&mut self, trade: &CompletedTrade) -> Result<(), DaytraderError> {
        self.trades.push(trade.clone());
        Ok(())
    }

    fn daily_summary(
        &mut self,
        date: NaiveDate,
        summary: &TradeSummary,
        no_trade_reason: Option<&str>,
    ) -> Result<(), DaytraderError> {
        self.daily
            .push((date, *summary, no_trade_reason.map(str::to_string)));
        Ok(())
    }

    fn monthly_summary(
        &mut self,
        year: i32,
        month: u32,
        summary: &TradeSummary,
    ) -> Result<(), DaytraderError> {
        self.monthly.push((year, month, *summary));
        Ok(())
    }

    fn trades_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CompletedTrade>, DaytraderError> {
        use chrono::Datelike;
        Ok(self
            .trades
            .iter()
            .filter(|t| t.closed_at.year() == year && t.closed_at.month() == month)
            .cloned()
            .collect())
    }
}

/// Config tuned for the mock session: one trade per day, tight polling.
pub fn session_config() -> TradingConfig {
    TradingConfig {
        underlying_instrument: "NIFTY 50".into(),
        risk_per_trade_percent: 2.0,
        max_trades_per_day: 1,
        run_startup_backtest: false,
        ..TradingConfig::default()
    }
}
