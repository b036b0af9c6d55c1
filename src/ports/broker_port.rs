//! Broker gateway port trait.
//!
//! Calls are synchronous and blocking from the domain's perspective; a
//! failure degrades to "skip this cycle" at the call site.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::error::DaytraderError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Call => write!(f, "CE"),
            OptionKind::Put => write!(f, "PE"),
        }
    }
}

/// A resolved derivative contract.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionInstrument {
    pub symbol: String,
    pub lot_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub exchange: String,
    pub side: OrderSide,
    pub quantity: u32,
}

pub trait BrokerPort {
    /// Resolve an instrument by trading symbol; errors when unknown.
    fn resolve_instrument(&self, symbol: &str, exchange: &str) -> Result<u64, DaytraderError>;

    fn last_price(&self, symbol: &str, exchange: &str) -> Result<f64, DaytraderError>;

    /// Historical bars for a symbol over [from, to] at the given timeframe
    /// ("day" or an intraday timeframe such as "5minute").
    fn historical_bars(
        &self,
        symbol: &str,
        exchange: &str,
        timeframe: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, DaytraderError>;

    fn available_capital(&self) -> Result<f64, DaytraderError>;

    /// Resolve the option contract for (underlying, strike, kind, expiry).
    /// `Ok(None)` when no such contract trades.
    fn resolve_option(
        &self,
        underlying: &str,
        strike: f64,
        kind: OptionKind,
        expiry: NaiveDate,
    ) -> Result<Option<OptionInstrument>, DaytraderError>;

    /// Place a market order, returning the broker's order id.
    fn place_market_order(&self, order: &OrderRequest) -> Result<String, DaytraderError>;

    /// Average fill price for a completed order; `None` while pending.
    fn order_fill_price(&self, order_id: &str) -> Result<Option<f64>, DaytraderError>;
}
