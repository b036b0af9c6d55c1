//! Trade log / notifier port trait.

use chrono::NaiveDate;

use crate::domain::error::DaytraderError;
use crate::domain::position::CompletedTrade;
use crate::domain::report::TradeSummary;

pub trait TradeLogPort {
    /// Record one completed trade; called exactly once per exit.
    fn record(&mut self, trade: &CompletedTrade) -> Result<(), DaytraderError>;

    /// End-of-day aggregate. `no_trade_reason` carries the abort reason when
    /// the day's setup failed and nothing traded.
    fn daily_summary(
        &mut self,
        date: NaiveDate,
        summary: &TradeSummary,
        no_trade_reason: Option<&str>,
    ) -> Result<(), DaytraderError>;

    /// End-of-month aggregate.
    fn monthly_summary(
        &mut self,
        year: i32,
        month: u32,
        summary: &TradeSummary,
    ) -> Result<(), DaytraderError>;

    /// All recorded trades closed in the given month.
    fn trades_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CompletedTrade>, DaytraderError>;
}
