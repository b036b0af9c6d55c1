//! CSV trade log adapter: one row per completed trade, plus an append-only
//! summaries file for the daily and monthly aggregates.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::error::DaytraderError;
use crate::domain::position::CompletedTrade;
use crate::domain::report::TradeSummary;
use crate::domain::signal::TradeDirection;
use crate::ports::trade_log_port::TradeLogPort;

const TRADE_HEADERS: [&str; 8] = [
    "closed_at",
    "symbol",
    "direction",
    "entry_price",
    "exit_price",
    "quantity",
    "pnl",
    "strategy",
];

pub struct CsvTradeLog {
    trades_path: PathBuf,
    summaries_path: PathBuf,
}

impl CsvTradeLog {
    /// Logs under `dir/trades.csv` and `dir/summaries.csv`; the directory is
    /// created if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<CsvTradeLog, DaytraderError> {
        std::fs::create_dir_all(&dir)?;
        Ok(CsvTradeLog {
            trades_path: dir.as_ref().join("trades.csv"),
            summaries_path: dir.as_ref().join("summaries.csv"),
        })
    }

    fn append_writer(
        path: &Path,
        headers: &[&str],
    ) -> Result<csv::Writer<std::fs::File>, DaytraderError> {
        let exists = path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            writer
                .write_record(headers)
                .map_err(|e| DaytraderError::TradeLog {
                    reason: e.to_string(),
                })?;
        }
        Ok(writer)
    }

    fn read_trades(&self) -> Result<Vec<CompletedTrade>, DaytraderError> {
        if !self.trades_path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.trades_path).map_err(|e| DaytraderError::TradeLog {
                reason: e.to_string(),
            })?;
        let mut trades = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| DaytraderError::TradeLog {
                reason: e.to_string(),
            })?;
            trades.push(parse_trade(&record)?);
        }
        Ok(trades)
    }
}

fn parse_trade(record: &csv::StringRecord) -> Result<CompletedTrade, DaytraderError> {
    fn field<'a>(record: &'a csv::StringRecord, i: usize) -> Result<&'a str, DaytraderError> {
        record.get(i).ok_or_else(|| DaytraderError::TradeLog {
            reason: format!("trade row missing column {i}"),
        })
    }
    fn bad(reason: String) -> DaytraderError {
        DaytraderError::TradeLog { reason }
    }

    let closed_at = NaiveDateTime::parse_from_str(field(record, 0)?, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| bad(format!("bad timestamp: {e}")))?;
    let direction = match field(record, 2)? {
        "BUY" => TradeDirection::Buy,
        "SELL" => TradeDirection::Sell,
        other => return Err(bad(format!("bad direction '{other}'"))),
    };

    Ok(CompletedTrade {
        closed_at,
        symbol: field(record, 1)?.to_string(),
        direction,
        entry_price: field(record, 3)?
            .parse()
            .map_err(|e| bad(format!("bad entry price: {e}")))?,
        exit_price: field(record, 4)?
            .parse()
            .map_err(|e| bad(format!("bad exit price: {e}")))?,
        quantity: field(record, 5)?
            .parse()
            .map_err(|e| bad(format!("bad quantity: {e}")))?,
        pnl: field(record, 6)?
            .parse()
            .map_err(|e| bad(format!("bad pnl: {e}")))?,
        strategy: field(record, 7)?.to_string(),
        opened_at: closed_at,
    })
}

impl TradeLogPort for CsvTradeLog {
    fn record(&mut self, trade: &CompletedTrade) -> Result<(), DaytraderError> {
        let mut writer = Self::append_writer(&self.trades_path, &TRADE_HEADERS)?;
        writer
            .write_record([
                trade.closed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                trade.symbol.clone(),
                trade.direction.to_string(),
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                trade.quantity.to_string(),
                trade.pnl.to_string(),
                trade.strategy.clone(),
            ])
            .map_err(|e| DaytraderError::TradeLog {
                reason: e.to_string(),
            })?;
        writer.flush()?;
        info!(symbol = %trade.symbol, pnl = trade.pnl, "trade logged");
        Ok(())
    }

    fn daily_summary(
        &mut self,
        date: NaiveDate,
        summary: &TradeSummary,
        no_trade_reason: Option<&str>,
    ) -> Result<(), DaytraderError> {
        let mut writer = Self::append_writer(
            &self.summaries_path,
            &["scope", "period", "wins", "losses", "total_pnl", "note"],
        )?;
        writer
            .write_record([
                "daily".to_string(),
                date.to_string(),
                summary.wins.to_string(),
                summary.losses.to_string(),
                format!("{:.2}", summary.total_pnl),
                no_trade_reason.unwrap_or_default().to_string(),
            ])
            .map_err(|e| DaytraderError::TradeLog {
                reason: e.to_string(),
            })?;
        writer.flush()?;
        Ok(())
    }

    fn monthly_summary(
        &mut self,
        year: i32,
        month: u32,
        summary: &TradeSummary,
    ) -> Result<(), DaytraderError> {
        let mut writer = Self::append_writer(
            &self.summaries_path,
            &["scope", "period", "wins", "losses", "total_pnl", "note"],
        )?;
        writer
            .write_record([
                "monthly".to_string(),
                format!("{year}-{month:02}"),
                summary.wins.to_string(),
                summary.losses.to_string(),
                format!("{:.2}", summary.total_pnl),
                String::new(),
            ])
            .map_err(|e| DaytraderError::TradeLog {
                reason: e.to_string(),
            })?;
        writer.flush()?;
        Ok(())
    }

    fn trades_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CompletedTrade>, DaytraderError> {
        Ok(self
            .read_trades()?
            .into_iter()
            .filter(|t| t.closed_at.year() == year && t.closed_at.month() == month)
            .collect())
    }
}
