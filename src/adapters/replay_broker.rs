//! CSV-backed broker gateway for paper trading and offline backtests.
//!
//! Reads a data directory of:
//! - `day.csv` / `intraday.csv` — underlying bars
//!   (`timestamp,open,high,low,close,volume`, timestamps `%Y-%m-%d %H:%M:%S`)
//! - `options.csv` — contract table
//!   (`symbol,underlying,strike,kind,expiry,lot_size,price`)
//! - `quotes.csv` (optional) — spot quotes (`symbol,price`), e.g. the
//!   volatility index
//!
//! Orders fill synthetically at the quoted price.

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::error::DaytraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::broker_port::{BrokerPort, OptionInstrument, OptionKind, OrderRequest};

#[derive(Debug, Clone)]
struct OptionRow {
    symbol: String,
    underlying: String,
    strike: f64,
    kind: OptionKind,
    expiry: NaiveDate,
    lot_size: u32,
    price: f64,
}

pub struct ReplayBroker {
    underlying: String,
    daily: Vec<OhlcvBar>,
    intraday: Vec<OhlcvBar>,
    options: Vec<OptionRow>,
    quotes: HashMap<String, f64>,
    capital: f64,
    orders: RefCell<HashMap<String, String>>,
    next_order_id: RefCell<u64>,
}

impl ReplayBroker {
    pub fn from_dir<P: AsRef<Path>>(
        dir: P,
        underlying: &str,
        capital: f64,
    ) -> Result<ReplayBroker, DaytraderError> {
        let dir = dir.as_ref();
        let daily = read_bars(&dir.join("day.csv"))?;
        let intraday = read_bars(&dir.join("intraday.csv"))?;
        let options = read_options(&dir.join("options.csv"))?;
        let quotes = read_quotes(&dir.join("quotes.csv"))?;

        Ok(ReplayBroker {
            underlying: underlying.to_string(),
            daily,
            intraday,
            options,
            quotes,
            capital,
            orders: RefCell::new(HashMap::new()),
            next_order_id: RefCell::new(1),
        })
    }

    fn quote(&self, symbol: &str) -> Option<f64> {
        if symbol == self.underlying {
            return self.intraday.last().map(|b| b.close);
        }
        if let Some(price) = self.quotes.get(symbol) {
            return Some(*price);
        }
        self.options
            .iter()
            .find(|o| o.symbol == symbol)
            .map(|o| o.price)
    }
}

impl BrokerPort for ReplayBroker {
    fn resolve_instrument(&self, symbol: &str, exchange: &str) -> Result<u64, DaytraderError> {
        if symbol == self.underlying || self.quote(symbol).is_some() {
            Ok(1)
        } else {
            Err(DaytraderError::UnknownInstrument {
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
            })
        }
    }

    fn last_price(&self, symbol: &str, exchange: &str) -> Result<f64, DaytraderError> {
        self.quote(symbol)
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
        underlying: &str,
        strike: f64,
        kind: OptionKind,
        expiry: NaiveDate,
    ) -> Result<Option<OptionInstrument>, DaytraderError> {
        Ok(self
            .options
            .iter()
            .find(|o| {
                o.underlying == underlying
                    && (o.strike - strike).abs() < f64::EPSILON
                    && o.kind == kind
                    && o.expiry == expiry
            })
            .map(|o| OptionInstrument {
                symbol: o.symbol.clone(),
                lot_size: o.lot_size,
            }))
    }

    fn place_market_order(&self, order: &OrderRequest) -> Result<String, DaytraderError> {
        if self.quote(&order.symbol).is_none() {
            return Err(DaytraderError::UnknownInstrument {
                symbol: order.symbol.clone(),
                exchange: order.exchange.clone(),
            });
        }
        let mut next = self.next_order_id.borrow_mut();
        let id = next.to_string();
        *next += 1;
        self.orders.borrow_mut().insert(id.clone(), order.symbol.clone());
        Ok(id)
    }

    fn order_fill_price(&self, order_id: &str) -> Result<Option<f64>, DaytraderError> {
        let orders = self.orders.borrow();
        let Some(symbol) = orders.get(order_id) else {
            return Ok(None);
        };
        Ok(self.quote(symbol))
    }
}

fn read_bars(path: &Path) -> Result<Vec<OhlcvBar>, DaytraderError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| DaytraderError::ExternalService {
        service: "replay data".into(),
        reason: e.to_string(),
    })?;
    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| bad_data(path, &e.to_string()))?;
        let get = |i: usize| -> Result<&str, DaytraderError> {
            record
                .get(i)
                .ok_or_else(|| bad_data(path, &format!("missing column {i}")))
        };
        bars.push(OhlcvBar {
            timestamp: NaiveDateTime::parse_from_str(get(0)?, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| bad_data(path, &e.to_string()))?,
            open: parse_f64(path, get(1)?)?,
            high: parse_f64(path, get(2)?)?,
            low: parse_f64(path, get(3)?)?,
            close: parse_f64(path, get(4)?)?,
            volume: get(5)?
                .parse()
                .map_err(|_| bad_data(path, "bad volume"))?,
        });
    }
    Ok(bars)
}

fn read_options(path: &Path) -> Result<Vec<OptionRow>, DaytraderError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| DaytraderError::ExternalService {
        service: "replay data".into(),
        reason: e.to_string(),
    })?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| bad_data(path, &e.to_string()))?;
        let get = |i: usize| -> Result<&str, DaytraderError> {
            record
                .get(i)
                .ok_or_else(|| bad_data(path, &format!("missing column {i}")))
        };
        let kind = match get(3)? {
            "CE" => OptionKind::Call,
            "PE" => OptionKind::Put,
            other => return Err(bad_data(path, &format!("bad option kind '{other}'"))),
        };
        rows.push(OptionRow {
            symbol: get(0)?.to_string(),
            underlying: get(1)?.to_string(),
            strike: parse_f64(path, get(2)?)?,
            kind,
            expiry: NaiveDate::parse_from_str(get(4)?, "%Y-%m-%d")
                .map_err(|e| bad_data(path, &e.to_string()))?,
            lot_size: get(5)?
                .parse()
                .map_err(|_| bad_data(path, "bad lot size"))?,
            price: parse_f64(path, get(6)?)?,
        });
    }
    Ok(rows)
}

fn read_quotes(path: &Path) -> Result<HashMap<String, f64>, DaytraderError> {
    let mut quotes = HashMap::new();
    if !path.exists() {
        return Ok(quotes);
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| DaytraderError::ExternalService {
        service: "replay data".into(),
        reason: e.to_string(),
    })?;
    for record in reader.records() {
        let record = record.map_err(|e| bad_data(path, &e.to_string()))?;
        let symbol = record
            .get(0)
            .ok_or_else(|| bad_data(path, "missing symbol"))?;
        let price = parse_f64(path, record.get(1).unwrap_or_default())?;
        quotes.insert(symbol.to_string(), price);
    }
    Ok(quotes)
}

fn parse_f64(path: &Path, value: &str) -> Result<f64, DaytraderError> {
    value
        .parse()
        .map_err(|_| bad_data(path, &format!("bad number '{value}'")))
}

fn bad_data(path: &Path, reason: &str) -> DaytraderError {
    DaytraderError::ExternalService {
        service: "replay data".into(),
        reason: format!("{}: {}", path.display(), reason),
    }
}
