//! Option selection and quantity sizing for a trade direction.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{info, warn};

use crate::domain::config::TradingConfig;
use crate::domain::error::DaytraderError;
use crate::domain::position::TradeIntent;
use crate::domain::signal::TradeDirection;
use crate::ports::broker_port::{BrokerPort, OptionKind};

/// Round the reference price to the nearest strike increment.
pub fn atm_strike(price: f64, step: f64) -> f64 {
    (price / step).round() * step
}

/// One increment out of the money in the direction's favor.
pub fn otm_strike(price: f64, step: f64, direction: TradeDirection) -> f64 {
    let atm = atm_strike(price, step);
    match direction {
        TradeDirection::Buy => atm + step,
        TradeDirection::Sell => atm - step,
    }
}

/// Next occurrence of the weekly expiry weekday. Yields `today` itself on the
/// expiry weekday rather than rolling a week ahead.
pub fn nearest_weekly_expiry(today: NaiveDate, expiry_weekday: chrono::Weekday) -> NaiveDate {
    let days_ahead = (expiry_weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    today + Duration::days(days_ahead)
}

/// Quantity for the risk budget: whole lots, minimum one lot.
pub fn lot_quantity(capital: f64, risk_percent: f64, option_price: f64, lot_size: u32) -> u32 {
    let risk_amount = capital * risk_percent / 100.0;
    let lots = (risk_amount / (option_price * lot_size as f64)).floor() as u32;
    lots.max(1) * lot_size
}

/// Resolve and size the option trade for a direction. `Ok(None)` means no
/// tradeable contract: unresolvable instrument or a zero option price. Both
/// are logged and leave the cycle to continue.
pub fn plan_option_trade(
    direction: TradeDirection,
    broker: &dyn BrokerPort,
    config: &TradingConfig,
    today: NaiveDate,
) -> Result<Option<TradeIntent>, DaytraderError> {
    let underlying_price =
        broker.last_price(&config.underlying_instrument, &config.exchange)?;

    let strike = otm_strike(underlying_price, config.strike_step, direction);
    let kind = match direction {
        TradeDirection::Buy => OptionKind::Call,
        TradeDirection::Sell => OptionKind::Put,
    };
    let expiry = nearest_weekly_expiry(today, config.expiry_weekday);

    let Some(instrument) =
        broker.resolve_option(&config.underlying_instrument, strike, kind, expiry)?
    else {
        warn!(
            strike,
            %kind,
            %expiry,
            "no matching option contract, skipping trade"
        );
        return Ok(None);
    };

    let option_price = broker.last_price(&instrument.symbol, &config.derivatives_exchange)?;
    if option_price == 0.0 {
        warn!(symbol = %instrument.symbol, "option price is zero, skipping trade");
        return Ok(None);
    }

    let capital = broker.available_capital()?;
    let quantity = lot_quantity(
        capital,
        config.risk_per_trade_percent,
        option_price,
        instrument.lot_size,
    );

    info!(
        symbol = %instrument.symbol,
        %direction,
        quantity,
        option_price,
        "sized option trade"
    );

    Ok(Some(TradeIntent {
        direction,
        symbol: instrument.symbol,
        quantity,
        lot_size: instrument.lot_size,
    }))
}
