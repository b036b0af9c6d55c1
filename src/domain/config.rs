//! Trading configuration: one explicit structure resolved and validated once
//! at load time, with every default applied centrally.

use chrono::{NaiveTime, Weekday};

use crate::domain::error::DaytraderError;
use crate::domain::position::{IndicatorExit, TrailingMode};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct TradingConfig {
    pub underlying_instrument: String,
    pub exchange: String,
    pub derivatives_exchange: String,
    pub chart_timeframe: String,
    pub risk_per_trade_percent: f64,
    pub stop_loss_percent: f64,
    pub min_stop_loss_points: f64,
    pub risk_reward_ratio: f64,
    pub max_trades_per_day: u32,
    pub max_vix_level: f64,
    pub vix_symbol: String,
    pub orb_minutes: u32,
    pub strike_step: f64,
    pub expiry_weekday: Weekday,
    pub paper_trading: bool,
    pub win_rate_threshold: f64,
    pub backtest_years: u32,
    pub run_startup_backtest: bool,
    pub session_open: NaiveTime,
    pub trade_start: NaiveTime,
    pub session_close: NaiveTime,
    pub poll_interval_secs: u64,
    pub trailing: TrailingMode,
    pub indicator_exit: IndicatorExit,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            underlying_instrument: String::new(),
            exchange: "NSE".into(),
            derivatives_exchange: "NFO".into(),
            chart_timeframe: "5minute".into(),
            risk_per_trade_percent: 1.0,
            stop_loss_percent: 10.0,
            min_stop_loss_points: 2.0,
            risk_reward_ratio: 2.0,
            max_trades_per_day: 2,
            max_vix_level: 20.0,
            vix_symbol: "INDIA VIX".into(),
            orb_minutes: 30,
            strike_step: 50.0,
            expiry_weekday: Weekday::Thu,
            paper_trading: true,
            win_rate_threshold: 50.0,
            backtest_years: 1,
            run_startup_backtest: true,
            session_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            trade_start: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
            session_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            poll_interval_secs: 30,
            trailing: TrailingMode::None,
            indicator_exit: IndicatorExit::None,
        }
    }
}

pub fn load_trading_config(config: &dyn ConfigPort) -> Result<TradingConfig, DaytraderError> {
    let defaults = TradingConfig::default();

    let underlying_instrument = match config.get_string("trading", "underlying_instrument") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(DaytraderError::ConfigMissing {
                section: "trading".into(),
                key: "underlying_instrument".into(),
            });
        }
    };

    let loaded = TradingConfig {
        underlying_instrument,
        exchange: config
            .get_string("trading", "exchange")
            .unwrap_or(defaults.exchange),
        derivatives_exchange: config
            .get_string("trading", "derivatives_exchange")
            .unwrap_or(defaults.derivatives_exchange),
        chart_timeframe: config
            .get_string("trading", "chart_timeframe")
            .unwrap_or(defaults.chart_timeframe),
        risk_per_trade_percent: config.get_double(
            "trading",
            "risk_per_trade_percent",
            defaults.risk_per_trade_percent,
        ),
        stop_loss_percent: config.get_double(
            "trading",
            "stop_loss_percent",
            defaults.stop_loss_percent,
        ),
        min_stop_loss_points: config.get_double(
            "trading",
            "min_stop_loss_points",
            defaults.min_stop_loss_points,
        ),
        risk_reward_ratio: config.get_double(
            "trading",
            "risk_reward_ratio",
            defaults.risk_reward_ratio,
        ),
        max_trades_per_day: config.get_int(
            "trading",
            "max_trades_per_day",
            defaults.max_trades_per_day as i64,
        ) as u32,
        max_vix_level: config.get_double("trading", "max_vix_level", defaults.max_vix_level),
        vix_symbol: config
            .get_string("trading", "vix_symbol")
            .unwrap_or(defaults.vix_symbol),
        orb_minutes: config.get_int("trading", "orb_minutes", defaults.orb_minutes as i64) as u32,
        strike_step: config.get_double("trading", "strike_step", defaults.strike_step),
        expiry_weekday: parse_weekday(
            config
                .get_string("trading", "expiry_weekday")
                .as_deref()
                .unwrap_or("thursday"),
        )?,
        paper_trading: config.get_bool("trading", "paper_trading", defaults.paper_trading),
        win_rate_threshold: config.get_double(
            "selection",
            "win_rate_threshold",
            defaults.win_rate_threshold,
        ),
        backtest_years: config.get_int(
            "selection",
            "backtest_years",
            defaults.backtest_years as i64,
        ) as u32,
        run_startup_backtest: config.get_bool(
            "selection",
            "run_startup_backtest",
            defaults.run_startup_backtest,
        ),
        session_open: parse_time(config, "session", "open", defaults.session_open)?,
        trade_start: parse_time(config, "session", "trade_start", defaults.trade_start)?,
        session_close: parse_time(config, "session", "close", defaults.session_close)?,
        poll_interval_secs: config.get_int(
            "session",
            "poll_interval_secs",
            defaults.poll_interval_secs as i64,
        ) as u64,
        trailing: parse_trailing(config)?,
        indicator_exit: parse_indicator_exit(config)?,
    };

    validate(&loaded)?;
    Ok(loaded)
}

fn parse_time(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: NaiveTime,
) -> Result<NaiveTime, DaytraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M").map_err(|_| {
            DaytraderError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("invalid time '{}', expected HH:MM", s),
            }
        }),
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, DaytraderError> {
    match value.to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        other => Err(DaytraderError::ConfigInvalid {
            section: "trading".into(),
            key: "expiry_weekday".into(),
            reason: format!("'{}' is not a trading weekday", other),
        }),
    }
}

fn parse_trailing(config: &dyn ConfigPort) -> Result<TrailingMode, DaytraderError> {
    let mode = config
        .get_string("trailing", "type")
        .unwrap_or_else(|| "none".into());
    match mode.to_lowercase().as_str() {
        "none" => Ok(TrailingMode::None),
        "percentage" => {
            let percent = config.get_double("trailing", "percentage", 15.0);
            if percent <= 0.0 || percent >= 100.0 {
                return Err(DaytraderError::ConfigInvalid {
                    section: "trailing".into(),
                    key: "percentage".into(),
                    reason: "percentage must be between 0 and 100".into(),
                });
            }
            Ok(TrailingMode::Percentage(percent))
        }
        other => Err(DaytraderError::ConfigInvalid {
            section: "trailing".into(),
            key: "type".into(),
            reason: format!("unknown trailing type '{}'", other),
        }),
    }
}

fn parse_indicator_exit(config: &dyn ConfigPort) -> Result<IndicatorExit, DaytraderError> {
    if !config.get_bool("trailing", "use_indicator_exit", false) {
        return Ok(IndicatorExit::None);
    }
    let kind = config
        .get_string("trailing", "indicator_exit_type")
        .unwrap_or_else(|| "none".into());
    match kind.to_lowercase().as_str() {
        "none" => Ok(IndicatorExit::None),
        "ma" => {
            let period = config.get_int("trailing", "ma_period", 20);
            if period <= 0 {
                return Err(DaytraderError::ConfigInvalid {
                    section: "trailing".into(),
                    key: "ma_period".into(),
                    reason: "ma_period must be positive".into(),
                });
            }
            Ok(IndicatorExit::MovingAverage {
                period: period as usize,
            })
        }
        "psar" => Ok(IndicatorExit::ParabolicSar),
        other => Err(DaytraderError::ConfigInvalid {
            section: "trailing".into(),
            key: "indicator_exit_type".into(),
            reason: format!("unknown indicator exit '{}'", other),
        }),
    }
}

fn validate(cfg: &TradingConfig) -> Result<(), DaytraderError> {
    fn invalid(key: &str, reason: &str) -> DaytraderError {
        DaytraderError::ConfigInvalid {
            section: "trading".into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    if cfg.risk_per_trade_percent <= 0.0 || cfg.risk_per_trade_percent > 100.0 {
        return Err(invalid(
            "risk_per_trade_percent",
            "must be between 0 and 100",
        ));
    }
    if cfg.stop_loss_percent <= 0.0 || cfg.stop_loss_percent >= 100.0 {
        return Err(invalid("stop_loss_percent", "must be between 0 and 100"));
    }
    if cfg.min_stop_loss_points < 0.0 {
        return Err(invalid("min_stop_loss_points", "must be non-negative"));
    }
    if cfg.risk_reward_ratio <= 0.0 {
        return Err(invalid("risk_reward_ratio", "must be positive"));
    }
    if cfg.max_trades_per_day == 0 {
        return Err(invalid("max_trades_per_day", "must be at least 1"));
    }
    if cfg.orb_minutes == 0 {
        return Err(invalid("orb_minutes", "must be positive"));
    }
    if cfg.strike_step <= 0.0 {
        return Err(invalid("strike_step", "must be positive"));
    }
    if !(0.0..=100.0).contains(&cfg.win_rate_threshold) {
        return Err(DaytraderError::ConfigInvalid {
            section: "selection".into(),
            key: "win_rate_threshold".into(),
            reason: "must be between 0 and 100".into(),
        });
    }
    if cfg.backtest_years == 0 {
        return Err(DaytraderError::ConfigInvalid {
            section: "selection".into(),
            key: "backtest_years".into(),
            reason: "must be at least 1".into(),
        });
    }
    if cfg.poll_interval_secs == 0 {
        return Err(DaytraderError::ConfigInvalid {
            section: "session".into(),
            key: "poll_interval_secs".into(),
            reason: "must be positive".into(),
        });
    }
    if cfg.session_open >= cfg.session_close {
        return Err(DaytraderError::ConfigInvalid {
            section: "session".into(),
            key: "open".into(),
            reason: "session open must precede close".into(),
        });
    }
    if cfg.trade_start < cfg.session_open || cfg.trade_start >= cfg.session_close {
        return Err(DaytraderError::ConfigInvalid {
            section: "session".into(),
            key: "trade_start".into(),
            reason: "trade_start must fall inside the session".into(),
        });
    }
    Ok(())
}
