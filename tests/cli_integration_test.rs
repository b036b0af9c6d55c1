//! CLI-level integration: argument parsing, config files on disk, and the
//! offline backtest path against replay CSV data.

use chrono::NaiveDate;
use clap::Parser;
use std::io::Write;
use std::path::Path;

use daytrader::adapters::file_config_adapter::FileConfigAdapter;
use daytrader::adapters::replay_broker::ReplayBroker;
use daytrader::cli::{Cli, Command};
use daytrader::domain::backtest::run_backtest;
use daytrader::domain::config::load_trading_config;
use daytrader::domain::error::DaytraderError;
use daytrader::domain::strategy::create_strategy;
use daytrader::ports::broker_port::BrokerPort;

const VALID_INI: &str = r#"
[trading]
underlying_instrument = NIFTY 50
exchange = NSE
chart_timeframe = 5minute
risk_per_trade_percent = 2
stop_loss_percent = 10
min_stop_loss_points = 2
max_trades_per_day = 2
strike_step = 50

[selection]
win_rate_threshold = 50
backtest_years = 1
bias = Bullish
conditions = trending
recommended_strategy = vwap_momentum

[trailing]
type = percentage
percentage = 15
"#;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

mod argument_parsing {
    use super::*;

    #[test]
    fn run_command_parses() {
        let cli = Cli::try_parse_from(["daytrader", "run", "--config", "bot.ini"]).unwrap();
        assert!(matches!(cli.command, Command::Run { .. }));
    }

    #[test]
    fn backtest_command_parses_window() {
        let cli = Cli::try_parse_from([
            "daytrader",
            "backtest",
            "--config",
            "bot.ini",
            "--strategy",
            "ema_crossover",
            "--from",
            "2023-12-01",
            "--to",
            "2023-12-31",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                strategy, from, to, ..
            } => {
                assert_eq!(strategy.as_deref(), Some("ema_crossover"));
                assert_eq!(from, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
                assert_eq!(to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn backtest_requires_window() {
        assert!(Cli::try_parse_from(["daytrader", "backtest", "--config", "bot.ini"]).is_err());
    }

    #[test]
    fn strategies_command_parses() {
        let cli = Cli::try_parse_from(["daytrader", "strategies"]).unwrap();
        assert!(matches!(cli.command, Command::Strategies));
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn valid_ini_loads_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let config = load_trading_config(&adapter).unwrap();

        assert_eq!(config.underlying_instrument, "NIFTY 50");
        assert_eq!(config.risk_per_trade_percent, 2.0);
        assert_eq!(config.max_trades_per_day, 2);
        assert_eq!(config.win_rate_threshold, 50.0);
    }

    #[test]
    fn missing_underlying_fails() {
        let file = write_temp_ini("[trading]\nexchange = NSE\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let err = load_trading_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            DaytraderError::ConfigMissing { ref key, .. } if key == "underlying_instrument"
        ));
    }

    #[test]
    fn missing_file_fails() {
        assert!(FileConfigAdapter::from_file("/nonexistent/bot.ini").is_err());
    }
}

mod offline_backtest {
    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        write!(file, "{content}").unwrap();
    }

    /// Two daily bars and one rising 60-bar session that stays below the
    /// pivot, so the momentum strategy closes a winner on every recross.
    fn write_replay_data(dir: &Path) {
        write_file(
            dir,
            "day.csv",
            "timestamp,open,high,low,close,volume\n\
             2023-12-14 00:00:00,100,110,90,105,100000\n\
             2023-12-15 00:00:00,104,108,100,104,100000\n",
        );

        let mut intraday = String::from("timestamp,open,high,low,close,volume\n");
        for i in 0..60 {
            let close = 95.0 + i as f64 * 0.1;
            let minute = 15 + 5 * i;
            intraday.push_str(&format!(
                "2023-12-15 {:02}:{:02}:00,{close},{high},{low},{close},1000\n",
                9 + minute / 60,
                minute % 60,
                high = close + 0.5,
                low = close - 0.5,
            ));
        }
        write_file(dir, "intraday.csv", &intraday);
    }

    #[test]
    fn replay_backtest_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        write_replay_data(dir.path());

        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let config = load_trading_config(&adapter).unwrap();

        let broker = ReplayBroker::from_dir(dir.path(), &config.underlying_instrument, 100_000.0)
            .unwrap();
        let from = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();

        let daily = broker
            .historical_bars("NIFTY 50", "NSE", "day", from, to)
            .unwrap();
        let intraday = broker
            .historical_bars("NIFTY 50", "NSE", "5minute", from, to)
            .unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(intraday.len(), 60);

        let mut strategy = create_strategy("vwap_momentum", &config).unwrap();
        let result = run_backtest(strategy.as_mut(), &daily, &intraday);

        assert_eq!(result.strategy, "vwap_momentum");
        assert!(result.trades > 0);
        assert_eq!(result.win_rate, 100.0);
    }

    #[test]
    fn breakout_default_stays_flat_on_the_same_tape() {
        let dir = tempfile::TempDir::new().unwrap();
        write_replay_data(dir.path());

        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let config = load_trading_config(&adapter).unwrap();

        let broker = ReplayBroker::from_dir(dir.path(), &config.underlying_instrument, 100_000.0)
            .unwrap();
        let from = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let daily = broker
            .historical_bars("NIFTY 50", "NSE", "day", from, to)
            .unwrap();
        let intraday = broker
            .historical_bars("NIFTY 50", "NSE", "5minute", from, to)
            .unwrap();

        let mut strategy = create_strategy("pivot_confluence", &config).unwrap();
        let result = run_backtest(strategy.as_mut(), &daily, &intraday);
        assert_eq!(result.trades, 0);
        assert_eq!(result.win_rate, 0.0);
    }
}
