//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_trade_log::CsvTradeLog;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::pinned_inputs::{PinnedAdvisor, PinnedConditions, PinnedSentiment};
use crate::adapters::replay_broker::ReplayBroker;
use crate::adapters::system_clock::SystemClock;
use crate::domain::backtest::run_backtest;
use crate::domain::config::{load_trading_config, TradingConfig};
use crate::domain::error::DaytraderError;
use crate::domain::selector::select_for_day;
use crate::domain::session::{run_trading_day, SessionPorts};
use crate::domain::strategy::{create_strategy, DEFAULT_STRATEGY, STRATEGY_NAMES};
use crate::ports::broker_port::BrokerPort;
use crate::ports::config_port::ConfigPort;

const DEFAULT_CAPITAL: f64 = 100_000.0;

#[derive(Parser, Debug)]
#[command(name = "daytrader", about = "Intraday options trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one trading day (paper mode against replay data)
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Backtest a strategy over replay data
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy name; defaults to the registry default
        #[arg(short, long)]
        strategy: Option<String>,
        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Run the pre-market strategy selection and print the plan
    Select {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List registered strategies
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config } => run_day(&config),
        Command::Backtest {
            config,
            strategy,
            from,
            to,
        } => run_backtest_cmd(&config, strategy.as_deref(), from, to),
        Command::Select { config } => run_select(&config),
        Command::Strategies => {
            for name in STRATEGY_NAMES {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<(FileConfigAdapter, TradingConfig), DaytraderError> {
    let adapter =
        FileConfigAdapter::from_file(path).map_err(|e| DaytraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let config = load_trading_config(&adapter)?;
    Ok((adapter, config))
}

fn fail(err: DaytraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn build_broker(
    adapter: &dyn ConfigPort,
    config: &TradingConfig,
) -> Result<ReplayBroker, DaytraderError> {
    let data_dir = adapter
        .get_string("data", "directory")
        .unwrap_or_else(|| "data".into());
    ReplayBroker::from_dir(&data_dir, &config.underlying_instrument, DEFAULT_CAPITAL)
}

fn run_day(config_path: &PathBuf) -> ExitCode {
    let (adapter, config) = match load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };
    if !config.paper_trading {
        return fail(DaytraderError::ConfigInvalid {
            section: "trading".into(),
            key: "paper_trading".into(),
            reason: "no live broker gateway is configured; only paper trading is supported"
                .into(),
        });
    }

    let broker = match build_broker(&adapter, &config) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let sentiment = PinnedSentiment::from_config(&adapter);
    let conditions = PinnedConditions::from_config(&adapter);
    let advisor = PinnedAdvisor::from_config(&adapter);
    let clock = SystemClock;
    let log_dir = adapter
        .get_string("log", "directory")
        .unwrap_or_else(|| "output".into());
    let mut trade_log = match CsvTradeLog::new(&log_dir) {
        Ok(log) => log,
        Err(e) => return fail(e),
    };

    let mut ports = SessionPorts {
        broker: &broker,
        sentiment: &sentiment,
        conditions: &conditions,
        advisor: &advisor,
        trade_log: &mut trade_log,
        clock: &clock,
    };

    match run_trading_day(&mut ports, &config) {
        Ok(outcome) => {
            if let Some(reason) = outcome.no_trade_reason {
                println!("no trades: {reason}");
            } else {
                println!("session complete: {} trade(s)", outcome.trades.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_backtest_cmd(
    config_path: &PathBuf,
    strategy_name: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> ExitCode {
    let (adapter, config) = match load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };
    let broker = match build_broker(&adapter, &config) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };

    let name = strategy_name.unwrap_or(DEFAULT_STRATEGY);
    let mut strategy = match create_strategy(name, &config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let from_ts = from.and_time(chrono::NaiveTime::MIN);
    let to_ts = to.and_time(chrono::NaiveTime::MIN) + chrono::Duration::seconds(86_399);
    let daily = match broker.historical_bars(
        &config.underlying_instrument,
        &config.exchange,
        "day",
        from_ts,
        to_ts,
    ) {
        Ok(bars) => bars,
        Err(e) => return fail(e),
    };
    let intraday = match broker.historical_bars(
        &config.underlying_instrument,
        &config.exchange,
        &config.chart_timeframe,
        from_ts,
        to_ts,
    ) {
        Ok(bars) => bars,
        Err(e) => return fail(e),
    };

    let result = run_backtest(strategy.as_mut(), &daily, &intraday);
    println!("strategy:  {}", result.strategy);
    println!("trades:    {}", result.trades);
    println!("win rate:  {:.2}%", result.win_rate);
    ExitCode::SUCCESS
}

fn run_select(config_path: &PathBuf) -> ExitCode {
    let (adapter, config) = match load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };
    let broker = match build_broker(&adapter, &config) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let sentiment = PinnedSentiment::from_config(&adapter);
    let conditions = PinnedConditions::from_config(&adapter);
    let advisor = PinnedAdvisor::from_config(&adapter);
    let clock = SystemClock;

    match select_for_day(&broker, &sentiment, &conditions, &advisor, &clock, &config) {
        Ok(plan) => {
            println!("strategy:  {}", plan.strategy_name);
            println!("bias:      {}", plan.bias);
            match plan.win_rate {
                Some(rate) => println!("win rate:  {rate:.2}%"),
                None => println!("win rate:  (backtest disabled)"),
            }
            println!("pivot:     {:.2}", plan.pivots.pivot);
            println!("tc/bc:     {:.2}/{:.2}", plan.pivots.tc, plan.pivots.bc);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    match load_config(config_path) {
        Ok((_, config)) => {
            println!(
                "configuration ok: trading {} on {} ({})",
                config.underlying_instrument, config.exchange, config.chart_timeframe
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
