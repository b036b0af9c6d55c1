//! Concrete port implementations.

pub mod file_config_adapter;
pub mod csv_trade_log;
pub mod replay_broker;
pub mod pinned_inputs;
pub mod system_clock;
