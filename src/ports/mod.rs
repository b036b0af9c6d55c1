//! Port traits: the narrow interfaces the domain consumes.

pub mod broker_port;
pub mod sentiment_port;
pub mod conditions_port;
pub mod advisor_port;
pub mod trade_log_port;
pub mod config_port;
pub mod clock_port;
