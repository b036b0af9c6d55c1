//! Market condition identification port trait.

use chrono::NaiveDate;

use crate::domain::error::DaytraderError;

/// Tag emitted when conditions cannot be determined; its presence aborts
/// the day's setup.
pub const UNKNOWN_CONDITION: &str = "unknown";

pub trait ConditionsPort {
    /// Condition tags for a date (e.g. "trending", "high_volatility").
    fn conditions_for(&self, date: NaiveDate) -> Result<Vec<String>, DaytraderError>;
}
