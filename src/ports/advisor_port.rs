//! Strategy advisor port trait.

use crate::domain::error::DaytraderError;

pub trait AdvisorPort {
    /// Recommend one strategy name from the registry for the given condition
    /// tags. Callers treat errors and unknown names as the default strategy.
    fn recommend(&self, conditions: &[String]) -> Result<String, DaytraderError>;
}
