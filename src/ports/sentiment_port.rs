//! Market sentiment port trait.

use crate::domain::error::DaytraderError;
use crate::domain::signal::Bias;

pub trait SentimentPort {
    /// Today's directional bias. Neutral halts trading for the day.
    fn market_bias(&self) -> Result<Bias, DaytraderError>;
}
