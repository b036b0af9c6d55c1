//! Config-pinned stand-ins for the external sentiment, condition and advisor
//! services, used for paper trading and offline runs. Real integrations plug
//! in behind the same ports.

use chrono::NaiveDate;

use crate::domain::error::DaytraderError;
use crate::domain::signal::Bias;
use crate::ports::advisor_port::AdvisorPort;
use crate::ports::conditions_port::{ConditionsPort, UNKNOWN_CONDITION};
use crate::ports::config_port::ConfigPort;
use crate::ports::sentiment_port::SentimentPort;

/// Bias pinned from `[selection] bias`; missing or unrecognized values read
/// as Neutral, which halts the day.
pub struct PinnedSentiment {
    bias: Bias,
}

impl PinnedSentiment {
    pub fn from_config(config: &dyn ConfigPort) -> PinnedSentiment {
        let bias = match config
            .get_string("selection", "bias")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "bullish" => Bias::Bullish,
            "bearish" => Bias::Bearish,
            _ => Bias::Neutral,
        };
        PinnedSentiment { bias }
    }
}

impl SentimentPort for PinnedSentiment {
    fn market_bias(&self) -> Result<Bias, DaytraderError> {
        Ok(self.bias)
    }
}

/// Condition tags pinned from `[selection] conditions` (comma-separated);
/// empty config reads as unknown.
pub struct PinnedConditions {
    tags: Vec<String>,
}

impl PinnedConditions {
    pub fn from_config(config: &dyn ConfigPort) -> PinnedConditions {
        let tags: Vec<String> = config
            .get_string("selection", "conditions")
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        PinnedConditions {
            tags: if tags.is_empty() {
                vec![UNKNOWN_CONDITION.to_string()]
            } else {
                tags
            },
        }
    }
}

impl ConditionsPort for PinnedConditions {
    fn conditions_for(&self, _date: NaiveDate) -> Result<Vec<String>, DaytraderError> {
        Ok(self.tags.clone())
    }
}

/// Recommendation pinned from `[selection] recommended_strategy`; missing
/// values fall back to the registry default at the selection layer.
pub struct PinnedAdvisor {
    recommendation: Option<String>,
}

impl PinnedAdvisor {
    pub fn from_config(config: &dyn ConfigPort) -> PinnedAdvisor {
        PinnedAdvisor {
            recommendation: config.get_string("selection", "recommended_strategy"),
        }
    }
}

impl AdvisorPort for PinnedAdvisor {
    fn recommend(&self, _conditions: &[String]) -> Result<String, DaytraderError> {
        self.recommendation
            .clone()
            .ok_or_else(|| DaytraderError::external("advisor", "no recommendation configured"))
    }
}
