//! Aggregate trade statistics for end-of-day and end-of-month reporting.

use crate::domain::position::CompletedTrade;

/// Win/loss counts and total P&L over a set of completed trades. A win is a
/// strictly positive P&L; zero counts as a loss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeSummary {
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: f64,
}

impl TradeSummary {
    pub fn trades(&self) -> usize {
        self.wins + self.losses
    }

    /// Win rate in percent; 0 when no trades.
    pub fn win_rate(&self) -> f64 {
        if self.trades() == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades() as f64 * 100.0
        }
    }
}

pub fn summarize(trades: &[CompletedTrade]) -> TradeSummary {
    let mut summary = TradeSummary::default();
    for trade in trades {
        if trade.pnl > 0.0 {
            summary.wins += 1;
        } else {
            summary.losses += 1;
        }
        summary.total_pnl += trade.pnl;
    }
    summary
}
