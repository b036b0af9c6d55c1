//! Single-trade position lifecycle: sizing output in, stop state maintained
//! across polls, exit decision out.
//!
//! The manager owns the only mutable trade slot in the system; at most one
//! [`ActiveTrade`] is live at any instant. The trailing stop and the high
//! water mark never decrease for the lifetime of a trade.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::domain::error::DaytraderError;
use crate::domain::indicator::{IndicatorCache, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::TradeDirection;

/// How the trailing stop advances as the high water mark rises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailingMode {
    /// Leave the trailing stop at the initial stop.
    None,
    /// Trail at `percentage` percent below the high water mark.
    Percentage(f64),
}

/// Optional exit signal derived from the underlying series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorExit {
    None,
    /// Exit when the underlying close crosses the moving average against the
    /// trade direction.
    MovingAverage { period: usize },
    /// Exit on a parabolic-SAR flip against the trade direction.
    ParabolicSar,
}

/// A sized, resolved order the session wants to open.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub direction: TradeDirection,
    pub symbol: String,
    pub quantity: u32,
    pub lot_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrade {
    pub symbol: String,
    pub quantity: u32,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub initial_stop: f64,
    pub trailing_stop: f64,
    pub high_water_mark: f64,
    pub strategy: String,
    pub opened_at: NaiveDateTime,
}

/// Record produced exactly once per exit, after which the trade slot is
/// cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTrade {
    pub symbol: String,
    pub quantity: u32,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub strategy: String,
    pub opened_at: NaiveDateTime,
    pub closed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    HardStop,
    TrailingStop,
    IndicatorExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageAction {
    Hold,
    Exit(ExitReason),
}

#[derive(Debug)]
pub struct PositionManager {
    stop_loss_percent: f64,
    min_stop_loss_points: f64,
    trailing: TrailingMode,
    indicator_exit: IndicatorExit,
    active: Option<ActiveTrade>,
}

impl PositionManager {
    pub fn new(
        stop_loss_percent: f64,
        min_stop_loss_points: f64,
        trailing: TrailingMode,
        indicator_exit: IndicatorExit,
    ) -> PositionManager {
        PositionManager {
            stop_loss_percent,
            min_stop_loss_points,
            trailing,
            indicator_exit,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveTrade> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Idle → Open. The initial stop sits `max(entry × stop_loss_percent/100,
    /// min_stop_loss_points)` below the entry; the trailing stop starts there
    /// and the high water mark starts at the entry.
    pub fn open(
        &mut self,
        intent: &TradeIntent,
        entry_price: f64,
        strategy: &str,
        opened_at: NaiveDateTime,
    ) -> Result<(), DaytraderError> {
        if self.active.is_some() {
            return Err(DaytraderError::TradeActive);
        }

        let risk = (entry_price * self.stop_loss_percent / 100.0).max(self.min_stop_loss_points);
        let initial_stop = entry_price - risk;

        info!(
            symbol = %intent.symbol,
            direction = %intent.direction,
            quantity = intent.quantity,
            entry = entry_price,
            stop = initial_stop,
            "trade opened"
        );

        self.active = Some(ActiveTrade {
            symbol: intent.symbol.clone(),
            quantity: intent.quantity,
            direction: intent.direction,
            entry_price,
            initial_stop,
            trailing_stop: initial_stop,
            high_water_mark: entry_price,
            strategy: strategy.to_string(),
            opened_at,
        });
        Ok(())
    }

    /// One management poll. Ratchets the high water mark and the trailing
    /// stop, then checks exits in order: hard stop, trailing stop, indicator
    /// exit. Only valid while a trade is open; returns `Hold` when idle.
    pub fn manage(
        &mut self,
        current_price: f64,
        underlying: Option<(&[OhlcvBar], &mut IndicatorCache)>,
    ) -> ManageAction {
        let Some(trade) = self.active.as_mut() else {
            return ManageAction::Hold;
        };

        if current_price > trade.high_water_mark {
            trade.high_water_mark = current_price;
        }

        if let TrailingMode::Percentage(percent) = self.trailing {
            let candidate = trade.high_water_mark * (1.0 - percent / 100.0);
            if candidate > trade.trailing_stop {
                debug!(
                    symbol = %trade.symbol,
                    from = trade.trailing_stop,
                    to = candidate,
                    "trailing stop raised"
                );
                trade.trailing_stop = candidate;
            }
        }

        if current_price <= trade.initial_stop {
            return ManageAction::Exit(ExitReason::HardStop);
        }
        if current_price <= trade.trailing_stop {
            return ManageAction::Exit(ExitReason::TrailingStop);
        }

        if let Some((bars, cache)) = underlying {
            if indicator_exit_triggered(self.indicator_exit, trade.direction, bars, cache) {
                return ManageAction::Exit(ExitReason::IndicatorExit);
            }
        }

        ManageAction::Hold
    }

    /// Open → Closed. Realizes P&L, sign-flipped for SELL-direction trades,
    /// and returns the slot to Idle. `None` when no trade is open.
    pub fn close(&mut self, exit_price: f64, closed_at: NaiveDateTime) -> Option<CompletedTrade> {
        let trade = self.active.take()?;

        let mut pnl = (exit_price - trade.entry_price) * trade.quantity as f64;
        if trade.direction == TradeDirection::Sell {
            pnl = -pnl;
        }

        info!(
            symbol = %trade.symbol,
            entry = trade.entry_price,
            exit = exit_price,
            pnl,
            "trade closed"
        );

        Some(CompletedTrade {
            symbol: trade.symbol,
            quantity: trade.quantity,
            direction: trade.direction,
            entry_price: trade.entry_price,
            exit_price,
            pnl,
            strategy: trade.strategy,
            opened_at: trade.opened_at,
            closed_at,
        })
    }
}

/// Whether the configured underlying-series signal says to leave the trade.
fn indicator_exit_triggered(
    exit: IndicatorExit,
    direction: TradeDirection,
    bars: &[OhlcvBar],
    cache: &mut IndicatorCache,
) -> bool {
    let index = match bars.len() {
        0 | 1 => return false,
        n => n - 1,
    };

    let series_type = match exit {
        IndicatorExit::None => return false,
        IndicatorExit::MovingAverage { period } => IndicatorType::Ema(period),
        IndicatorExit::ParabolicSar => IndicatorType::Psar,
    };

    let (Some(level), Some(prev_level)) = (
        cache.simple(bars, series_type.clone(), index),
        cache.simple(bars, series_type, index - 1),
    ) else {
        return false;
    };

    let close = bars[index].close;
    let prev_close = bars[index - 1].close;

    match direction {
        // Long bias trade: exit when price crosses down through the level.
        TradeDirection::Buy => prev_close >= prev_level && close < level,
        // Short bias trade: exit when price crosses up through the level.
        TradeDirection::Sell => prev_close <= prev_level && close > level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn intent(direction: TradeDirection) -> TradeIntent {
        TradeIntent {
            direction,
            symbol: "NIFTY24JAN22500CE".into(),
            quantity: 50,
            lot_size: 50,
        }
    }

    fn manager(trailing: TrailingMode) -> PositionManager {
        PositionManager::new(10.0, 2.0, trailing, IndicatorExit::None)
    }

    #[test]
    fn initial_stop_uses_percent_when_larger() {
        // entry=100, 10% = 10 > min 2 → stop at 90.
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        let trade = pm.active().unwrap();
        assert!((trade.initial_stop - 90.0).abs() < f64::EPSILON);
        assert!((trade.trailing_stop - 90.0).abs() < f64::EPSILON);
        assert!((trade.high_water_mark - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn initial_stop_uses_min_points_when_larger() {
        let mut pm = PositionManager::new(1.0, 5.0, TrailingMode::None, IndicatorExit::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        // 1% = 1 < min 5 → stop at 95.
        assert!((pm.active().unwrap().initial_stop - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn second_open_is_rejected() {
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        let err = pm
            .open(&intent(TradeDirection::Buy), 101.0, "pivot_confluence", ts())
            .unwrap_err();
        assert!(matches!(err, DaytraderError::TradeActive));
    }

    #[test]
    fn trailing_ratchets_with_high_water_mark() {
        // entry=100, hwm → 120, trail 15% → candidate 102.
        let mut pm = manager(TrailingMode::Percentage(15.0));
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();

        assert_eq!(pm.manage(120.0, None), ManageAction::Hold);
        let trade = pm.active().unwrap();
        assert!((trade.high_water_mark - 120.0).abs() < f64::EPSILON);
        assert!((trade.trailing_stop - 102.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_never_decreases() {
        let mut pm = manager(TrailingMode::Percentage(15.0));
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        pm.manage(120.0, None);
        let high = pm.active().unwrap().trailing_stop;
        // Price retraces but stays above the stop; the stop must hold.
        pm.manage(110.0, None);
        assert!((pm.active().unwrap().trailing_stop - high).abs() < f64::EPSILON);
    }

    #[test]
    fn manage_is_idempotent_at_same_price() {
        let mut pm = manager(TrailingMode::Percentage(15.0));
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        pm.manage(115.0, None);
        let first = pm.active().unwrap().trailing_stop;
        pm.manage(115.0, None);
        assert!((pm.active().unwrap().trailing_stop - first).abs() < f64::EPSILON);
    }

    #[test]
    fn hard_stop_exit() {
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        assert_eq!(
            pm.manage(89.0, None),
            ManageAction::Exit(ExitReason::HardStop)
        );
    }

    #[test]
    fn trailing_stop_exit_after_run_up() {
        let mut pm = manager(TrailingMode::Percentage(15.0));
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        pm.manage(130.0, None); // trailing → 110.5
        assert_eq!(
            pm.manage(110.0, None),
            ManageAction::Exit(ExitReason::TrailingStop)
        );
    }

    #[test]
    fn mode_none_keeps_trailing_at_initial() {
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        pm.manage(150.0, None);
        assert!((pm.active().unwrap().trailing_stop - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_realizes_pnl_and_clears_slot() {
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Buy), 100.0, "pivot_confluence", ts())
            .unwrap();
        let completed = pm.close(110.0, ts()).unwrap();
        assert!((completed.pnl - 500.0).abs() < f64::EPSILON);
        assert!(pm.is_idle());
        assert!(pm.close(110.0, ts()).is_none());
    }

    #[test]
    fn close_flips_sign_for_sell_trades() {
        let mut pm = manager(TrailingMode::None);
        pm.open(&intent(TradeDirection::Sell), 100.0, "pivot_confluence", ts())
            .unwrap();
        let completed = pm.close(110.0, ts()).unwrap();
        assert!((completed.pnl - (-500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn ma_exit_on_cross_below() {
        use crate::domain::ohlcv::OhlcvBar;
        let closes = [100.0, 100.0, 100.0, 101.0, 90.0];
        let bars: Vec<OhlcvBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvBar {
                timestamp: ts() + chrono::Duration::minutes(5 * i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1000,
            })
            .collect();
        let mut cache = IndicatorCache::new();
        let mut pm = PositionManager::new(
            10.0,
            2.0,
            TrailingMode::None,
            IndicatorExit::MovingAverage { period: 3 },
        );
        pm.open(&intent(TradeDirection::Buy), 200.0, "pivot_confluence", ts())
            .unwrap();
        // Option price comfortably above stops; exit must come from the MA cross.
        assert_eq!(
            pm.manage(195.0, Some((bars.as_slice(), &mut cache))),
            ManageAction::Exit(ExitReason::IndicatorExit)
        );
    }

    #[test]
    fn no_indicator_exit_without_cross() {
        use crate::domain::ohlcv::OhlcvBar;
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0];
        let bars: Vec<OhlcvBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvBar {
                timestamp: ts() + chrono::Duration::minutes(5 * i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1000,
            })
            .collect();
        let mut cache = IndicatorCache::new();
        let mut pm = PositionManager::new(
            10.0,
            2.0,
            TrailingMode::None,
            IndicatorExit::MovingAverage { period: 3 },
        );
        pm.open(&intent(TradeDirection::Buy), 200.0, "pivot_confluence", ts())
            .unwrap();
        assert_eq!(
            pm.manage(195.0, Some((bars.as_slice(), &mut cache))),
            ManageAction::Hold
        );
    }

    proptest! {
        /// The trailing stop never decreases over any price path.
        #[test]
        fn trailing_stop_monotone_over_any_path(
            prices in proptest::collection::vec(1.0f64..1000.0, 1..60),
            trail in 1.0f64..50.0,
        ) {
            let mut pm = PositionManager::new(
                10.0,
                2.0,
                TrailingMode::Percentage(trail),
                IndicatorExit::None,
            );
            pm.open(&intent(TradeDirection::Buy), 500.0, "pivot_confluence", ts()).unwrap();

            let mut last_stop = pm.active().unwrap().trailing_stop;
            let mut last_hwm = pm.active().unwrap().high_water_mark;
            for price in prices {
                pm.manage(price, None);
                let trade = pm.active().unwrap();
                prop_assert!(trade.trailing_stop >= last_stop);
                prop_assert!(trade.high_water_mark >= last_hwm);
                last_stop = trade.trailing_stop;
                last_hwm = trade.high_water_mark;
            }
        }

        /// P&L sign follows the trade direction for all inputs.
        #[test]
        fn pnl_sign_flips_for_sell(
            entry in 1.0f64..1000.0,
            exit in 1.0f64..1000.0,
        ) {
            let mut pm = manager(TrailingMode::None);
            pm.open(&intent(TradeDirection::Buy), entry, "pivot_confluence", ts()).unwrap();
            let long = pm.close(exit, ts()).unwrap().pnl;

            pm.open(&intent(TradeDirection::Sell), entry, "pivot_confluence", ts()).unwrap();
            let short = pm.close(exit, ts()).unwrap().pnl;

            prop_assert!((long + short).abs() < 1e-6);
        }
    }
}
