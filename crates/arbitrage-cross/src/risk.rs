//! Central risk gate: the single authority a trade must clear before the execution
//! coordinator places any order, and the single place daily loss, net exposure, and the
//! kill switch are tracked.
//!
//! One [`parking_lot::RwLock`] guards all of [`RiskState`] so a check-then-register
//! sequence (`can_execute` followed by `register_trade`) never races against a concurrent
//! trade on the other strategy ordinal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use algo_trade_core::traits::VenueAdapter;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Risk limits read once at startup from configuration; never mutated after construction.
#[derive(Debug, Clone, Copy)]
pub struct RiskLimits {
    pub max_risk_per_trade: Decimal,
    pub max_daily_loss: Decimal,
    pub max_net_exposure: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_risk_per_trade: Decimal::new(10, 2),
            max_daily_loss: Decimal::new(5, 2),
            max_net_exposure: Decimal::new(30, 2),
        }
    }
}

/// Mutable risk-tracking state, held behind [`RiskManager`]'s single lock.
#[derive(Debug, Clone)]
pub struct RiskState {
    pub bankroll: Decimal,
    pub bankroll_at_day_start: Decimal,
    pub daily_pnl: Decimal,
    pub current_exposure: Decimal,
    pub last_reset_date: NaiveDate,
}

impl RiskState {
    fn new(bankroll: Decimal) -> Self {
        Self {
            bankroll,
            bankroll_at_day_start: bankroll,
            daily_pnl: Decimal::ZERO,
            current_exposure: Decimal::ZERO,
            last_reset_date: Utc::now().date_naive(),
        }
    }
}

/// Why [`RiskManager::can_execute`] refused a trade; surfaced to the coordinator for
/// logging, never to decide behavior beyond "don't place the order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RiskRejection {
    #[error("kill switch armed")]
    KillSwitchArmed,
    #[error("trade cost exceeds max_risk_per_trade")]
    ExceedsPerTradeLimit,
    #[error("would breach max_daily_loss")]
    ExceedsDailyLoss,
    #[error("would breach max_net_exposure")]
    ExceedsNetExposure,
}

/// The cross-venue risk gate. One instance is shared (via `Arc`) by the execution
/// coordinator, the unwind planner, and the background balance-sync task.
pub struct RiskManager {
    limits: RiskLimits,
    state: RwLock<RiskState>,
    kill_switch: AtomicBool,
    kill_switch_reason: RwLock<Option<String>>,
    venues: Vec<Arc<dyn VenueAdapter>>,
}

impl RiskManager {
    #[must_use]
    pub fn new(limits: RiskLimits, initial_bankroll: Decimal, venues: Vec<Arc<dyn VenueAdapter>>) -> Self {
        Self {
            limits,
            state: RwLock::new(RiskState::new(initial_bankroll)),
            kill_switch: AtomicBool::new(false),
            kill_switch_reason: RwLock::new(None),
            venues,
        }
    }

    #[must_use]
    pub fn limits(&self) -> RiskLimits {
        self.limits
    }

    #[must_use]
    pub fn snapshot(&self) -> RiskState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn is_kill_switched(&self) -> bool {
        self.kill_switch.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn kill_switch_reason(&self) -> Option<String> {
        self.kill_switch_reason.read().clone()
    }

    /// Returns `Ok(())` when a trade costing `total_cost` (including fees) may proceed
    /// under all three limits; otherwise the specific [`RiskRejection`]. Does not mutate
    /// state — callers that proceed must follow up with [`Self::register_trade`].
    pub fn can_execute(&self, total_cost: Decimal) -> Result<(), RiskRejection> {
        self.check_daily_reset();

        if self.is_kill_switched() {
            return Err(RiskRejection::KillSwitchArmed);
        }

        let state = self.state.read();

        if total_cost > self.limits.max_risk_per_trade * state.bankroll {
            return Err(RiskRejection::ExceedsPerTradeLimit);
        }

        if state.daily_pnl - total_cost < -(self.limits.max_daily_loss * state.bankroll_at_day_start) {
            return Err(RiskRejection::ExceedsDailyLoss);
        }

        if state.current_exposure + total_cost > self.limits.max_net_exposure * state.bankroll {
            return Err(RiskRejection::ExceedsNetExposure);
        }

        Ok(())
    }

    /// Records a trade that has just been committed (both legs filled): books the cost
    /// against exposure. Fees are expected to already be folded into `total_cost`.
    pub fn register_trade(&self, total_cost_including_fees: Decimal) {
        let mut state = self.state.write();
        state.current_exposure += total_cost_including_fees;
        info!(total_cost = %total_cost_including_fees, exposure = %state.current_exposure, "trade registered");
    }

    /// Releases exposure when a position is closed out (settlement or unwind), without
    /// touching realized P&L — callers report the P&L delta separately via
    /// [`Self::update_pnl`].
    pub fn close_position(&self, amount: Decimal) {
        let mut state = self.state.write();
        state.current_exposure = (state.current_exposure - amount).max(Decimal::ZERO);
    }

    /// Applies a realized P&L delta (positive or negative) to the running daily total.
    /// Arms the kill switch itself if the update alone breaches the daily loss limit, since
    /// `can_execute` only guards against *future* trades, not a loss already realized via
    /// settlement or an unwind.
    pub fn update_pnl(&self, delta: Decimal) {
        let breach = {
            let mut state = self.state.write();
            state.daily_pnl += delta;
            state.daily_pnl < -(self.limits.max_daily_loss * state.bankroll_at_day_start)
        };
        if breach {
            self.trigger_kill_switch("daily loss limit breached by realized P&L");
        }
    }

    /// Re-reads authoritative balances from both venues and sums them into `bankroll`.
    /// Called on startup and by the 30s background task spawned from
    /// [`Self::spawn_balance_sync_task`]; logs and leaves the prior bankroll in place on
    /// a transient fetch error rather than zeroing it out.
    pub async fn sync_balance(&self) {
        let mut total = Decimal::ZERO;
        for venue in &self.venues {
            match venue.get_balance().await {
                Ok(balance) => total += balance,
                Err(err) => {
                    warn!(error = %err, "balance sync failed for one venue, keeping prior bankroll");
                    return;
                }
            }
        }
        let mut state = self.state.write();
        state.bankroll = total;
        info!(bankroll = %total, "balance synced");
    }

    /// Spawns the periodic (default 30s) background balance refresh. The returned handle
    /// is owned by the caller (typically the orchestrator), which aborts it on shutdown.
    #[must_use]
    pub fn spawn_balance_sync_task(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                this.sync_balance().await;
            }
        })
    }

    /// Permanently (until process restart) disables `can_execute`. Idempotent; the first
    /// caller's reason wins.
    pub fn trigger_kill_switch(&self, reason: impl Into<String>) {
        if !self.kill_switch.swap(true, Ordering::SeqCst) {
            let reason = reason.into();
            error!(%reason, "kill switch armed");
            *self.kill_switch_reason.write() = Some(reason);
        }
    }

    /// Resets `daily_pnl`, `current_exposure`, and `bankroll_at_day_start` at UTC
    /// calendar-date rollover. A no-op on every call within the same day; the execution
    /// coordinator calls this before every `can_execute` so a long-idle process still
    /// resets promptly on the next trade attempt rather than only at midnight.
    pub fn check_daily_reset(&self) {
        let today = Utc::now().date_naive();
        let mut state = self.state.write();
        if state.last_reset_date != today {
            info!(previous_pnl = %state.daily_pnl, "daily risk window reset");
            state.daily_pnl = Decimal::ZERO;
            state.current_exposure = Decimal::ZERO;
            state.bankroll_at_day_start = state.bankroll;
            state.last_reset_date = today;
        }
    }
}
