//! Unwind planning: chooses how to unwind a position left imbalanced by a partial
//! fill on one leg of an arbitrage trade.
//!
//! Three candidate exits are always priced from live orderbooks before one is chosen:
//! canceling the resting leg, hedging the filled leg on its own venue at the best
//! available price, or aggressively exiting at a pinned extreme price (0.99/0.01). The
//! cheapest feasible candidate wins; if none is feasible the risk manager's kill switch
//! fires rather than leaving a naked position open indefinitely.

use std::sync::Arc;

use algo_trade_core::market::{MarketSide, OrderbookSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

use crate::risk::RiskManager;

/// The three ways an imbalanced position can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwindAction {
    /// The resting (unfilled) leg's order is still cancelable — no cost beyond the
    /// opportunity already foregone.
    Cancel,
    /// Buy the opposite side of the filled leg on the *same* venue, closing the
    /// position flat at that venue without touching the other one.
    Hedge,
    /// Sell the filled leg back into its own book at a pinned aggressive price (0.99 if
    /// long YES, 0.01 if long NO) to exit as fast as the book allows.
    AggressiveExit,
}

/// One priced candidate considered by the planner. All candidates that could be priced
/// are recorded, not just the winner, so the decision is auditable after the fact.
#[derive(Debug, Clone)]
pub struct UnwindCandidate {
    pub action: UnwindAction,
    /// Cost of taking this action, in dollars per unit of the imbalanced size. Lower is
    /// better; a resting-leg cancellation costs zero.
    pub cost: Decimal,
    pub feasible: bool,
}

/// The chosen unwind action plus every candidate that was evaluated to reach it.
#[derive(Debug, Clone)]
pub struct UnwindPlan {
    pub chosen: Option<UnwindCandidate>,
    pub candidates: Vec<UnwindCandidate>,
}

impl UnwindPlan {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.chosen.is_some()
    }
}

/// Describes the leg left imbalanced: which venue, which side was filled, at what price
/// and size, and whether the *other* venue's order is still resting and cancelable.
#[derive(Debug, Clone)]
pub struct ImbalancedLeg {
    pub filled_side: MarketSide,
    pub filled_price: Decimal,
    pub filled_size: Decimal,
    pub resting_order_cancelable: bool,
}

pub struct UnwindPlanner {
    risk: Arc<RiskManager>,
}

impl UnwindPlanner {
    #[must_use]
    pub fn new(risk: Arc<RiskManager>) -> Self {
        Self { risk }
    }

    /// Evaluates all three candidates for `leg` against `own_venue_book` (the filled
    /// leg's own orderbook, used to price both Hedge and AggressiveExit) and returns the
    /// cheapest feasible one. Arms the risk manager's kill switch if nothing is feasible.
    pub fn plan(&self, leg: &ImbalancedLeg, own_venue_book: &OrderbookSnapshot) -> UnwindPlan {
        let mut candidates = Vec::with_capacity(3);

        candidates.push(UnwindCandidate {
            action: UnwindAction::Cancel,
            cost: Decimal::ZERO,
            feasible: leg.resting_order_cancelable,
        });

        candidates.push(self.price_hedge(leg, own_venue_book));
        candidates.push(self.price_aggressive_exit(leg, own_venue_book));

        let chosen = candidates
            .iter()
            .filter(|c| c.feasible)
            .min_by(|a, b| a.cost.cmp(&b.cost))
            .cloned();

        match &chosen {
            Some(candidate) => info!(action = ?candidate.action, cost = %candidate.cost, "unwind plan chosen"),
            None => {
                error!("no feasible unwind candidate, arming kill switch");
                self.risk.trigger_kill_switch("no feasible unwind path for imbalanced position");
            }
        }

        UnwindPlan { chosen, candidates }
    }

    /// Closing the filled leg out on its own venue by buying the opposite side: the cost
    /// is the opposite side's current ask, which the filled side already pays (the book
    /// only ever quotes asks for both sides via the venue-agnostic snapshot the caller
    /// passes in).
    fn price_hedge(&self, leg: &ImbalancedLeg, own_venue_book: &OrderbookSnapshot) -> UnwindCandidate {
        match own_venue_book.best_ask() {
            Some(ask) if ask.size >= leg.filled_size => {
                UnwindCandidate { action: UnwindAction::Hedge, cost: ask.price, feasible: true }
            }
            _ => UnwindCandidate { action: UnwindAction::Hedge, cost: Decimal::ZERO, feasible: false },
        }
    }

    /// Sells the filled leg back at a pinned extreme price instead of the opposite side:
    /// 0.99 away from the filled price (i.e. accepting a near-total loss) rather than
    /// 1.00, since a resting order exactly at the boundary rarely fills.
    fn price_aggressive_exit(&self, leg: &ImbalancedLeg, own_venue_book: &OrderbookSnapshot) -> UnwindCandidate {
        let pinned_price = match leg.filled_side {
            MarketSide::BuyYes => dec!(0.99),
            MarketSide::BuyNo => dec!(0.01),
        };
        let bid_size = own_venue_book.best_bid().map(|b| b.size).unwrap_or(Decimal::ZERO);
        if bid_size < leg.filled_size {
            warn!(%bid_size, required = %leg.filled_size, "insufficient bid depth for aggressive exit");
            return UnwindCandidate { action: UnwindAction::AggressiveExit, cost: Decimal::ZERO, feasible: false };
        }
        // Cost is the loss realized relative to the entry price.
        let cost = (leg.filled_price - pinned_price).abs();
        UnwindCandidate { action: UnwindAction::AggressiveExit, cost, feasible: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLimits;
    use algo_trade_core::market::{Level, Venue};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn risk_manager() -> Arc<RiskManager> {
        Arc::new(RiskManager::new(RiskLimits::default(), dec!(1000), vec![]))
    }

    fn book(ask: Option<(Decimal, Decimal)>, bid: Option<(Decimal, Decimal)>) -> OrderbookSnapshot {
        OrderbookSnapshot {
            venue: Venue::Kalshi,
            instrument_id: "KXBTC".to_string(),
            last_update: Utc::now(),
            asks: ask.map(|(p, s)| vec![Level { price: p, size: s }]).unwrap_or_default(),
            bids: bid.map(|(p, s)| vec![Level { price: p, size: s }]).unwrap_or_default(),
        }
    }

    #[test]
    fn prefers_cancel_when_resting_order_still_cancelable() {
        let planner = UnwindPlanner::new(risk_manager());
        let leg = ImbalancedLeg {
            filled_side: MarketSide::BuyYes,
            filled_price: dec!(0.40),
            filled_size: dec!(10),
            resting_order_cancelable: true,
        };
        let book = book(Some((dec!(0.45), dec!(20))), Some((dec!(0.39), dec!(20))));
        let plan = planner.plan(&leg, &book);
        assert_eq!(plan.chosen.unwrap().action, UnwindAction::Cancel);
        assert_eq!(plan.candidates.len(), 3);
    }

    #[test]
    fn falls_back_to_cheapest_of_hedge_or_aggressive_when_not_cancelable() {
        let planner = UnwindPlanner::new(risk_manager());
        let leg = ImbalancedLeg {
            filled_side: MarketSide::BuyYes,
            filled_price: dec!(0.40),
            filled_size: dec!(10),
            resting_order_cancelable: false,
        };
        // Hedge (buy NO) costs 0.45; aggressive exit costs |0.40 - 0.99| = 0.59.
        let book = book(Some((dec!(0.45), dec!(20))), Some((dec!(0.39), dec!(20))));
        let plan = planner.plan(&leg, &book);
        let chosen = plan.chosen.unwrap();
        assert_eq!(chosen.action, UnwindAction::Hedge);
        assert_eq!(chosen.cost, dec!(0.45));
    }

    #[test]
    fn kill_switch_fires_when_no_candidate_is_feasible() {
        let risk = risk_manager();
        let planner = UnwindPlanner::new(Arc::clone(&risk));
        let leg = ImbalancedLeg {
            filled_side: MarketSide::BuyYes,
            filled_price: dec!(0.40),
            filled_size: dec!(100),
            resting_order_cancelable: false,
        };
        // Empty book: no ask/bid depth at all, so Hedge and AggressiveExit are both infeasible.
        let empty_book = book(None, None);
        let plan = planner.plan(&leg, &empty_book);
        assert!(plan.chosen.is_none());
        assert!(risk.is_kill_switched());
    }

    #[test]
    fn aggressive_exit_infeasible_when_bid_depth_insufficient() {
        let planner = UnwindPlanner::new(risk_manager());
        let leg = ImbalancedLeg {
            filled_side: MarketSide::BuyNo,
            filled_price: dec!(0.30),
            filled_size: dec!(50),
            resting_order_cancelable: false,
        };
        let book = book(None, Some((dec!(0.29), dec!(5))));
        let plan = planner.plan(&leg, &book);
        // Hedge also infeasible (no ask side), aggressive exit infeasible (insufficient bid size).
        assert!(plan.chosen.is_none());
    }
}
