//! Execution coordination: turns a detected [`crate::detector::Opportunity`] into
//! two simultaneously-placed orders, monitors both to a terminal state, and either
//! registers the trade or hands an imbalanced position to the unwind planner.
//!
//! # Protocol
//!
//! 1. Resolve both legs' venue adapters from the opportunity.
//! 2. Pull fresh books for both legs (cache hit, else a direct fetch).
//! 3. Strict liquidity check at the opportunity's recorded target price — no silent
//!    fallback to a deeper, worse-priced level.
//! 4. Size the trade against the risk manager's bankroll and venue minimums.
//! 5. Gate the trade through the risk manager.
//! 6. Place both orders concurrently with `tokio::join!`.
//! 7. Monitor both orders to a terminal state on an exponential backoff schedule.
//! 8. Classify the terminal outcome.
//! 9. Both filled: register the trade with the risk manager.
//! 10. Otherwise: hand the imbalanced leg to the unwind planner.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use algo_trade_core::config::ArbitrageConfig;
use algo_trade_core::market::{MarketSide, OrderStatus};
use algo_trade_core::traits::VenueAdapter;

use crate::cache::OrderbookCache;
use crate::detector::Opportunity;
use crate::risk::{RiskManager, RiskRejection};
use crate::types::{Exchange, Side};
use crate::unwind::{ImbalancedLeg, UnwindPlan, UnwindPlanner};

/// Minimum order size enforced on both venues absent a venue-specific override (both
/// Kalshi and Polymarket's hard limits default to a 1-contract/1-share floor).
pub const VENUE_MIN_SIZE: Decimal = Decimal::ONE;

/// A completed round-trip arbitrage trade: both legs filled and the position is
/// balanced and flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub matched_ticker: String,
    pub strategy: crate::detector::Strategy,
    pub size: Decimal,
    /// Total cost of both legs including fees, per unit times `size`.
    pub total_cost: Decimal,
    pub net_profit: Decimal,
    pub executed_at: DateTime<Utc>,
}

/// Terminal result of [`ExecutionCoordinator::execute`].
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Both legs filled; the trade has been registered with the risk manager.
    BothFilled(Trade),
    /// One leg filled, the other did not; the unwind planner was invoked for the
    /// filled leg and `plan` records what it chose (or that nothing was feasible).
    Unwound { filled_venue: Exchange, plan: UnwindPlan },
    /// Neither leg filled before the fill-monitoring schedule elapsed; both orders were
    /// canceled and no position exists.
    NeitherFilled,
    /// The risk manager refused the trade before any order was placed.
    RiskRejected(RiskRejection),
    /// The strict liquidity check failed on the latest book — the opportunity's
    /// recorded price/size is no longer actually available.
    InsufficientLiquidity,
}

/// Coordinates execution across both venues for one matched pair. Shared (via `Arc`)
/// between every opportunity the orchestrator hands it; internally stateless aside from
/// the risk manager and orderbook cache it holds references to.
pub struct ExecutionCoordinator {
    kalshi: Arc<dyn VenueAdapter>,
    polymarket: Arc<dyn VenueAdapter>,
    cache: Arc<OrderbookCache>,
    risk: Arc<RiskManager>,
    unwind: UnwindPlanner,
    config: ArbitrageConfig,
}

impl ExecutionCoordinator {
    #[must_use]
    pub fn new(
        kalshi: Arc<dyn VenueAdapter>,
        polymarket: Arc<dyn VenueAdapter>,
        cache: Arc<OrderbookCache>,
        risk: Arc<RiskManager>,
        config: ArbitrageConfig,
    ) -> Self {
        let unwind = UnwindPlanner::new(Arc::clone(&risk));
        Self { kalshi, polymarket, cache, risk, unwind, config }
    }

    fn adapter_for(&self, venue: Exchange) -> &Arc<dyn VenueAdapter> {
        match venue {
            Exchange::Kalshi => &self.kalshi,
            Exchange::Polymarket => &self.polymarket,
        }
    }

    fn venue_of(venue: Exchange) -> algo_trade_core::market::Venue {
        match venue {
            Exchange::Kalshi => algo_trade_core::market::Venue::Kalshi,
            Exchange::Polymarket => algo_trade_core::market::Venue::Polymarket,
        }
    }

    fn market_side(side: Side) -> MarketSide {
        match side {
            Side::Yes => MarketSide::BuyYes,
            Side::No => MarketSide::BuyNo,
        }
    }

    /// Returns a fresh orderbook for `instrument_id` on `venue`: a live cache hit if one
    /// exists, otherwise a direct fetch (which also repopulates the cache).
    async fn fresh_book(
        &self,
        venue: Exchange,
        instrument_id: &str,
    ) -> anyhow::Result<algo_trade_core::market::OrderbookSnapshot> {
        let core_venue = Self::venue_of(venue);
        if let Some(snapshot) = self.cache.get(core_venue, instrument_id) {
            return Ok(snapshot);
        }
        let snapshot = self.adapter_for(venue).get_orderbook(instrument_id).await?;
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    /// Executes `opportunity` end to end. Never panics on a venue error; every failure
    /// mode collapses into an [`ExecutionOutcome`] variant the orchestrator can log and
    /// move past.
    pub async fn execute(&self, opportunity: &Opportunity) -> ExecutionOutcome {
        let leg_a_book = match self.fresh_book(opportunity.leg_a.venue, &opportunity.leg_a.instrument_id).await {
            Ok(book) => book,
            Err(err) => {
                warn!(error = %err, "fresh book fetch failed for leg A");
                return ExecutionOutcome::InsufficientLiquidity;
            }
        };
        let leg_b_book = match self.fresh_book(opportunity.leg_b.venue, &opportunity.leg_b.instrument_id).await {
            Ok(book) => book,
            Err(err) => {
                warn!(error = %err, "fresh book fetch failed for leg B");
                return ExecutionOutcome::InsufficientLiquidity;
            }
        };

        if !Self::liquidity_holds(&leg_a_book, opportunity.leg_a.target_price, opportunity.available_size)
            || !Self::liquidity_holds(&leg_b_book, opportunity.leg_b.target_price, opportunity.available_size)
        {
            info!(ticker = %opportunity.matched_market.kalshi_ticker, "strict liquidity check failed");
            return ExecutionOutcome::InsufficientLiquidity;
        }

        let unit_cost = opportunity.leg_a.target_price + opportunity.leg_b.target_price;
        if unit_cost <= Decimal::ZERO {
            return ExecutionOutcome::InsufficientLiquidity;
        }

        let bankroll = self.risk.snapshot().bankroll;
        let max_risk_per_trade = Decimal::try_from(self.config.max_risk_per_trade).unwrap_or(Decimal::ZERO);
        let size_cap = (max_risk_per_trade * bankroll / unit_cost).floor();
        let size = size_cap.min(opportunity.available_size).floor();

        if size < VENUE_MIN_SIZE {
            info!(%size, "sized trade below venue minimum, skipping");
            return ExecutionOutcome::InsufficientLiquidity;
        }

        // `net_profit_per_unit` already folds in fees, so the fee-inclusive per-unit cost
        // is just the complement.
        let cost_per_unit_incl_fees = Decimal::ONE - opportunity.net_profit_per_unit;
        let total_cost = size * cost_per_unit_incl_fees;

        if let Err(rejection) = self.risk.can_execute(total_cost) {
            info!(?rejection, "risk manager rejected trade");
            return ExecutionOutcome::RiskRejected(rejection);
        }

        let (leg_a_result, leg_b_result) = tokio::join!(
            self.adapter_for(opportunity.leg_a.venue).place_order(
                &opportunity.leg_a.instrument_id,
                Self::market_side(opportunity.leg_a.side),
                size,
                opportunity.leg_a.target_price,
            ),
            self.adapter_for(opportunity.leg_b.venue).place_order(
                &opportunity.leg_b.instrument_id,
                Self::market_side(opportunity.leg_b.side),
                size,
                opportunity.leg_b.target_price,
            ),
        );

        let leg_a_order_id = match leg_a_result {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, "leg A order placement failed");
                return self.handle_single_placement_failure(opportunity, leg_b_result, Exchange::Polymarket).await;
            }
        };
        let leg_b_order_id = match leg_b_result {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, "leg B order placement failed");
                return self
                    .handle_single_leg_outcome(opportunity, Exchange::Kalshi, &leg_a_order_id, &leg_a_book)
                    .await;
            }
        };

        let ((leg_a_status, leg_a_filled), (leg_b_status, leg_b_filled)) = tokio::join!(
            self.monitor_fill(opportunity.leg_a.venue, &leg_a_order_id, &self.config.fill_monitor_schedule_ms),
            self.monitor_fill(opportunity.leg_b.venue, &leg_b_order_id, &self.config.fill_monitor_schedule_ms),
        );

        match (leg_a_status, leg_b_status) {
            (OrderStatus::Filled, OrderStatus::Filled) => {
                self.risk.register_trade(total_cost);
                let trade = Trade {
                    matched_ticker: opportunity.matched_market.kalshi_ticker.clone(),
                    strategy: opportunity.strategy,
                    size,
                    total_cost,
                    net_profit: size * opportunity.net_profit_per_unit,
                    executed_at: Utc::now(),
                };
                info!(ticker = %trade.matched_ticker, net_profit = %trade.net_profit, "trade filled both legs");
                ExecutionOutcome::BothFilled(trade)
            }
            (OrderStatus::Filled, _) => {
                self.cancel_if_resting(opportunity.leg_b.venue, &leg_b_order_id, leg_b_status).await;
                let plan = self
                    .unwind_filled_leg(Exchange::Kalshi, opportunity.leg_a.side, opportunity.leg_a.target_price, leg_a_filled, &leg_a_book)
                    .await;
                ExecutionOutcome::Unwound { filled_venue: Exchange::Kalshi, plan }
            }
            (_, OrderStatus::Filled) => {
                self.cancel_if_resting(opportunity.leg_a.venue, &leg_a_order_id, leg_a_status).await;
                let plan = self
                    .unwind_filled_leg(Exchange::Polymarket, opportunity.leg_b.side, opportunity.leg_b.target_price, leg_b_filled, &leg_b_book)
                    .await;
                ExecutionOutcome::Unwound { filled_venue: Exchange::Polymarket, plan }
            }
            (OrderStatus::Partial, _) | (_, OrderStatus::Partial) => {
                self.cancel_if_resting(opportunity.leg_a.venue, &leg_a_order_id, leg_a_status).await;
                self.cancel_if_resting(opportunity.leg_b.venue, &leg_b_order_id, leg_b_status).await;
                if leg_a_filled > Decimal::ZERO {
                    let plan = self
                        .unwind_filled_leg(Exchange::Kalshi, opportunity.leg_a.side, opportunity.leg_a.target_price, leg_a_filled, &leg_a_book)
                        .await;
                    ExecutionOutcome::Unwound { filled_venue: Exchange::Kalshi, plan }
                } else {
                    let plan = self
                        .unwind_filled_leg(Exchange::Polymarket, opportunity.leg_b.side, opportunity.leg_b.target_price, leg_b_filled, &leg_b_book)
                        .await;
                    ExecutionOutcome::Unwound { filled_venue: Exchange::Polymarket, plan }
                }
            }
            _ => {
                self.cancel_if_resting(opportunity.leg_a.venue, &leg_a_order_id, leg_a_status).await;
                self.cancel_if_resting(opportunity.leg_b.venue, &leg_b_order_id, leg_b_status).await;
                ExecutionOutcome::NeitherFilled
            }
        }
    }

    /// One leg's placement call itself returned an error (not just a bad fill) — the
    /// other leg may still be live and needs cancellation or unwinding.
    async fn handle_single_placement_failure(
        &self,
        opportunity: &Opportunity,
        other_result: anyhow::Result<String>,
        other_venue: Exchange,
    ) -> ExecutionOutcome {
        match other_result {
            Ok(order_id) => {
                let leg = if other_venue == opportunity.leg_a.venue { &opportunity.leg_a } else { &opportunity.leg_b };
                let fresh = self.fresh_book(other_venue, &leg.instrument_id).await.ok();
                let (status, filled) = self
                    .monitor_fill(other_venue, &order_id, &self.config.fill_monitor_schedule_ms)
                    .await;
                if status == OrderStatus::Filled {
                    if let Some(book) = fresh {
                        let plan = self.unwind_filled_leg(other_venue, leg.side, leg.target_price, filled, &book).await;
                        return ExecutionOutcome::Unwound { filled_venue: other_venue, plan };
                    }
                }
                self.cancel_if_resting(other_venue, &order_id, status).await;
                ExecutionOutcome::NeitherFilled
            }
            Err(_) => ExecutionOutcome::NeitherFilled,
        }
    }

    async fn handle_single_leg_outcome(
        &self,
        opportunity: &Opportunity,
        filled_venue: Exchange,
        order_id: &str,
        book: &algo_trade_core::market::OrderbookSnapshot,
    ) -> ExecutionOutcome {
        let leg = if filled_venue == opportunity.leg_a.venue { &opportunity.leg_a } else { &opportunity.leg_b };
        let (status, filled) =
            self.monitor_fill(filled_venue, order_id, &self.config.fill_monitor_schedule_ms).await;
        if status == OrderStatus::Filled {
            let plan = self.unwind_filled_leg(filled_venue, leg.side, leg.target_price, filled, book).await;
            ExecutionOutcome::Unwound { filled_venue, plan }
        } else {
            self.cancel_if_resting(filled_venue, order_id, status).await;
            ExecutionOutcome::NeitherFilled
        }
    }

    async fn unwind_filled_leg(
        &self,
        venue: Exchange,
        side: Side,
        filled_price: Decimal,
        filled_size: Decimal,
        own_venue_book: &algo_trade_core::market::OrderbookSnapshot,
    ) -> UnwindPlan {
        let _ = venue;
        let imbalanced = ImbalancedLeg {
            filled_side: Self::market_side(side),
            filled_price,
            filled_size,
            resting_order_cancelable: false,
        };
        self.unwind.plan(&imbalanced, own_venue_book)
    }

    async fn cancel_if_resting(&self, venue: Exchange, order_id: &str, status: OrderStatus) {
        if status.is_terminal() {
            return;
        }
        if let Err(err) = self.adapter_for(venue).cancel_order(order_id).await {
            warn!(error = %err, order_id, "cancel on non-terminal order failed");
        }
    }

    /// Polls `order_id` to a terminal state on `schedule_ms`'s exponential backoff,
    /// returning the last observed (status, filled_size) it saw even if monitoring
    /// exhausted the schedule before reaching a terminal state.
    async fn monitor_fill(
        &self,
        venue: Exchange,
        order_id: &str,
        schedule_ms: &[u64],
    ) -> (OrderStatus, Decimal) {
        let mut last = (OrderStatus::Resting, Decimal::ZERO);
        for &delay_ms in schedule_ms {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            match self.adapter_for(venue).get_order(order_id).await {
                Ok((status, filled)) => {
                    last = (status, filled);
                    if status.is_terminal() {
                        return last;
                    }
                }
                Err(err) => {
                    warn!(error = %err, order_id, "fill-status poll failed");
                }
            }
        }
        last
    }

    /// The opportunity's recorded target price must still be at or better than the
    /// book's current best ask, with size covering the required amount at that price
    /// exactly — falling back to a deeper, worse-priced level would silently change the
    /// trade's economics after the risk gate already evaluated them.
    fn liquidity_holds(book: &algo_trade_core::market::OrderbookSnapshot, target_price: Decimal, size: Decimal) -> bool {
        match book.best_ask() {
            Some(ask) if ask.price <= target_price => book.ask_size_at(target_price) >= size,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{OpportunityLeg, Strategy};
    use crate::risk::RiskLimits;
    use crate::types::MatchedMarket;
    use algo_trade_core::market::{Level, Market, OrderbookSnapshot, Venue};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct MockAdapter {
        book: OrderbookSnapshot,
        fill_after_polls: usize,
        polls_so_far: Mutex<HashMap<String, usize>>,
        filled_size: Decimal,
        /// When set, every poll returns this status/size, ignoring `fill_after_polls`.
        fixed_status: Option<OrderStatus>,
    }

    impl MockAdapter {
        fn new(book: OrderbookSnapshot, fill_after_polls: usize, filled_size: Decimal) -> Self {
            Self {
                book,
                fill_after_polls,
                polls_so_far: Mutex::new(HashMap::new()),
                filled_size,
                fixed_status: None,
            }
        }

        fn with_fixed_status(book: OrderbookSnapshot, status: OrderStatus, filled_size: Decimal) -> Self {
            Self {
                book,
                fill_after_polls: 0,
                polls_so_far: Mutex::new(HashMap::new()),
                filled_size,
                fixed_status: Some(status),
            }
        }
    }

    #[async_trait]
    impl VenueAdapter for MockAdapter {
        async fn fetch_catalog(&self, _series_filter: &str) -> anyhow::Result<Vec<Market>> {
            Ok(vec![])
        }
        async fn get_orderbook(&self, _instrument_id: &str) -> anyhow::Result<OrderbookSnapshot> {
            Ok(self.book.clone())
        }
        async fn get_balance(&self) -> anyhow::Result<Decimal> {
            Ok(dec!(10000))
        }
        async fn place_order(
            &self,
            _instrument_id: &str,
            _side: MarketSide,
            _size: Decimal,
            _price: Decimal,
        ) -> anyhow::Result<String> {
            Ok("order-1".to_string())
        }
        async fn get_order(&self, order_id: &str) -> anyhow::Result<(OrderStatus, Decimal)> {
            if let Some(status) = self.fixed_status {
                return Ok((status, self.filled_size));
            }
            let mut polls = self.polls_so_far.lock();
            let count = polls.entry(order_id.to_string()).or_insert(0);
            *count += 1;
            if *count >= self.fill_after_polls {
                Ok((OrderStatus::Filled, self.filled_size))
            } else {
                Ok((OrderStatus::Resting, Decimal::ZERO))
            }
        }
        async fn cancel_order(&self, _order_id: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn liquid_book(venue: Venue, id: &str, ask: Decimal) -> OrderbookSnapshot {
        OrderbookSnapshot {
            venue,
            instrument_id: id.to_string(),
            last_update: Utc::now(),
            asks: vec![Level { price: ask, size: dec!(1000) }],
            bids: vec![Level { price: ask - dec!(0.01), size: dec!(1000) }],
        }
    }

    fn sample_opportunity() -> Opportunity {
        Opportunity {
            matched_market: MatchedMarket::new(
                "KXBTC-TEST".to_string(),
                "0xabc".to_string(),
                "yes-token".to_string(),
                "no-token".to_string(),
                "BTC".to_string(),
                dec!(100000),
                Utc::now() + chrono::Duration::minutes(5),
                0.98,
            ),
            strategy: Strategy::YesAThenNoB,
            leg_a: OpportunityLeg {
                venue: Exchange::Kalshi,
                instrument_id: "KXBTC-TEST".to_string(),
                side: Side::Yes,
                target_price: dec!(0.36),
            },
            leg_b: OpportunityLeg {
                venue: Exchange::Polymarket,
                instrument_id: "no-token".to_string(),
                side: Side::No,
                target_price: dec!(0.55),
            },
            net_profit_per_unit: dec!(0.08),
            available_size: dec!(50),
            detected_at: Utc::now(),
        }
    }

    fn coordinator(kalshi: MockAdapter, poly: MockAdapter) -> ExecutionCoordinator {
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            ArbitrageConfig::default(),
        )
    }

    #[tokio::test]
    async fn both_legs_fill_registers_trade() {
        let kalshi = MockAdapter::new(liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)), 1, dec!(50));
        let poly = MockAdapter::new(liquid_book(Venue::Polymarket, "no-token", dec!(0.55)), 1, dec!(50));
        let coord = coordinator(kalshi, poly);
        let outcome = coord.execute(&sample_opportunity()).await;
        match outcome {
            ExecutionOutcome::BothFilled(trade) => {
                assert_eq!(trade.matched_ticker, "KXBTC-TEST");
                assert!(trade.net_profit > Decimal::ZERO);
            }
            other => panic!("expected BothFilled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn insufficient_liquidity_short_circuits_before_placement() {
        // Book ask is worse than the opportunity's recorded target price.
        let kalshi = MockAdapter::new(liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.60)), 1, dec!(50));
        let poly = MockAdapter::new(liquid_book(Venue::Polymarket, "no-token", dec!(0.55)), 1, dec!(50));
        let coord = coordinator(kalshi, poly);
        let outcome = coord.execute(&sample_opportunity()).await;
        assert!(matches!(outcome, ExecutionOutcome::InsufficientLiquidity));
    }

    #[tokio::test]
    async fn risk_rejection_short_circuits_before_placement() {
        let kalshi = MockAdapter::new(liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)), 1, dec!(50));
        let poly = MockAdapter::new(liquid_book(Venue::Polymarket, "no-token", dec!(0.55)), 1, dec!(50));
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        risk.trigger_kill_switch("test");
        let coord = ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            ArbitrageConfig::default(),
        );
        let outcome = coord.execute(&sample_opportunity()).await;
        assert!(matches!(outcome, ExecutionOutcome::RiskRejected(RiskRejection::KillSwitchArmed)));
    }

    #[tokio::test]
    async fn one_leg_fills_other_rests_triggers_unwind() {
        // Kalshi fills immediately; Polymarket never fills within the schedule.
        let kalshi = MockAdapter::new(liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)), 1, dec!(50));
        let poly = MockAdapter::new(liquid_book(Venue::Polymarket, "no-token", dec!(0.55)), 9999, dec!(0));
        let mut config = ArbitrageConfig::default();
        config.fill_monitor_schedule_ms = vec![1, 1, 1];
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        let coord = ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            config,
        );
        let outcome = coord.execute(&sample_opportunity()).await;
        match outcome {
            ExecutionOutcome::Unwound { filled_venue, .. } => assert_eq!(filled_venue, Exchange::Kalshi),
            other => panic!("expected Unwound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn neither_leg_fills_cancels_both() {
        let kalshi = MockAdapter::new(liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)), 9999, dec!(0));
        let poly = MockAdapter::new(liquid_book(Venue::Polymarket, "no-token", dec!(0.55)), 9999, dec!(0));
        let mut config = ArbitrageConfig::default();
        config.fill_monitor_schedule_ms = vec![1, 1];
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        let coord = ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            config,
        );
        let outcome = coord.execute(&sample_opportunity()).await;
        assert!(matches!(outcome, ExecutionOutcome::NeitherFilled));
    }

    #[tokio::test]
    async fn leg_a_partial_leg_b_rests_unwinds_the_partial_fill() {
        // Leg A fills 5/10, leg B never leaves the book: must unwind the partial
        // quantity rather than falling through to NeitherFilled.
        let kalshi = MockAdapter::with_fixed_status(
            liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)),
            OrderStatus::Partial,
            dec!(5),
        );
        let poly = MockAdapter::with_fixed_status(
            liquid_book(Venue::Polymarket, "no-token", dec!(0.55)),
            OrderStatus::Resting,
            dec!(0),
        );
        let mut config = ArbitrageConfig::default();
        config.fill_monitor_schedule_ms = vec![1, 1];
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        let coord = ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            config,
        );
        let outcome = coord.execute(&sample_opportunity()).await;
        match outcome {
            ExecutionOutcome::Unwound { filled_venue, .. } => assert_eq!(filled_venue, Exchange::Kalshi),
            other => panic!("expected Unwound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn leg_a_fills_leg_b_rejects_unwinds_the_filled_leg() {
        let kalshi = MockAdapter::with_fixed_status(
            liquid_book(Venue::Kalshi, "KXBTC-TEST", dec!(0.36)),
            OrderStatus::Filled,
            dec!(50),
        );
        let poly = MockAdapter::with_fixed_status(
            liquid_book(Venue::Polymarket, "no-token", dec!(0.55)),
            OrderStatus::Rejected,
            dec!(0),
        );
        let mut config = ArbitrageConfig::default();
        config.fill_monitor_schedule_ms = vec![1, 1];
        let risk = Arc::new(RiskManager::new(RiskLimits::default(), dec!(10000), vec![]));
        let coord = ExecutionCoordinator::new(
            Arc::new(kalshi),
            Arc::new(poly),
            Arc::new(OrderbookCache::default()),
            risk,
            config,
        );
        let outcome = coord.execute(&sample_opportunity()).await;
        match outcome {
            ExecutionOutcome::Unwound { filled_venue, .. } => assert_eq!(filled_venue, Exchange::Kalshi),
            other => panic!("expected Unwound, got {other:?}"),
        }
    }
}
