//! Cross-exchange arbitrage opportunity detection.
//!
//! Evaluates both compensating strategies for a [`MatchedMarket`] against fresh
//! top-of-book quotes and emits an [`Opportunity`] when the fee-adjusted net profit
//! clears `min_profit`. A cheap pre-filter short-circuits the common case where
//! neither strategy can possibly clear fees before either strategy's fee schedule is
//! evaluated; short-horizon memoization absorbs duplicate push updates that carry
//! the same rounded prices within a 100ms window.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use crate::cache::TtlCache;
use crate::fees::FeeConfig;
use crate::types::{Exchange, MatchedMarket, Side};
use algo_trade_core::market::OrderbookSnapshot;

/// `1 - (p_yes_A + p_no_B)` (or the symmetric strategy) must clear at least this much
/// gross edge before fees are worth evaluating at all.
pub const EPSILON_FEE: Decimal = dec!(0.02);

/// Resolved ask price/size for one leg of a strategy: the cost to buy one outcome
/// token at a specific venue's current top-of-book.
#[derive(Debug, Clone, Copy)]
pub struct LegQuote {
    pub instrument_id_is_derived: bool,
    pub price: Decimal,
    pub size: Decimal,
}

/// The four leg quotes needed to evaluate both compensating strategies for a pair:
/// buying YES and NO on each of the two venues.
#[derive(Debug, Clone, Copy)]
pub struct PairQuotes {
    pub yes_a: LegQuote,
    pub no_a: LegQuote,
    pub yes_b: LegQuote,
    pub no_b: LegQuote,
}

impl PairQuotes {
    /// Resolves quotes from order books: Kalshi publishes one combined book per
    /// ticker (the NO ask is derived from the YES bid, since buying NO at `p` is
    /// economically identical to selling YES at `1-p`); Polymarket publishes an
    /// independent book per outcome token, so both are read directly.
    #[must_use]
    pub fn resolve(
        kalshi_book: &OrderbookSnapshot,
        poly_yes_book: &OrderbookSnapshot,
        poly_no_book: &OrderbookSnapshot,
    ) -> Option<Self> {
        let kalshi_yes_ask = kalshi_book.best_ask()?;
        let kalshi_yes_bid = kalshi_book.best_bid()?;
        let poly_yes_ask = poly_yes_book.best_ask()?;
        let poly_no_ask = poly_no_book.best_ask()?;

        Some(Self {
            yes_a: LegQuote { instrument_id_is_derived: false, price: kalshi_yes_ask.price, size: kalshi_yes_ask.size },
            no_a: LegQuote {
                instrument_id_is_derived: true,
                price: Decimal::ONE - kalshi_yes_bid.price,
                size: kalshi_yes_bid.size,
            },
            yes_b: LegQuote { instrument_id_is_derived: false, price: poly_yes_ask.price, size: poly_yes_ask.size },
            no_b: LegQuote { instrument_id_is_derived: false, price: poly_no_ask.price, size: poly_no_ask.size },
        })
    }
}

/// Which compensating strategy an [`Opportunity`] executes. Ordinal order (`YesAThenNoB`
/// before `NoAThenYesB`) is the deterministic tie-break when both strategies clear
/// `min_profit` with an equal net edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Buy YES on venue A, buy NO on venue B.
    YesAThenNoB,
    /// Buy NO on venue A, buy YES on venue B.
    NoAThenYesB,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YesAThenNoB => "S1:YES_A+NO_B",
            Self::NoAThenYesB => "S2:NO_A+YES_B",
        }
    }
}

/// One leg of an [`Opportunity`]: which venue, which instrument, which side, at what price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityLeg {
    pub venue: Exchange,
    pub instrument_id: String,
    pub side: Side,
    pub target_price: Decimal,
}

/// A detected, fee-adjusted profitable pair of legs. Immutable once created; consumed
/// exactly once by the execution coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub matched_market: MatchedMarket,
    pub strategy: Strategy,
    pub leg_a: OpportunityLeg,
    pub leg_b: OpportunityLeg,
    /// `1 - cost - fees`, per unit.
    pub net_profit_per_unit: Decimal,
    pub available_size: Decimal,
    pub detected_at: DateTime<Utc>,
}

impl Opportunity {
    /// Age of this opportunity at the moment of consumption; the coordinator discards
    /// anything older than its staleness bound (≤500ms).
    #[must_use]
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.detected_at
    }

    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().num_milliseconds() > max_age.as_millis() as i64
    }

    /// A key stable across duplicate push updates carrying the same opportunity:
    /// used by the orchestrator's 15s execution dedupe and the detector's own 100ms
    /// memoization.
    #[must_use]
    pub fn dedupe_key(&self) -> (String, String, Strategy) {
        (self.leg_a.instrument_id.clone(), self.leg_b.instrument_id.clone(), self.strategy)
    }
}

/// Detector configuration: the minimum net-profit-per-unit gate (default 0.005) and
/// the fee schedule used to evaluate it.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub min_profit: Decimal,
    pub fees: FeeConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { min_profit: dec!(0.005), fees: FeeConfig::default() }
    }
}

impl DetectorConfig {
    /// The literal fee schedule and threshold used by the worked scenario tests:
    /// flat per-unit Kalshi fee, proportional Polymarket fee.
    #[must_use]
    pub fn reference_scenario() -> Self {
        Self { min_profit: dec!(0.005), fees: FeeConfig::reference_scenario() }
    }

    #[must_use]
    pub fn with_min_profit(mut self, min_profit: Decimal) -> Self {
        self.min_profit = min_profit;
        self
    }
}

/// Memoization key: instrument pair plus prices rounded to 4 decimal places, so
/// duplicate push updates within the TTL window resolve to the same cache entry.
fn memo_key(matched: &MatchedMarket, quotes: &PairQuotes) -> (String, String, (i64, i64, i64, i64)) {
    let round4 = |d: Decimal| (d.round_dp(4) * dec!(10000)).to_string().parse::<i64>().unwrap_or(0);
    (
        matched.kalshi_ticker.clone(),
        matched.polymarket_condition_id.clone(),
        (round4(quotes.yes_a.price), round4(quotes.no_a.price), round4(quotes.yes_b.price), round4(quotes.no_b.price)),
    )
}

/// Evaluates both compensating strategies for a matched pair against fresh top-of-book
/// quotes on both venues.
pub struct CrossExchangeDetector {
    config: DetectorConfig,
    /// 100ms-TTL memo of the last detection result per `(pair, rounded prices)`, so a
    /// burst of duplicate push updates carrying identical prices doesn't re-run the
    /// fee evaluation on every tick.
    memo: TtlCache<(String, String, (i64, i64, i64, i64)), Option<Opportunity>>,
}

impl CrossExchangeDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config, memo: TtlCache::new(Duration::from_millis(100)) }
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detects an arbitrage opportunity for `matched`, if one clears `min_profit` after
    /// fees. Returns `None` when the pre-filter rejects both strategies outright, when
    /// neither strategy's fee-adjusted net clears the threshold, or when a book is
    /// missing a side entirely (empty asks/bids).
    pub fn detect(
        &self,
        matched: &MatchedMarket,
        kalshi_book: &OrderbookSnapshot,
        poly_yes_book: &OrderbookSnapshot,
        poly_no_book: &OrderbookSnapshot,
    ) -> Option<Opportunity> {
        let quotes = PairQuotes::resolve(kalshi_book, poly_yes_book, poly_no_book)?;

        let key = memo_key(matched, &quotes);
        if let Some(cached) = self.memo.get(&key) {
            trace!(ticker = %matched.kalshi_ticker, "detector memo hit");
            return cached;
        }

        let result = self.detect_uncached(matched, &quotes);
        self.memo.insert(key, result.clone());
        result
    }

    fn detect_uncached(&self, matched: &MatchedMarket, quotes: &PairQuotes) -> Option<Opportunity> {
        let s1_cost = quotes.yes_a.price + quotes.no_b.price;
        let s2_cost = quotes.no_a.price + quotes.yes_b.price;
        let min_total = s1_cost.min(s2_cost);

        // Pre-filter: short-circuits ~95% of inputs without touching the fee model.
        if min_total > Decimal::ONE - (dec!(2) * EPSILON_FEE) {
            debug!(ticker = %matched.kalshi_ticker, %min_total, "pre-filter rejected pair");
            return None;
        }

        let s1_fees = self.config.fees.kalshi_leg_fee(quotes.yes_a.price, Decimal::ONE)
            + self.config.fees.poly_leg_fee(quotes.no_b.price, Decimal::ONE);
        let s1_net = Decimal::ONE - s1_cost - s1_fees;

        let s2_fees = self.config.fees.kalshi_leg_fee(quotes.no_a.price, Decimal::ONE)
            + self.config.fees.poly_leg_fee(quotes.yes_b.price, Decimal::ONE);
        let s2_net = Decimal::ONE - s2_cost - s2_fees;

        // Deterministic tie-break: S1 wins ties (lower ordinal).
        let (strategy, net, leg_a_quote, leg_b_quote, leg_a_side, leg_b_side) = if s1_net >= s2_net {
            (Strategy::YesAThenNoB, s1_net, quotes.yes_a, quotes.no_b, Side::Yes, Side::No)
        } else {
            (Strategy::NoAThenYesB, s2_net, quotes.no_a, quotes.yes_b, Side::No, Side::Yes)
        };

        if net < self.config.min_profit {
            debug!(ticker = %matched.kalshi_ticker, %net, "below min_profit after fees");
            return None;
        }

        let leg_a = OpportunityLeg {
            venue: Exchange::Kalshi,
            instrument_id: matched.kalshi_ticker.clone(),
            side: leg_a_side,
            target_price: leg_a_quote.price,
        };
        let b_instrument = match leg_b_side {
            Side::Yes => matched.polymarket_yes_token.clone(),
            Side::No => matched.polymarket_no_token.clone(),
        };
        let leg_b = OpportunityLeg {
            venue: Exchange::Polymarket,
            instrument_id: b_instrument,
            side: leg_b_side,
            target_price: leg_b_quote.price,
        };

        Some(Opportunity {
            matched_market: matched.clone(),
            strategy,
            leg_a,
            leg_b,
            net_profit_per_unit: net,
            available_size: leg_a_quote.size.min(leg_b_quote.size),
            detected_at: Utc::now(),
        })
    }
}

impl Default for CrossExchangeDetector {
    fn default() -> Self {
        Self::new()
    }
}
