//! Cross-exchange arbitrage detection and orchestration.
//!
//! This crate provides tools for detecting and executing arbitrage opportunities
//! between Kalshi and Polymarket prediction markets.
//!
//! # Overview
//!
//! When the same event (e.g., "BTC above $100k at 3pm") is priced differently
//! across exchanges, buying opposing positions can guarantee profit:
//!
//! ```text
//! Kalshi:     YES @ $0.55,  NO @ $0.46  (internal spread)
//! Polymarket: YES @ $0.52,  NO @ $0.50  (internal spread)
//!
//! Cross-exchange opportunity:
//!   Buy Kalshi NO     @ $0.46
//!   Buy Polymarket YES @ $0.52
//!   Total cost:         $0.98
//!   Guaranteed payout:  $1.00
//!   Gross profit:       $0.02 (2.04%)
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core types for cross-exchange operations
//! - [`fees`]: Fee calculations for both exchanges
//! - [`matcher`]: Match equivalent markets across exchanges
//! - [`detector`]: Detect arbitrage opportunities
//!
//! # Example
//!
//! ```ignore
//! use algo_trade_arbitrage_cross::{
//!     CrossExchangeDetector, DetectorConfig,
//!     MarketMatcher, MatchConfig,
//!     FeeCalculator,
//! };
//!
//! // Create detector with the live fee schedule
//! let detector = CrossExchangeDetector::with_config(
//!     DetectorConfig::reference_scenario()
//! );
//!
//! // Match markets
//! let matcher = MarketMatcher::with_config(MatchConfig::default());
//! let matches = matcher.find_btc_matches(&kalshi_markets, &poly_markets);
//!
//! // Detect opportunities
//! for matched in &matches {
//!     if let Some(opp) = detector.detect(
//!         &matched,
//!         &kalshi_book,
//!         &poly_yes_book,
//!         &poly_no_book,
//!     ) {
//!         println!(
//!             "Found opportunity: {:?} net/unit ${}",
//!             opp.strategy,
//!             opp.net_profit_per_unit
//!         );
//!     }
//! }
//! ```
//!
//! # Safety
//!
//! **CRITICAL**: Before executing arbitrage, always verify:
//!
//! 1. Settlement criteria match exactly (use [`MarketMatcher::verify_settlement_match`])
//! 2. Match confidence exceeds threshold (0.99 recommended)
//! 3. Both exchanges are operational
//! 4. Sufficient balance on both exchanges
//!
//! Mismatched settlement criteria can turn guaranteed arbitrage into a gamble.

pub mod cache;
pub mod detector;
pub mod executor;
pub mod fees;
pub mod matcher;
pub mod orchestrator;
pub mod risk;
pub mod types;
pub mod unwind;

// Re-export main types for convenience
pub use cache::{OrderbookCache, TtlCache};
pub use detector::{CrossExchangeDetector, DetectorConfig, Opportunity, OpportunityLeg, Strategy};
pub use executor::{ExecutionCoordinator, ExecutionOutcome, Trade};
pub use fees::{ArbitrageFees, FeeCalculator, FeeConfig, FeeMode};
pub use matcher::{MarketMatcher, MatchConfig, ParsedKalshiMarket, ParsedPolymarketMarket};
pub use orchestrator::{ActiveMarketFocus, Orchestrator};
pub use risk::{RiskLimits, RiskManager, RiskRejection, RiskState};
pub use types::{
    Comparison, Exchange, MatchedMarket, PriceSource, SettlementCriteria, SettlementVerification,
    Side,
};
pub use unwind::{UnwindCandidate, UnwindPlan, UnwindPlanner};
