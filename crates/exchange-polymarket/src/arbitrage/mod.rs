//! Execution layer for Polymarket's CLOB: order book feed, rate-limited signing
//! and submission, paper/live executors, and the safety rails around them.
//!
//! # Modules
//!
//! - [`types`]: shared order book and side types
//! - [`book_feed`]: websocket-fed [`types::L2OrderBook`] per token, with staleness tracking
//! - [`execution`]: the [`execution::PolymarketExecutor`] trait and its order/fill types
//! - [`paper_executor`] / [`live_executor`]: simulation-mode and real CLOB-backed executors
//! - [`circuit_breaker`], [`rate_limiter`]: safety rails around the live executor
//! - [`sdk_client`], [`signer`]: CLOB REST client and EIP-712 order signing
//! - [`metrics`]: execution metrics aggregation

pub mod book_feed;
pub mod circuit_breaker;
pub mod execution;
pub mod live_executor;
pub mod metrics;
pub mod paper_executor;
pub mod rate_limiter;
pub mod sdk_client;
pub mod signer;
pub mod types;

// Shared order book types
pub use types::{L2OrderBook, Side};

// Execution layer re-exports
pub use execution::{
    ArbitragePositionSnapshot, ExecutionError, ExecutionResult, ExecutorConfig, OrderParams,
    OrderResult, OrderStatus, PolymarketExecutor, Position, RiskLimit,
};
// Note: execution::Side and execution::OrderType are intentionally not re-exported
// to avoid conflicts with types::Side. Use the full path (execution::Side,
// execution::OrderType) when working with the execution layer.

// Paper trading executor
pub use paper_executor::{PaperExecutor, PaperExecutorConfig};

// Live trading executor
pub use live_executor::{
    HardLimits, LiveExecutor, LiveExecutorConfig, POLYMARKET_MAINNET_URL, POLYMARKET_TESTNET_URL,
};

// Rate limiting
pub use rate_limiter::{ClobRateLimiter, RateLimiterConfig};

// Secure wallet for order signing
pub use signer::{Wallet, WalletConfig, WalletError};

// Circuit breaker for trading safety
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

// CLOB API client
pub use sdk_client::{ClobClient, ClobClientConfig, ClobError};

// Real-time order book feed
pub use book_feed::{BookFeed, BookFeedConfig, BookFeedError, BookFeedManager};
