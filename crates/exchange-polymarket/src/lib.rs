//! Polymarket CLOB integration for the cross-exchange arbitrage engine.
//!
//! This crate provides:
//! - REST client with rate limiting for Polymarket CLOB API
//! - Gamma API client for 15-minute market discovery
//! - Models for markets, tokens, and prices
//! - Arbitrage execution layer for paired YES/NO trading
//! - A [`PolymarketAdapter`] implementing `algo_trade_core::traits::VenueAdapter`
//!
//! # Example
//!
//! ```no_run
//! use algo_trade_polymarket::{GammaClient, PolymarketAdapter};
//! use algo_trade_polymarket::arbitrage::{PaperExecutor, PaperExecutorConfig, PolymarketExecutor};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gamma = GammaClient::new();
//!     let executor: Arc<dyn PolymarketExecutor> =
//!         Arc::new(PaperExecutor::new(PaperExecutorConfig::default()));
//!     let adapter = PolymarketAdapter::new(gamma, executor);
//!
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod arbitrage;
pub mod client;
pub mod gamma;
pub mod models;
pub mod websocket;

// Re-export main types
pub use adapter::PolymarketAdapter;
pub use client::PolymarketClient;
pub use gamma::GammaClient;
pub use models::{Coin, GammaEvent, GammaMarket, Market, MarketFilter, Price, Token};
pub use websocket::{BookEvent, PolymarketWebSocket, WebSocketConfig, WebSocketError};
