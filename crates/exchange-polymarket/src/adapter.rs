//! Implements `algo_trade_core::traits::VenueAdapter` over the Gamma discovery API,
//! [`crate::arbitrage::book_feed::BookFeedManager`] live order books, and a
//! [`crate::arbitrage::execution::PolymarketExecutor`] for order placement.
//!
//! Polymarket quotes each binary outcome as its own CLOB token; `instrument_id` in this
//! adapter is always a token id, not the market's `condition_id`. [`fetch_catalog`]
//! subscribes a book feed per discovered market as a side effect, so a caller that wants
//! live orderbooks must call it before [`get_orderbook`].

use crate::arbitrage::book_feed::{BookFeedConfig, BookFeedManager};
use crate::arbitrage::execution::{
    ExecutionError, OrderParams, OrderStatus as ExecOrderStatus, PolymarketExecutor,
};
use crate::arbitrage::types::L2OrderBook;
use crate::gamma::GammaClient;
use crate::models::Coin;
use algo_trade_core::market::{Level, Market, MarketSide, OrderStatus, OrderbookSnapshot, Venue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub struct PolymarketAdapter {
    gamma: GammaClient,
    executor: Arc<dyn PolymarketExecutor>,
    feeds: Arc<tokio::sync::Mutex<BookFeedManager>>,
    /// token id -> condition id, so `get_orderbook`/`place_order` can find the right feed
    /// and outcome pair from the single `instrument_id` the trait exposes.
    token_to_condition: RwLock<HashMap<String, String>>,
    /// condition id -> (yes token id, no token id).
    condition_tokens: RwLock<HashMap<String, (String, String)>>,
}

impl PolymarketAdapter {
    #[must_use]
    pub fn new(gamma: GammaClient, executor: Arc<dyn PolymarketExecutor>) -> Self {
        Self {
            gamma,
            executor,
            feeds: Arc::new(tokio::sync::Mutex::new(BookFeedManager::new(BookFeedConfig::fast()))),
            token_to_condition: RwLock::new(HashMap::new()),
            condition_tokens: RwLock::new(HashMap::new()),
        }
    }

    fn book_to_snapshot(instrument_id: &str, book: &L2OrderBook) -> OrderbookSnapshot {
        OrderbookSnapshot {
            venue: Venue::Polymarket,
            instrument_id: instrument_id.to_string(),
            last_update: book
                .last_update_ms
                .and_then(chrono::DateTime::from_timestamp_millis)
                .unwrap_or_else(chrono::Utc::now),
            asks: book
                .asks
                .iter()
                .map(|(price, size)| Level { price: *price, size: *size })
                .collect(),
            bids: book
                .bids
                .iter()
                .map(|(price, size)| Level { price: price.0, size: *size })
                .collect(),
        }
    }
}

#[async_trait]
impl algo_trade_core::traits::VenueAdapter for PolymarketAdapter {
    async fn fetch_catalog(&self, _series_filter: &str) -> Result<Vec<Market>> {
        let raw_markets = self.gamma.get_15min_markets_for_coins(&[Coin::Btc, Coin::Eth]).await;

        let mut out = Vec::with_capacity(raw_markets.len());
        for m in raw_markets {
            let (Some(up), Some(down), Some(end_date)) = (m.up_token(), m.down_token(), m.end_date)
            else {
                continue;
            };

            {
                let mut feeds = self.feeds.lock().await;
                if let Err(e) = feeds
                    .add_market(m.condition_id.clone(), up.token_id.clone(), down.token_id.clone())
                    .await
                {
                    tracing::warn!(condition_id = %m.condition_id, error = %e, "book feed subscribe failed");
                    continue;
                }
            }
            {
                let mut token_to_condition = self.token_to_condition.write();
                token_to_condition.insert(up.token_id.clone(), m.condition_id.clone());
                token_to_condition.insert(down.token_id.clone(), m.condition_id.clone());
                self.condition_tokens
                    .write()
                    .insert(m.condition_id.clone(), (up.token_id.clone(), down.token_id.clone()));
            }

            let mut venue_metadata = HashMap::new();
            venue_metadata.insert("condition_id".to_string(), m.condition_id.clone());
            venue_metadata.insert("no_token_id".to_string(), down.token_id.clone());

            out.push(Market {
                venue: Venue::Polymarket,
                instrument_id: up.token_id.clone(),
                title: m.question.clone(),
                resolution_time: end_date,
                resolution_source: "polymarket-umip".to_string(),
                yes_price: up.price,
                no_price: down.price,
                yes_volume: m.volume_24h.unwrap_or(Decimal::ZERO),
                no_volume: m.volume_24h.unwrap_or(Decimal::ZERO),
                venue_metadata,
            });
        }
        Ok(out)
    }

    async fn get_orderbook(&self, instrument_id: &str) -> Result<OrderbookSnapshot> {
        let condition_id = self
            .token_to_condition
            .read()
            .get(instrument_id)
            .cloned()
            .context("polymarket instrument not in catalog; call fetch_catalog first")?;
        let (yes_token, _) = self
            .condition_tokens
            .read()
            .get(&condition_id)
            .cloned()
            .context("polymarket condition missing token pair")?;

        let feeds = self.feeds.lock().await;
        let (yes_book, no_book) = feeds.get_books(&condition_id).context("polymarket get_orderbook")?;
        let book = if instrument_id == yes_token { yes_book } else { no_book };
        Ok(Self::book_to_snapshot(instrument_id, &book))
    }

    async fn get_balance(&self) -> Result<Decimal> {
        self.executor.get_balance().await.map_err(Into::into)
    }

    async fn place_order(
        &self,
        instrument_id: &str,
        side: MarketSide,
        size: Decimal,
        price: Decimal,
    ) -> Result<String> {
        let condition_id = self
            .token_to_condition
            .read()
            .get(instrument_id)
            .cloned()
            .context("polymarket instrument not in catalog; call fetch_catalog first")?;
        let (yes_token, no_token) = self
            .condition_tokens
            .read()
            .get(&condition_id)
            .cloned()
            .context("polymarket condition missing token pair")?;

        let target_token = match side {
            MarketSide::BuyYes => yes_token,
            MarketSide::BuyNo => no_token,
        };
        let params = OrderParams::buy_fok(target_token, price, size);
        let result = self.executor.submit_order(params).await.map_err(polymarket_exec_err)?;
        Ok(result.order_id)
    }

    async fn get_order(&self, order_id: &str) -> Result<(OrderStatus, Decimal)> {
        let result = self
            .executor
            .get_order_status(order_id)
            .await
            .map_err(polymarket_exec_err)?;
        let status = match result.status {
            ExecOrderStatus::Filled => OrderStatus::Filled,
            ExecOrderStatus::PartiallyFilled => OrderStatus::Partial,
            ExecOrderStatus::Pending => OrderStatus::Resting,
            ExecOrderStatus::Cancelled => OrderStatus::Canceled,
            ExecOrderStatus::Rejected | ExecOrderStatus::Expired => OrderStatus::Rejected,
        };
        Ok((status, result.filled_size))
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        self.executor.cancel_order(order_id).await.map_err(polymarket_exec_err)
    }
}

fn polymarket_exec_err(e: ExecutionError) -> anyhow::Error {
    anyhow::anyhow!(e.to_string())
}
