//! Implements `algo_trade_core::traits::VenueAdapter` over [`crate::client::KalshiClient`]
//! and [`crate::executor::KalshiExecutor`], normalizing Kalshi's cents-denominated,
//! ticker-keyed market model into the workspace-wide common market model.

use crate::client::KalshiClient;
use crate::executor::KalshiExecutor;
use crate::types::OrderRequest;
use algo_trade_core::market::{Level, Market, MarketSide, OrderStatus, OrderbookSnapshot, Venue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Divides a Kalshi cents price into the `[0, 1]` range every other component expects.
fn cents_to_unit(cents: Decimal) -> Decimal {
    cents / Decimal::ONE_HUNDRED
}

fn unit_to_cents(price: Decimal) -> u32 {
    (price * Decimal::ONE_HUNDRED)
        .round()
        .to_string()
        .parse()
        .unwrap_or(0)
}

pub struct KalshiAdapter {
    client: KalshiClient,
    executor: KalshiExecutor,
}

impl KalshiAdapter {
    #[must_use]
    pub fn new(client: KalshiClient, executor: KalshiExecutor) -> Self {
        Self { client, executor }
    }
}

#[async_trait]
impl algo_trade_core::traits::VenueAdapter for KalshiAdapter {
    async fn fetch_catalog(&self, series_filter: &str) -> Result<Vec<Market>> {
        let markets = self
            .client
            .get_markets(Some(series_filter))
            .await
            .context("kalshi fetch_catalog")?;

        Ok(markets
            .into_iter()
            .filter_map(|m| {
                let yes_price = cents_to_unit(m.yes_ask.or(m.yes_bid).or(m.last_price)?);
                let no_price = cents_to_unit(m.no_ask.or(m.no_bid)?);
                let resolution_time = m.expiration_time.or(m.close_time)?;
                let mut venue_metadata = HashMap::new();
                venue_metadata.insert("event_ticker".to_string(), m.event_ticker.clone());
                Some(Market {
                    venue: Venue::Kalshi,
                    instrument_id: m.ticker,
                    title: m.title,
                    resolution_time,
                    resolution_source: "kalshi-settlement".to_string(),
                    yes_price,
                    no_price,
                    yes_volume: Decimal::from(m.volume_24h.unwrap_or(0)),
                    no_volume: Decimal::from(m.volume_24h.unwrap_or(0)),
                    venue_metadata,
                })
            })
            .collect())
    }

    async fn get_orderbook(&self, instrument_id: &str) -> Result<OrderbookSnapshot> {
        let book = self
            .client
            .get_orderbook(instrument_id, 10)
            .await
            .context("kalshi get_orderbook")?;

        Ok(OrderbookSnapshot {
            venue: Venue::Kalshi,
            instrument_id: instrument_id.to_string(),
            last_update: book.timestamp,
            asks: book
                .yes_asks
                .iter()
                .map(|l| Level { price: cents_to_unit(Decimal::from(l.price)), size: Decimal::from(l.count) })
                .collect(),
            bids: book
                .yes_bids
                .iter()
                .map(|l| Level { price: cents_to_unit(Decimal::from(l.price)), size: Decimal::from(l.count) })
                .collect(),
        })
    }

    async fn get_balance(&self) -> Result<Decimal> {
        let balance = self.client.get_balance().await.context("kalshi get_balance")?;
        Ok(balance.available_decimal() / Decimal::ONE_HUNDRED)
    }

    async fn place_order(
        &self,
        instrument_id: &str,
        side: MarketSide,
        size: Decimal,
        price: Decimal,
    ) -> Result<String> {
        let count: u32 = size.round().to_string().parse().context("kalshi order size overflow")?;
        let price_cents = unit_to_cents(price);
        let request = match side {
            MarketSide::BuyYes => OrderRequest::buy_yes(instrument_id, price_cents, count),
            MarketSide::BuyNo => OrderRequest::buy_no(instrument_id, price_cents, count),
        };
        let order = self.executor.execute_order(&request).await.context("kalshi place_order")?;
        Ok(order.order_id)
    }

    async fn get_order(&self, order_id: &str) -> Result<(OrderStatus, Decimal)> {
        let order = self.client.get_order(order_id).await.context("kalshi get_order")?;
        let status = match order.status {
            crate::types::OrderStatus::Filled => OrderStatus::Filled,
            crate::types::OrderStatus::PartialFilled => OrderStatus::Partial,
            crate::types::OrderStatus::Resting | crate::types::OrderStatus::Pending => {
                OrderStatus::Resting
            }
            crate::types::OrderStatus::Cancelled => OrderStatus::Canceled,
            crate::types::OrderStatus::Rejected => OrderStatus::Rejected,
        };
        Ok((status, Decimal::from(order.filled_count)))
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        self.client.cancel_order(order_id).await.context("kalshi cancel_order")
    }
}
